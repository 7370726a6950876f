use chrono::{DateTime, Utc};
use serde::Serialize;

/// Like structure which is serialized from the database. The pair
/// (comment_id, user_id) is unique; only top-level comments carry likes.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Like {
    pub id: i64,
    pub comment_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a like toggle: the new state for the acting user and the
/// recomputed total for the comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeStatus {
    pub liked: bool,
    pub likes_count: i64,
}

/// Structure passed to the repository for toggling a like
#[derive(Debug, Clone)]
pub struct LikeToggle {
    pub comment_id: i64,
    pub user_id: i64,
}

impl LikeToggle {
    #[must_use]
    #[inline]
    pub const fn new(comment_id: i64, user_id: i64) -> Self {
        Self {
            comment_id,
            user_id,
        }
    }
}

/// Structure passed to the repository for counting the likes of a comment
#[derive(Debug, Clone)]
pub struct LikesByComment {
    pub comment_id: i64,
}

impl LikesByComment {
    #[must_use]
    #[inline]
    pub const fn new(comment_id: i64) -> Self {
        Self { comment_id }
    }
}

/// Structure passed to the repository to look up one user's like of a comment
#[derive(Debug, Clone)]
pub struct LikeGetByIds {
    pub comment_id: i64,
    pub user_id: i64,
}

impl LikeGetByIds {
    #[must_use]
    #[inline]
    pub const fn new(comment_id: i64, user_id: i64) -> Self {
        Self {
            comment_id,
            user_id,
        }
    }
}
