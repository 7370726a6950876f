use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::query_parameters::DbOrder;

/// Logical namespace comments belong to unless the caller says otherwise
pub const DEFAULT_PAGE: &str = "comments";

/// Comment structure which is serialized from the database. A comment with
/// `parent_id` set is a reply; replies cannot be liked or replied to.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub page: String,
    pub user_id: i64,
    pub parent_id: Option<i64>,
}

impl Comment {
    #[must_use]
    #[inline]
    pub const fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Structure passed to the repository for Comment creation
#[derive(Debug, Clone)]
pub struct CommentCreate {
    pub user_id: i64,
    pub page: String,
    pub text: String,
    pub parent_id: Option<i64>,
}

impl CommentCreate {
    #[must_use]
    #[inline]
    pub fn new(user_id: i64, page: &str, text: &str, parent_id: Option<i64>) -> Self {
        Self {
            user_id,
            page: page.to_owned(),
            text: text.to_owned(),
            parent_id,
        }
    }
}

/// Structure passed to the repository for listing the top-level comments of
/// a page, supporting pagination
#[derive(Debug, Clone)]
pub struct CommentReadMany {
    pub page: String,
    pub order_by_created_at: Option<DbOrder>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl CommentReadMany {
    #[must_use]
    #[inline]
    pub fn new(
        page: &str,
        order_by_created_at: Option<DbOrder>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Self {
        Self {
            page: page.to_owned(),
            order_by_created_at,
            limit,
            offset,
        }
    }
}

/// Structure passed to the repository for listing the replies of a comment
#[derive(Debug, Clone)]
pub struct RepliesByParent {
    pub parent_id: i64,
}

impl RepliesByParent {
    #[must_use]
    #[inline]
    pub const fn new(parent_id: i64) -> Self {
        Self { parent_id }
    }
}

/// Structure passed to the repository for deleting a comment.
/// `admin_override` skips the ownership check.
#[derive(Debug, Clone)]
pub struct CommentDelete {
    pub id: i64,
    pub user_id: i64,
    pub admin_override: bool,
}

impl CommentDelete {
    #[must_use]
    #[inline]
    pub const fn new(id: i64, user_id: i64, admin_override: bool) -> Self {
        Self {
            id,
            user_id,
            admin_override,
        }
    }
}

/// Structure passed to the repository to get a comment by ID
#[derive(Debug, Clone)]
pub struct CommentGetById {
    pub id: i64,
}

impl CommentGetById {
    #[must_use]
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self { id }
    }
}
