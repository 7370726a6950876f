use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use sqlx::error::ErrorKind;
use sqlx::{Sqlite, Transaction};

use crate::common::error::DbResultSingle;
use crate::common::{DbPoolHandler, DbRepository, PoolHandler};
use crate::error::{BusinessLogicError, BusinessLogicErrorKind, DbError};
use crate::models::{CommentGetById, Like, LikeGetByIds, LikeStatus, LikeToggle, LikesByComment};
use crate::repositories::CommentRepository;

pub struct LikeRepository {
    pool_handler: PoolHandler,
}

impl LikeRepository {
    /// Helper to get one user's like of a comment within a transaction
    pub async fn get_like<'a>(
        params: LikeGetByIds,
        transaction_handle: &mut Transaction<'a, Sqlite>,
    ) -> DbResultSingle<Option<Like>> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            SELECT * FROM "Like" WHERE comment_id = $1 AND user_id = $2
            "#,
        )
        .bind(params.comment_id)
        .bind(params.user_id)
        .fetch_optional(transaction_handle.as_mut())
        .await?;
        Ok(like)
    }

    /// Helper to recompute the like total of a comment within a transaction
    async fn count_in_tx<'a>(
        comment_id: i64,
        transaction_handle: &mut Transaction<'a, Sqlite>,
    ) -> DbResultSingle<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM "Like" WHERE comment_id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_one(transaction_handle.as_mut())
        .await?;
        Ok(count)
    }

    /// Number of likes on the given comment.
    /// Fails when the comment does not exist (anymore).
    pub async fn count_likes(&mut self, params: &LikesByComment) -> DbResultSingle<i64> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let comment =
            CommentRepository::get_comment(CommentGetById::new(params.comment_id), &mut tx).await?;
        CommentRepository::is_comment_correct(comment, None)?;

        let count = Self::count_in_tx(params.comment_id, &mut tx).await?;

        tx.commit().await?;

        Ok(count)
    }

    /// Whether the given user currently likes the given comment
    pub async fn has_liked(&mut self, params: &LikeGetByIds) -> DbResultSingle<bool> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let like = Self::get_like(params.clone(), &mut tx).await?;

        tx.commit().await?;

        Ok(like.is_some())
    }
}

/// trait for the single like/unlike entry point
#[async_trait]
pub trait LikeRepositoryToggle {
    /// Toggle the user's like of a top-level comment and return the new
    /// state together with the recomputed like total. Liking a reply is
    /// rejected without any mutation.
    async fn toggle(&mut self, params: &LikeToggle) -> DbResultSingle<LikeStatus>;
}

#[async_trait]
impl LikeRepositoryToggle for LikeRepository {
    async fn toggle(&mut self, params: &LikeToggle) -> DbResultSingle<LikeStatus> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let comment =
            CommentRepository::get_comment(CommentGetById::new(params.comment_id), &mut tx).await?;
        let comment = CommentRepository::is_comment_correct(comment, None)?;
        if !comment.is_top_level() {
            return Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::LikesDisabledOnReplies,
            )));
        }

        let existing = Self::get_like(
            LikeGetByIds::new(params.comment_id, params.user_id),
            &mut tx,
        )
        .await?;

        let liked = match existing {
            Some(like) => {
                sqlx::query(
                    r#"
                    DELETE FROM "Like" WHERE id = $1
                    "#,
                )
                .bind(like.id)
                .execute(tx.as_mut())
                .await?;

                false
            }
            None => {
                let inserted = sqlx::query(
                    r#"
                    INSERT INTO "Like" (comment_id, user_id, created_at)
                    VALUES ($1, $2, $3)
                    "#,
                )
                .bind(params.comment_id)
                .bind(params.user_id)
                .bind(Utc::now())
                .execute(tx.as_mut())
                .await;

                match inserted {
                    Ok(_) => true,
                    // a racing toggle inserted the same (comment, user) pair
                    // first; treat it as an existing like and toggle it off
                    Err(sqlx::Error::Database(db_err))
                        if matches!(db_err.kind(), ErrorKind::UniqueViolation) =>
                    {
                        warn!(
                            "duplicate like insert for comment {} by user {}, retrying as unlike",
                            params.comment_id, params.user_id
                        );
                        sqlx::query(
                            r#"
                            DELETE FROM "Like" WHERE comment_id = $1 AND user_id = $2
                            "#,
                        )
                        .bind(params.comment_id)
                        .bind(params.user_id)
                        .execute(tx.as_mut())
                        .await?;

                        false
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        let likes_count = Self::count_in_tx(params.comment_id, &mut tx).await?;

        tx.commit().await?;

        Ok(LikeStatus { liked, likes_count })
    }
}

#[async_trait]
impl DbRepository for LikeRepository {
    #[inline]
    fn new(pool_handler: PoolHandler) -> Self {
        Self { pool_handler }
    }

    #[inline]
    async fn disconnect(&mut self) -> () {
        self.pool_handler.disconnect().await;
    }
}
