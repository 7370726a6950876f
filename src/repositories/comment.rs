use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sqlx::{Sqlite, Transaction};

use crate::common::error::{DbResultMultiple, DbResultSingle};
use crate::common::query_parameters::DbOrder;
use crate::common::{DbCreate, DbDelete, DbPoolHandler, DbReadMany, DbRepository, PoolHandler};
use crate::error::{BusinessLogicError, BusinessLogicErrorKind, DbError};
use crate::models::{
    Comment, CommentCreate, CommentDelete, CommentGetById, CommentReadMany, RepliesByParent,
    UserGetById,
};
use crate::repositories::UserRepository;

pub struct CommentRepository {
    pool_handler: PoolHandler,
}

impl CommentRepository {
    /// Helper to get a comment by ID within a transaction
    pub async fn get_comment<'a>(
        params: CommentGetById,
        transaction_handle: &mut Transaction<'a, Sqlite>,
    ) -> DbResultSingle<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM "Comment" WHERE id = $1
            "#,
        )
        .bind(params.id)
        .fetch_optional(transaction_handle.as_mut())
        .await?;
        Ok(comment)
    }

    /// Helper to check if a comment exists, and optionally checks ownership
    ///
    /// # Params
    /// - `comment`: optional comment retrieved from the database
    /// - `modifier_id`: option - id of the user attempting to modify the
    ///   comment, not checked if omitted (admin override)
    ///
    /// # Returns
    /// - `Ok(comment)`: when the comment exists (and the user may modify it)
    /// - `Err(DbError)`: with appropriate error description otherwise
    pub fn is_comment_correct(
        comment: Option<Comment>,
        modifier_id: Option<i64>,
    ) -> DbResultSingle<Comment> {
        match comment {
            Some(c) => {
                if let Some(uid) = modifier_id
                    && c.user_id != uid
                {
                    return Err(DbError::from(BusinessLogicError::new(
                        BusinessLogicErrorKind::UserNotOwnerOfComment,
                    )));
                }
                Ok(c)
            }
            None => Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::CommentDoesNotExist,
            ))),
        }
    }
}

/// trait for listing the replies below a top-level comment
#[async_trait]
pub trait CommentRepositoryListReplies {
    /// List the direct replies of the given comment, oldest first.
    /// Fails when the parent comment does not exist.
    async fn list_replies(&mut self, params: &RepliesByParent) -> DbResultMultiple<Comment>;
}

#[async_trait]
impl CommentRepositoryListReplies for CommentRepository {
    async fn list_replies(&mut self, params: &RepliesByParent) -> DbResultMultiple<Comment> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let parent = Self::get_comment(CommentGetById::new(params.parent_id), &mut tx).await?;
        Self::is_comment_correct(parent, None)?;

        let replies = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM "Comment" WHERE parent_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(params.parent_id)
        .fetch_all(tx.as_mut())
        .await?;

        tx.commit().await?;

        Ok(replies)
    }
}

#[async_trait]
impl DbRepository for CommentRepository {
    fn new(pool_handler: PoolHandler) -> Self {
        Self { pool_handler }
    }

    async fn disconnect(&mut self) -> () {
        self.pool_handler.disconnect().await;
    }
}

#[async_trait]
impl DbCreate<CommentCreate, Comment> for CommentRepository {
    /// Create a new comment if the author exists and the trimmed text is
    /// non-empty. When a parent is given it must exist and must itself be
    /// top-level (one reply level only); the trimmed text is what gets
    /// persisted.
    async fn create(&mut self, data: &CommentCreate) -> DbResultSingle<Comment> {
        let text = data.text.trim();
        if text.is_empty() {
            return Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::CommentTextEmpty,
            )));
        }

        let mut tx = self.pool_handler.pool.begin().await?;

        let user_opt = UserRepository::get_user(UserGetById::new(data.user_id), &mut tx).await?;
        UserRepository::user_is_correct(user_opt)?;

        if let Some(parent_id) = data.parent_id {
            let parent = Self::get_comment(CommentGetById::new(parent_id), &mut tx).await?;
            let parent = Self::is_comment_correct(parent, None)?;
            if !parent.is_top_level() {
                return Err(DbError::from(BusinessLogicError::new(
                    BusinessLogicErrorKind::ReplyNestingLimitExceeded,
                )));
            }
        }

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO "Comment" (text, created_at, page, user_id, parent_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(text)
        .bind(Utc::now())
        .bind(&data.page)
        .bind(data.user_id)
        .bind(data.parent_id)
        .fetch_one(tx.as_mut())
        .await?;

        tx.commit().await?;

        Ok(comment)
    }
}

#[async_trait]
impl DbReadMany<CommentReadMany, Comment> for CommentRepository {
    /// List the top-level comments of a page. Implement optional query
    /// parameters:
    /// - `order_by_created_at`: if not present, order in descending order
    ///   (newest first)
    /// - `limit` and `offset`: if limit is not present, offset does not
    ///   matter; if offset is not present, use `OFFSET 0` as the default
    async fn read_many(&mut self, params: &CommentReadMany) -> DbResultMultiple<Comment> {
        let created_at_order = params.order_by_created_at.unwrap_or(DbOrder::Desc);

        let query_str = format!(
            r#"
            SELECT * FROM "Comment"
            WHERE page = $1 AND parent_id IS NULL
            ORDER BY created_at {created_at_order}
            LIMIT $2 OFFSET $3
            "#
        );

        let limit = params.limit.unwrap_or(i64::MAX);
        let offset = params.offset.unwrap_or(0);

        let comments = sqlx::query_as::<_, Comment>(&query_str)
            .bind(&params.page)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool_handler.pool.as_ref())
            .await?;

        Ok(comments)
    }
}

#[async_trait]
impl DbDelete<CommentDelete, Comment> for CommentRepository {
    /// Delete the comment if it exists and the requesting user is its author
    /// (or `admin_override` is set). Deleting a top-level comment cascades
    /// within the same transaction: likes of its direct replies, the replies
    /// themselves, the likes of the comment, then the comment.
    async fn delete(&mut self, params: &CommentDelete) -> DbResultMultiple<Comment> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let comment = Self::get_comment(CommentGetById::new(params.id), &mut tx).await?;
        let modifier_id = (!params.admin_override).then_some(params.user_id);
        Self::is_comment_correct(comment, modifier_id)?;

        sqlx::query(
            r#"
            DELETE FROM "Like" WHERE comment_id IN
                (SELECT id FROM "Comment" WHERE parent_id = $1)
            "#,
        )
        .bind(params.id)
        .execute(tx.as_mut())
        .await?;

        let replies = sqlx::query(
            r#"
            DELETE FROM "Comment" WHERE parent_id = $1
            "#,
        )
        .bind(params.id)
        .execute(tx.as_mut())
        .await?;

        sqlx::query(
            r#"
            DELETE FROM "Like" WHERE comment_id = $1
            "#,
        )
        .bind(params.id)
        .execute(tx.as_mut())
        .await?;

        let deleted_comment = sqlx::query_as::<_, Comment>(
            r#"
            DELETE FROM "Comment" WHERE id = $1 RETURNING *
            "#,
        )
        .bind(params.id)
        .fetch_all(tx.as_mut())
        .await?;

        tx.commit().await?;

        debug!(
            "deleted comment {} and {} direct replies",
            params.id,
            replies.rows_affected()
        );

        Ok(deleted_comment)
    }
}
