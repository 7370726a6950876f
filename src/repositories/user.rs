use async_trait::async_trait;
use chrono::Utc;
use log::info;
use sqlx::{Sqlite, Transaction};

use crate::common::error::{DbResultMultiple, DbResultSingle};
use crate::common::{
    DbCreate, DbDelete, DbPoolHandler, DbReadOne, DbRepository, DbUpdate, PoolHandler,
};
use crate::error::{BusinessLogicError, BusinessLogicErrorKind, DbError};
use crate::models::{User, UserCreate, UserDelete, UserGetById, UserResolveIdentity, UserUpdate};

pub struct UserRepository {
    pool_handler: PoolHandler,
}

impl UserRepository {
    /// Function which retrieves a user by their id, usable within a transaction
    ///
    /// # Params
    /// - `params`: structure containing the id of the user
    /// - `transaction_handle` mutable reference to an ongoing transaction
    ///
    /// # Returns
    /// - `Ok(user)`: on successful connection and retrieval
    /// - `Err(_)`: otherwise
    pub async fn get_user<'a>(
        params: UserGetById,
        transaction_handle: &mut Transaction<'a, Sqlite>,
    ) -> DbResultSingle<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM "User" WHERE id = $1
            "#,
        )
        .bind(params.id)
        .fetch_optional(transaction_handle.as_mut())
        .await?;
        Ok(user)
    }

    /// Function which checks if the user is correct (existing)
    ///
    /// # Params
    /// - `user`: optional user retrieved from the database
    ///
    /// # Returns
    /// - `Ok(user)`: when the user exists
    /// - `Err(DbError)`: with appropriate error description otherwise
    pub fn user_is_correct(user: Option<User>) -> DbResultSingle<User> {
        match user {
            Some(u) => Ok(u),
            None => Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::UserDoesNotExist,
            ))),
        }
    }

    /// Map a unique-constraint violation on the email column to the matching
    /// business logic error, leaving every other error untouched
    fn map_constraint_error(err: sqlx::Error) -> DbError {
        if let sqlx::Error::Database(db_err) = &err
            && matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
        {
            return DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::UserEmailAlreadyExists,
            ));
        }
        err.into()
    }
}

/// trait for resolving an external provider identity to a local User
#[async_trait]
pub trait UserRepositoryResolveIdentity {
    /// Look the user up by the provider's external id; create them on first
    /// sight, refresh nickname/avatar (and email, when the provider supplied
    /// one) on every subsequent login
    async fn resolve_identity(&mut self, params: &UserResolveIdentity) -> DbResultSingle<User>;
}

#[async_trait]
impl UserRepositoryResolveIdentity for UserRepository {
    async fn resolve_identity(&mut self, params: &UserResolveIdentity) -> DbResultSingle<User> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let column = params.provider.external_id_column();
        let select = format!(
            r#"
            SELECT * FROM "User" WHERE {column} = $1
            "#
        );
        let existing = sqlx::query_as::<_, User>(&select)
            .bind(&params.external_id)
            .fetch_optional(tx.as_mut())
            .await?;

        let user = match existing {
            Some(found) => {
                let refreshed = sqlx::query_as::<_, User>(
                    r#"
                    UPDATE "User"
                    SET nickname = $2, avatar = $3, email = COALESCE($4, email)
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(found.id)
                .bind(&params.nickname)
                .bind(params.avatar_or_default())
                .bind(&params.email)
                .fetch_one(tx.as_mut())
                .await
                .map_err(Self::map_constraint_error)?;

                refreshed
            }
            None => {
                let insert = format!(
                    r#"
                    INSERT INTO "User" (nickname, avatar, {column}, email, created_at)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING *
                    "#
                );
                let created = sqlx::query_as::<_, User>(&insert)
                    .bind(&params.nickname)
                    .bind(params.avatar_or_default())
                    .bind(&params.external_id)
                    .bind(params.email_or_placeholder())
                    .bind(Utc::now())
                    .fetch_one(tx.as_mut())
                    .await
                    .map_err(Self::map_constraint_error)?;

                info!(
                    "created user {} for {} identity {}",
                    created.id, params.provider, params.external_id
                );
                created
            }
        };

        tx.commit().await?;

        Ok(user)
    }
}

#[async_trait]
impl DbRepository for UserRepository {
    #[inline]
    fn new(pool_handler: PoolHandler) -> Self {
        Self { pool_handler }
    }

    #[inline]
    async fn disconnect(&mut self) -> () {
        self.pool_handler.disconnect().await;
    }
}

#[async_trait]
impl DbCreate<UserCreate, User> for UserRepository {
    /// Create a new user with the specified data (bootstrap seeding)
    async fn create(&mut self, data: &UserCreate) -> DbResultSingle<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO "User" (nickname, avatar, email, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.nickname)
        .bind(&data.avatar)
        .bind(&data.email)
        .bind(Utc::now())
        .fetch_one(self.pool_handler.pool.as_ref())
        .await
        .map_err(Self::map_constraint_error)?;

        Ok(user)
    }
}

#[async_trait]
impl DbReadOne<UserGetById, User> for UserRepository {
    /// Read the user with the given id, failing when they do not exist
    async fn read_one(&mut self, params: &UserGetById) -> DbResultSingle<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM "User" WHERE id = $1
            "#,
        )
        .bind(params.id)
        .fetch_optional(self.pool_handler.pool.as_ref())
        .await?;

        Self::user_is_correct(user)
    }
}

#[async_trait]
impl DbUpdate<UserUpdate, User> for UserRepository {
    /// Update the user's profile fields, keeping those passed as `None`.
    /// Fails if the relevant update fields are all none.
    async fn update(&mut self, params: &UserUpdate) -> DbResultMultiple<User> {
        if params.update_fields_none() {
            return Err(DbError::from(BusinessLogicError::new(
                BusinessLogicErrorKind::UserUpdateParametersEmpty,
            )));
        }

        let mut tx = self.pool_handler.pool.begin().await?;

        let user_opt = Self::get_user(UserGetById::new(params.id), &mut tx).await?;
        Self::user_is_correct(user_opt)?;

        let updated_users = sqlx::query_as::<_, User>(
            r#"
            UPDATE "User" SET
                nickname = COALESCE($2, nickname),
                avatar = COALESCE($3, avatar),
                email = COALESCE($4, email)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(params.id)
        .bind(&params.nickname)
        .bind(&params.avatar)
        .bind(&params.email)
        .fetch_all(tx.as_mut())
        .await
        .map_err(Self::map_constraint_error)?;

        tx.commit().await?;

        Ok(updated_users)
    }
}

#[async_trait]
impl DbDelete<UserDelete, User> for UserRepository {
    /// Delete the user. The foreign key graph cascades through their
    /// comments, the replies under those comments, and every affected like.
    async fn delete(&mut self, params: &UserDelete) -> DbResultMultiple<User> {
        let mut tx = self.pool_handler.pool.begin().await?;

        let user_opt = Self::get_user(UserGetById::new(params.id), &mut tx).await?;
        Self::user_is_correct(user_opt)?;

        let users = sqlx::query_as::<_, User>(
            r#"
            DELETE FROM "User" WHERE id = $1 RETURNING *
            "#,
        )
        .bind(params.id)
        .fetch_all(tx.as_mut())
        .await?;

        tx.commit().await?;

        Ok(users)
    }
}
