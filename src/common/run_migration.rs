use std::sync::Arc;

use sqlx::SqlitePool;
use sqlx::sqlx_macros::migrate;

use crate::error::DbResultSingle;

#[inline]
/// Run the migration script to ensure the database has been migrated.
///
/// # Errors
/// When the migrations folder could not be found, or database connection cannot be established,
/// or when the code in the migrations is incorrect.
pub async fn run_migration(pool: Arc<SqlitePool>) -> DbResultSingle<()> {
    migrate!("./migrations").run(&*pool).await?;

    Ok(())
}
