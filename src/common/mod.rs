use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;

use error::{DbResultMultiple, DbResultSingle};

pub mod error;
pub mod query_parameters;
pub mod run_migration;

/// Generic trait for the structure handling the database connection pool
#[async_trait]
pub trait DbPoolHandler {
    /// Pool handler constructor
    #[must_use]
    fn new(pool: Arc<SqlitePool>) -> Self;

    /// Method allowing the pool handler to disconnect from the pool
    async fn disconnect(&mut self) -> ();
}

/// Generic pool handler implementation over the sqlite connection pool
#[derive(Clone)]
pub struct PoolHandler {
    pub pool: Arc<SqlitePool>,
}

#[async_trait]
impl DbPoolHandler for PoolHandler {
    #[inline]
    fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Close the connection pool
    async fn disconnect(&mut self) -> () {
        self.pool.close().await;
    }
}

/// Generic database repository, implemented by all repositories of the crate
#[async_trait]
pub trait DbRepository {
    /// Database repository constructor
    #[must_use]
    fn new(pool_handler: PoolHandler) -> Self;

    /// Method allowing the database repository to disconnect from the
    /// database pool gracefully
    async fn disconnect(&mut self) -> ();
}

/// Generic trait for repositories creating entities in the database
#[async_trait]
pub trait DbCreate<Create, Data> {
    /// Generic call which creates a record in the database
    async fn create(&mut self, data: &Create) -> DbResultSingle<Data>;
}

/// Generic trait for repositories reading a single entity from the database
#[async_trait]
pub trait DbReadOne<ReadOne, Data> {
    /// Generic call which reads a single record from the database
    async fn read_one(&mut self, params: &ReadOne) -> DbResultSingle<Data>;
}

/// Generic trait for repositories reading multiple entities from the database
#[async_trait]
pub trait DbReadMany<ReadMany, Data> {
    /// Generic call which reads multiple records from the database
    async fn read_many(&mut self, params: &ReadMany) -> DbResultMultiple<Data>;
}

/// Generic trait for repositories updating entities in the database
#[async_trait]
pub trait DbUpdate<Update, Data> {
    /// Generic call which updates record(s) present in the database
    async fn update(&mut self, params: &Update) -> DbResultMultiple<Data>;
}

/// Generic trait for repositories deleting entities from the database
#[async_trait]
pub trait DbDelete<Delete, Data> {
    /// Generic call which deletes record(s) present in the database
    async fn delete(&mut self, params: &Delete) -> DbResultMultiple<Data>;
}
