pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod schema;
pub mod store;

use diesel_async::pooled_connection::deadpool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, SimpleAsyncConnection};
pub use error::DatabaseError;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::ParticipantStore;
use tracing::info;

pub type Pool = deadpool::Pool<AsyncPgConnection>;

const CREATE_TABLES: &str =
    include_str!("../migrations/2024-11-20-000000_create_secret_santa/up.sql");

// https://github.com/tokio-rs/axum/tree/main/examples/diesel-async-postgres

pub fn get_database_connection(database_url: &str) -> Result<Pool, DatabaseError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Ok(Pool::builder(config).build()?)
}

/// Creates the tables if they are missing. Safe to run on every start.
pub async fn run_migrations(pool: &Pool) -> Result<(), DatabaseError> {
    let mut connection = pool.get().await?;
    connection.batch_execute(CREATE_TABLES).await?;
    info!("database schema is up to date");
    Ok(())
}
