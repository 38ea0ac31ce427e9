use anyhow::Result;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sqlx::postgres::{PgPool, PgPoolOptions};

pub type DbPool = PgPool;
pub type OrmConn = DatabaseConnection;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Wrap an existing pool so SeaORM and raw sqlx queries share connections.
pub fn create_orm_conn(pool: &DbPool) -> OrmConn {
    SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone())
}

/// Apply the SQL files in `migrations/` that have not run yet.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
