use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Opens the PostgreSQL pool backing the record and subscription stores.
/// Pool sizing comes from `Config` (DB_MAX_CONNECTIONS).
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("PostgreSQL pool ready (up to {max_connections} connections)");
    Ok(pool)
}
