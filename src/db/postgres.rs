use sqlx::{postgres::PgPoolOptions, PgPool};

/// Creates a PostgreSQL connection pool for the track catalog
///
/// Connections are checked out per query and returned to the pool when the
/// query completes, whether it succeeded or not.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the bundled catalog schema
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Catalog migrations applied");
    Ok(())
}
