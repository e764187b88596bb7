use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use musiclib_api::{
    api::{create_router, AppState},
    config::Config,
    db,
    stores::{Neo4jSocialGraph, PgCatalogStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("musiclib_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Store clients live for the whole process and are shared by reference
    let pool = db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to catalog database")?;
    if config.run_migrations {
        db::run_migrations(&pool).await?;
    }

    let graph = db::connect_graph(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password)
        .await
        .context("Failed to connect to social graph")?;

    let state = AppState::new(
        Arc::new(PgCatalogStore::new(pool.clone())),
        Arc::new(Neo4jSocialGraph::new(graph)),
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
