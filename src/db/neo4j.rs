use neo4rs::{ConfigBuilder, Graph};

/// Opens a Neo4j driver handle for the social graph
///
/// The handle owns its own connection pool; a session is borrowed for each
/// query and released when the query's stream is dropped.
pub async fn connect_graph(uri: &str, user: &str, password: &str) -> anyhow::Result<Graph> {
    let config = ConfigBuilder::default()
        .uri(uri)
        .user(user)
        .password(password)
        .db("neo4j")
        .build()?;

    let graph = Graph::connect(config).await?;
    tracing::info!(uri = %uri, "Connected to social graph");
    Ok(graph)
}
