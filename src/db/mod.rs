pub mod neo4j;
pub mod postgres;

pub use neo4j::connect_graph;
pub use postgres::{create_pool, run_migrations};
