use std::sync::Arc;

use crate::stores::{CatalogStore, InMemoryCatalog, InMemoryGraph, SocialGraph};

/// Shared application state
///
/// Holds the store clients built once at startup. Cloning only bumps the
/// reference counts.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub graph: Arc<dyn SocialGraph>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore>, graph: Arc<dyn SocialGraph>) -> Self {
        Self { catalog, graph }
    }

    /// State backed by empty in-memory stores
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryCatalog::new()),
            Arc::new(InMemoryGraph::new()),
        )
    }
}
