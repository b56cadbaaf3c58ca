use std::sync::Arc;
use std::time::Duration;

use crate::{config::Config, db::ProfileStore, services::providers::TextGenerator};

/// Shared application state
///
/// Built once at startup and cloned per request. The store and model client
/// are injected explicitly so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub llm: Arc<dyn TextGenerator>,
    pub project_id: String,
    pub generation_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn ProfileStore>, llm: Arc<dyn TextGenerator>, config: &Config) -> Self {
        Self {
            store,
            llm,
            project_id: config.project_id.clone(),
            generation_timeout: Duration::from_secs(config.generation_timeout_secs),
        }
    }
}
