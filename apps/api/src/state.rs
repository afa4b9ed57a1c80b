use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::Evaluator;
use crate::llm_client::InferenceClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pipelines, extraction cache and single-flight gates.
    pub evaluator: Arc<Evaluator>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn InferenceClient>) -> Self {
        Self {
            evaluator: Arc::new(Evaluator::new(llm, config.extraction_cache_capacity)),
            config,
        }
    }
}
