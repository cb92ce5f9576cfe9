use std::sync::Arc;

use crate::config::Config;
use crate::services::generation_backend::{HttpGenerationBackend, TextGenerationBackend};
use crate::services::hint_service::HintFlow;

pub struct AppState {
    pub config: Config,
    pub hint_flow: HintFlow,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let backend = HttpGenerationBackend::new(&config.llm)?;

        tracing::info!(
            "Generation backend configured: url={}, model={}, api_key_set={}",
            config.llm.base_url,
            backend.model(),
            config.llm.api_key.is_some()
        );

        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Builds state around an already constructed backend
    pub fn with_backend(config: Config, backend: Arc<dyn TextGenerationBackend>) -> Self {
        let hint_flow = HintFlow::new(backend, &config.hints);
        Self { config, hint_flow }
    }
}

pub mod generation_backend;
pub mod hint_prompt;
pub mod hint_review;
pub mod hint_service;
