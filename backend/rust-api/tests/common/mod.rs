#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use textquest_api::{
    config::Config, create_router, models::OutputSchema,
    services::generation_backend::TextGenerationBackend, services::AppState,
};

pub enum StubReply {
    Value(Value),
    Nothing,
    Fail(String),
}

/// In-process stand-in for the model endpoint that records what it was asked.
pub struct StubBackend {
    reply: StubReply,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
    schemas: Mutex<Vec<OutputSchema>>,
}

impl StubBackend {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay: None,
            prompts: Mutex::new(Vec::new()),
            schemas: Mutex::new(Vec::new()),
        })
    }

    pub fn hint(text: &str) -> Arc<Self> {
        Self::new(StubReply::Value(serde_json::json!({ "hint": text })))
    }

    pub fn slow(reply: StubReply, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay: Some(delay),
            prompts: Mutex::new(Vec::new()),
            schemas: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    pub fn last_schema(&self) -> Option<OutputSchema> {
        self.schemas.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerationBackend for StubBackend {
    async fn generate(&self, prompt: &str, schema: &OutputSchema) -> anyhow::Result<Option<Value>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.schemas.lock().unwrap().push(schema.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            StubReply::Value(value) => Ok(Some(value.clone())),
            StubReply::Nothing => Ok(None),
            StubReply::Fail(message) => Err(anyhow::anyhow!(message.clone())),
        }
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.hints.timeout_ms = 500;
    config.metrics_auth = "metrics:secret".to_string();
    config
}

pub fn create_test_app(backend: Arc<StubBackend>) -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let app_state = Arc::new(AppState::with_backend(test_config(), backend));
    create_router(app_state)
}
