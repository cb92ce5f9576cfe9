use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use validator::Validate;

use crate::config::HintsConfig;
use crate::error::{GenerationError, HintError};
use crate::metrics;
use crate::models::{HintRequest, HintResponse};
use crate::services::generation_backend::TextGenerationBackend;
use crate::services::{hint_prompt, hint_review};

/// Turns the current scene and inventory into one model-generated hint.
///
/// Stateless: every call validates, renders, makes exactly one backend call and
/// either returns a non-empty hint or fails. Nothing is cached or retried.
pub struct HintFlow {
    backend: Arc<dyn TextGenerationBackend>,
    default_timeout: Duration,
    phrasing_review: bool,
}

impl HintFlow {
    pub fn new(backend: Arc<dyn TextGenerationBackend>, config: &HintsConfig) -> Self {
        Self {
            backend,
            default_timeout: Duration::from_millis(config.timeout_ms),
            phrasing_review: config.phrasing_review,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub async fn generate(&self, request: HintRequest) -> Result<HintResponse, HintError> {
        self.generate_with_timeout(request, self.default_timeout).await
    }

    pub async fn generate_with_timeout(
        &self,
        request: HintRequest,
        timeout: Duration,
    ) -> Result<HintResponse, HintError> {
        let result = self
            .run(
                request,
                tokio::time::sleep(timeout),
                GenerationError::Timeout(timeout),
            )
            .await;
        record_outcome(result)
    }

    /// Runs the flow until `cancel` resolves. The pending backend call is dropped on cancellation.
    pub async fn generate_until<C>(
        &self,
        request: HintRequest,
        cancel: C,
    ) -> Result<HintResponse, HintError>
    where
        C: Future<Output = ()>,
    {
        let result = self.run(request, cancel, GenerationError::Cancelled).await;
        record_outcome(result)
    }

    async fn run<C>(
        &self,
        request: HintRequest,
        cancel: C,
        on_cancel: GenerationError,
    ) -> Result<HintResponse, HintError>
    where
        C: Future<Output = ()>,
    {
        if let Err(err) = request.check() {
            tracing::info!("Rejected hint request: {}", err);
            return Err(err.into());
        }

        let prompt = hint_prompt::render(&request);
        let schema = HintResponse::output_schema();

        tracing::debug!(
            "Requesting hint: scene_chars={}, inventory_items={}, prompt_chars={}",
            request.scene_description.chars().count(),
            request.inventory.len(),
            prompt.len()
        );

        let output = tokio::select! {
            biased;
            _ = cancel => {
                tracing::warn!("Hint generation stopped before the backend answered: {}", on_cancel);
                return Err(on_cancel.into());
            }
            output = metrics::track_generation(self.backend.generate(&prompt, &schema)) => output,
        };

        let value = match output {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::warn!("Generation backend returned no structured output");
                return Err(GenerationError::MissingOutput.into());
            }
            Err(e) => {
                tracing::warn!("Generation backend failed: {:#}", e);
                return Err(GenerationError::Backend(format!("{:#}", e)).into());
            }
        };

        let mut response: HintResponse = serde_json::from_value(value).map_err(|e| {
            tracing::warn!("Generation backend output failed schema validation: {}", e);
            GenerationError::MalformedOutput(e.to_string())
        })?;

        if response.validate().is_err() {
            tracing::warn!("Generation backend returned a blank hint");
            return Err(GenerationError::EmptyHint.into());
        }
        response.hint = response.hint.trim().to_string();

        if self.phrasing_review {
            for concern in hint_review::review(&response.hint) {
                tracing::warn!(
                    "Hint phrasing concern ({}): {}",
                    concern.as_str(),
                    response.hint
                );
                metrics::record_phrasing_concern(concern.as_str());
            }
        }

        tracing::info!("Hint generated: hint_chars={}", response.hint.chars().count());
        Ok(response)
    }
}

fn record_outcome(result: Result<HintResponse, HintError>) -> Result<HintResponse, HintError> {
    let outcome = match &result {
        Ok(_) => "success",
        Err(HintError::Validation(_)) => "validation_error",
        Err(HintError::Generation(GenerationError::Timeout(_))) => "timeout",
        Err(HintError::Generation(GenerationError::Cancelled)) => "cancelled",
        Err(HintError::Generation(_)) => "generation_error",
    };
    metrics::record_hint_outcome(outcome);
    result
}
