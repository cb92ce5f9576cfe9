use std::time::Duration;

use thiserror::Error;

/// Failure of a single hint generation call. No partial response accompanies it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HintError {
    #[error("invalid hint request: {0}")]
    Validation(#[from] ValidationError),

    #[error("hint generation failed: {0}")]
    Generation(#[from] GenerationError),
}

impl HintError {
    /// Generation failures are transient from the caller's point of view; bad input is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HintError::Generation(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.first() {
            Some((field, field_errors)) => {
                let message = field_errors
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                ValidationError::new(field.to_string(), message)
            }
            None => ValidationError::new("request", errors.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("backend call failed: {0}")]
    Backend(String),

    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("generation was cancelled by the caller")]
    Cancelled,

    #[error("backend returned no structured output")]
    MissingOutput,

    #[error("backend output does not match the hint schema: {0}")]
    MalformedOutput(String),

    #[error("backend returned an empty hint")]
    EmptyHint,
}
