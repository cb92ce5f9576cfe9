use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Machine-readable declaration of the structured output a backend must return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,
    /// JSON Schema document
    pub schema: Value,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}
