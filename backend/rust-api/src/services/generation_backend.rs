use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::LlmConfig;
use crate::models::OutputSchema;

/// Opaque "prompt in, structured value out" capability.
///
/// `Ok(None)` means the backend answered but produced no structured result.
#[async_trait]
pub trait TextGenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str, schema: &OutputSchema) -> Result<Option<Value>>;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints with JSON-schema output.
#[derive(Clone)]
pub struct HttpGenerationBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpGenerationBackend {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("Failed to build HTTP client for the generation backend")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerationBackend for HttpGenerationBackend {
    async fn generate(&self, prompt: &str, schema: &OutputSchema) -> Result<Option<Value>> {
        let url = format!("{}/chat/completions", self.base_url);

        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &schema.name,
                    schema: &schema.schema,
                    strict: true,
                },
            },
        };

        let mut request = self.client.post(&url).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .context("Failed to call generation backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Generation backend returned error {}: {}",
                status,
                error_text
            ));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse generation backend response")?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty());

        let Some(content) = content else {
            tracing::debug!("Generation backend returned no message content");
            return Ok(None);
        };

        let value: Value = serde_json::from_str(strip_code_fence(&content))
            .with_context(|| format!("Model output is not valid JSON: {}", content))?;

        if value.is_null() {
            return Ok(None);
        }

        Ok(Some(value))
    }
}

/// Some models wrap JSON answers in a Markdown fence even in structured mode.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(strip_code_fence("{\"hint\":\"x\"}"), "{\"hint\":\"x\"}");
        assert_eq!(
            strip_code_fence("```json\n{\"hint\":\"x\"}\n```"),
            "{\"hint\":\"x\"}"
        );
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    }

    #[test]
    fn fence_language_tag_is_case_insensitive() {
        assert_eq!(
            strip_code_fence("```JSON\n{\"hint\":\"x\"}\n```"),
            "{\"hint\":\"x\"}"
        );
        assert_eq!(strip_code_fence("```Json {} ```"), "{}");
        assert_eq!(strip_code_fence("```js"), "js");
    }

    #[test]
    fn request_body_declares_json_schema_output() {
        let schema = OutputSchema::new("generate_hint_output", json!({"type": "object"}));
        let payload = ChatCompletionRequest {
            model: "gemini-2.0-flash",
            messages: vec![ChatMessage {
                role: "user",
                content: "prompt",
            }],
            temperature: 0.5,
            max_tokens: 64,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &schema.name,
                    schema: &schema.schema,
                    strict: true,
                },
            },
        };

        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(
            body["response_format"]["json_schema"]["name"],
            "generate_hint_output"
        );
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 64);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let config = LlmConfig {
            base_url: "http://localhost:8000/v1/".to_string(),
            api_key: None,
            model: "test-model".to_string(),
            temperature: 0.0,
            max_tokens: 32,
            request_timeout_ms: 1000,
        };

        let backend = HttpGenerationBackend::new(&config).unwrap();
        assert_eq!(backend.base_url, "http://localhost:8000/v1");
        assert_eq!(backend.model(), "test-model");
    }
}
