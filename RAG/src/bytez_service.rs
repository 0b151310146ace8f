use crate::generator::{Generator, ModelError};
use crate::models::*;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

pub struct BytezGenerator {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl BytezGenerator {
    pub fn new(api_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Generator for BytezGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}", self.api_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&BytezRequest {
                text: prompt.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<BytezResponse> = serde_json::from_str(&body).ok();

        // Output wins over a reported error; Bytez sometimes sends both.
        let (output, error) = match parsed {
            Some(parsed) => (
                parsed.output.and_then(extract_output).filter(|text| !text.is_empty()),
                parsed.error.as_ref().and_then(render_error),
            ),
            None => (None, None),
        };

        if let Some(output) = output {
            return Ok(output);
        }
        if let Some(message) = error {
            return Err(ModelError {
                provider: "Bytez",
                message,
            }
            .into());
        }
        if !status.is_success() {
            return Err(anyhow!("Bytez API error ({}): {}", status, body));
        }
        Err(anyhow!("Bytez returned no output for model {}", self.model))
    }
}

fn render_error(error: &Value) -> Option<String> {
    match error {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Pulls generated text out of the shapes Bytez uses for text tasks.
fn extract_output(output: Value) -> Option<String> {
    match output {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Array(items) => items.into_iter().next().and_then(extract_output),
        Value::Object(mut map) => {
            for key in ["generated_text", "content", "text"] {
                if let Some(Value::String(text)) = map.remove(key) {
                    return Some(text);
                }
            }
            Some(Value::Object(map).to_string())
        }
        other => Some(other.to_string()),
    }
}
