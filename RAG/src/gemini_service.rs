use crate::generator::{Generator, ModelError};
use crate::models::*;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

pub struct GeminiGenerator {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
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
impl Generator for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: 0.3,
                max_output_tokens: 1000,
            }),
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.api_url, self.model, self.api_key
        );

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(ModelError {
                provider: "Gemini",
                message: error_text,
            }
            .into());
        }

        let gemini_response: GeminiResponse = response.json().await?;

        let answer = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_else(|| "No response generated".to_string());

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn spawn_stub() -> String {
        async fn generate(
            Path(target): Path<String>,
            Query(params): Query<HashMap<String, String>>,
            Json(body): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            if params.get("key").map(String::as_str) != Some("gem-key") {
                return (StatusCode::FORBIDDEN, Json(json!({ "error": { "message": "API key not valid" } })));
            }
            assert_eq!(body["generationConfig"]["maxOutputTokens"], json!(1000));
            let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
            if prompt == "silence" {
                return (StatusCode::OK, Json(json!({ "candidates": [] })));
            }
            (
                StatusCode::OK,
                Json(json!({
                    "candidates": [{ "content": { "parts": [{ "text": format!("{} says {}", target, prompt) }] } }]
                })),
            )
        }

        let app = Router::new().route("/models/:target", post(generate));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/models", addr)
    }

    #[tokio::test]
    async fn returns_first_candidate_text() {
        let url = spawn_stub().await;
        let generator = GeminiGenerator::new(&url, "gem-key", "gemini-2.5-flash");
        let output = generator.generate("hello").await.unwrap();
        assert_eq!(output, "gemini-2.5-flash:generateContent says hello");

        let output = generator.generate("silence").await.unwrap();
        assert_eq!(output, "No response generated");
    }

    #[tokio::test]
    async fn surfaces_api_errors() {
        let url = spawn_stub().await;
        let generator = GeminiGenerator::new(&url, "wrong", "gemini-2.5-flash");
        let err = generator.generate("hello").await.unwrap_err();
        assert!(err.to_string().contains("API key not valid"));
        assert!(err.downcast_ref::<ModelError>().is_some());
    }
}
