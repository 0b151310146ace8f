use crate::bytez_service::BytezGenerator;
use crate::config::{GenerationProvider, RagConfig};
use crate::gemini_service::GeminiGenerator;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Failure reported by the model provider itself, as opposed to transport or
/// local errors.
#[derive(Debug, thiserror::Error)]
#[error("Error from {provider}: {message}")]
pub struct ModelError {
    pub provider: &'static str,
    pub message: String,
}

/// A hosted text-generation model.
#[async_trait]
pub trait Generator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub fn build_generator(config: &RagConfig) -> Arc<dyn Generator> {
    match &config.provider {
        GenerationProvider::Bytez { api_key, api_url } => {
            log::info!("Using Bytez model {}", config.model_name);
            Arc::new(BytezGenerator::new(api_url, api_key, &config.model_name))
        }
        GenerationProvider::Gemini { api_key, api_url } => {
            log::info!("Using Gemini model {}", config.model_name);
            Arc::new(GeminiGenerator::new(api_url, api_key, &config.model_name))
        }
    }
}
