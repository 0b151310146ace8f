use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MODEL_NAME: &str = "abhinema/gpt";
pub const DEFAULT_GEMINI_MODEL_NAME: &str = "gemini-2.5-flash";
pub const DEFAULT_PROMPT: &str = "Once upon a time, there was a robot";
pub const DEFAULT_BYTEZ_API_URL: &str = "https://api.bytez.com/models/v2";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_EMBEDDING_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationProvider {
    Bytez { api_key: String, api_url: String },
    Gemini { api_key: String, api_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingProvider {
    TfIdf,
    OpenAi {
        api_key: String,
        api_url: String,
        model: String,
    },
}

#[derive(Debug, Clone)]
pub struct RagConfig {
    pub provider: GenerationProvider,
    pub model_name: String,
    pub default_prompt: String,
    pub document_path: Option<PathBuf>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub embedding: EmbeddingProvider,
}

impl RagConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| anyhow!("{} environment variable not set", key))
        };

        let provider_name = get("GENERATION_PROVIDER").unwrap_or_else(|| "bytez".to_string());
        let (provider, default_model) = match provider_name.to_lowercase().as_str() {
            "bytez" => (
                GenerationProvider::Bytez {
                    api_key: required("BYTEZ_API_KEY")?,
                    api_url: get("BYTEZ_API_URL")
                        .unwrap_or_else(|| DEFAULT_BYTEZ_API_URL.to_string()),
                },
                DEFAULT_MODEL_NAME,
            ),
            "gemini" => (
                GenerationProvider::Gemini {
                    api_key: required("GEMINI_API_KEY")?,
                    api_url: get("GEMINI_API_URL")
                        .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
                },
                DEFAULT_GEMINI_MODEL_NAME,
            ),
            other => return Err(anyhow!("unknown GENERATION_PROVIDER: {}", other)),
        };

        let embedding_name = get("EMBEDDING_PROVIDER").unwrap_or_else(|| "tfidf".to_string());
        let embedding = match embedding_name.to_lowercase().as_str() {
            "tfidf" => EmbeddingProvider::TfIdf,
            "openai" => EmbeddingProvider::OpenAi {
                api_key: required("EMBEDDING_API_KEY")?,
                api_url: get("EMBEDDING_API_URL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_API_URL.to_string()),
                model: get("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            },
            other => return Err(anyhow!("unknown EMBEDDING_PROVIDER: {}", other)),
        };

        let chunk_size: usize = parse_or(&get, "CHUNK_SIZE", 500)?;
        let chunk_overlap: usize = parse_or(&get, "CHUNK_OVERLAP", 50)?;
        if chunk_size == 0 {
            return Err(anyhow!("CHUNK_SIZE must be greater than zero"));
        }
        if chunk_overlap >= chunk_size {
            return Err(anyhow!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                chunk_overlap,
                chunk_size
            ));
        }

        Ok(Self {
            provider,
            model_name: get("MODEL_NAME").unwrap_or_else(|| default_model.to_string()),
            default_prompt: get("DEFAULT_PROMPT").unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            document_path: get("RAG_DOCUMENT").map(PathBuf::from),
            chunk_size,
            chunk_overlap,
            top_k: parse_or(&get, "TOP_K", 4)?,
            embedding,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<RagConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RagConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_use_bytez_and_tfidf() {
        let config = config_from(&[("BYTEZ_API_KEY", "secret")]).unwrap();
        assert_eq!(
            config.provider,
            GenerationProvider::Bytez {
                api_key: "secret".into(),
                api_url: DEFAULT_BYTEZ_API_URL.into()
            }
        );
        assert_eq!(config.embedding, EmbeddingProvider::TfIdf);
        assert_eq!(config.model_name, DEFAULT_MODEL_NAME);
        assert_eq!(config.default_prompt, DEFAULT_PROMPT);
        assert_eq!((config.chunk_size, config.chunk_overlap, config.top_k), (500, 50, 4));
        assert!(config.document_path.is_none());
    }

    #[test]
    fn default_model_follows_the_provider() {
        let config = config_from(&[("GENERATION_PROVIDER", "gemini"), ("GEMINI_API_KEY", "k")]).unwrap();
        assert_eq!(config.model_name, DEFAULT_GEMINI_MODEL_NAME);
        assert!(matches!(config.provider, GenerationProvider::Gemini { .. }));

        let config = config_from(&[
            ("GENERATION_PROVIDER", "gemini"),
            ("GEMINI_API_KEY", "k"),
            ("MODEL_NAME", "gemini-2.0-pro"),
        ])
        .unwrap();
        assert_eq!(config.model_name, "gemini-2.0-pro");
    }

    #[test]
    fn missing_key_names_the_variable() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("BYTEZ_API_KEY"));

        let err = config_from(&[("GENERATION_PROVIDER", "gemini")]).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("BYTEZ_API_KEY", "k"), ("RAG_DOCUMENT", "  ")]).unwrap();
        assert!(config.document_path.is_none());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let err = config_from(&[
            ("BYTEZ_API_KEY", "k"),
            ("CHUNK_SIZE", "100"),
            ("CHUNK_OVERLAP", "100"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("CHUNK_OVERLAP"));
    }

    #[test]
    fn rejects_garbage_numbers_and_providers() {
        let err = config_from(&[("BYTEZ_API_KEY", "k"), ("TOP_K", "many")]).unwrap_err();
        assert!(err.to_string().contains("TOP_K"));

        let err = config_from(&[("GENERATION_PROVIDER", "llama")]).unwrap_err();
        assert!(err.to_string().contains("llama"));
    }

    #[test]
    fn openai_embeddings_need_a_key() {
        let err = config_from(&[("BYTEZ_API_KEY", "k"), ("EMBEDDING_PROVIDER", "openai")])
            .unwrap_err();
        assert!(err.to_string().contains("EMBEDDING_API_KEY"));

        let config = config_from(&[
            ("BYTEZ_API_KEY", "k"),
            ("EMBEDDING_PROVIDER", "OpenAI"),
            ("EMBEDDING_API_KEY", "e"),
        ])
        .unwrap();
        assert_eq!(
            config.embedding,
            EmbeddingProvider::OpenAi {
                api_key: "e".into(),
                api_url: DEFAULT_EMBEDDING_API_URL.into(),
                model: DEFAULT_EMBEDDING_MODEL.into(),
            }
        );
    }
}
