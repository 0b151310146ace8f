use crate::config::{EmbeddingProvider, RagConfig};
use crate::document_processor::{DocumentProcessor, TextSplitter};
use crate::embedding_service::{Embedder, OpenAiEmbedder, TfIdfEmbedder};
use crate::generator::{build_generator, Generator};
use crate::models::*;
use crate::vector_index::Retriever;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Instant;

/// Retrieval plus generation. Built once at startup and shared read-only.
pub struct RagPipeline {
    generator: Arc<dyn Generator>,
    retriever: Option<Retriever>,
    default_k: usize,
}

impl RagPipeline {
    pub fn new(generator: Arc<dyn Generator>, retriever: Option<Retriever>, default_k: usize) -> Self {
        Self {
            generator,
            retriever,
            default_k,
        }
    }

    /// Builds the generator and, when a document is configured, the whole
    /// load -> split -> embed -> index chain.
    pub async fn from_config(config: &RagConfig) -> Result<Self> {
        log::info!("Initializing RAG pipeline...");
        let generator = build_generator(config);

        let retriever = match &config.document_path {
            Some(path) => {
                let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap)?;
                let document = DocumentProcessor::new(splitter).process_document(path).await?;
                let texts: Vec<String> = document.chunks.iter().map(|c| c.content.clone()).collect();

                let embedder: Arc<dyn Embedder> = match &config.embedding {
                    EmbeddingProvider::TfIdf => Arc::new(TfIdfEmbedder::fit(&texts)),
                    EmbeddingProvider::OpenAi {
                        api_key,
                        api_url,
                        model,
                    } => Arc::new(OpenAiEmbedder::connect(api_url, api_key, model).await?),
                };

                Some(Retriever::build(embedder, document.chunks).await?)
            }
            None => {
                log::info!("RAG_DOCUMENT not set, prompts are forwarded without retrieval");
                None
            }
        };

        log::info!("RAG pipeline initialized successfully!");
        Ok(Self::new(generator, retriever, config.top_k))
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    pub fn status(&self) -> IndexStatus {
        match &self.retriever {
            Some(retriever) => IndexStatus::Ready {
                chunks: retriever.index().len(),
                dimension: retriever.index().dimension(),
            },
            None => IndexStatus::Disabled,
        }
    }

    pub async fn answer(&self, prompt: &str, options: &AnswerOptions) -> Result<Answer> {
        let start_time = Instant::now();
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(anyhow!("prompt must not be empty"));
        }

        let context = match (&self.retriever, options.use_rag) {
            (Some(retriever), true) => {
                let k = options.top_k.unwrap_or(self.default_k);
                retriever.retrieve(prompt, k).await?
            }
            _ => Vec::new(),
        };

        let full_prompt = build_prompt(prompt, &context);
        log::debug!("Sending prompt with {} context chunks", context.len());
        let output = self.generator.generate(&full_prompt).await?;

        Ok(Answer {
            model: self.model_name().to_string(),
            prompt: prompt.to_string(),
            output,
            context,
            processing_time_ms: start_time.elapsed().as_millis(),
        })
    }
}

/// Wraps the question with retrieved passages. With no passages the prompt
/// goes out unchanged.
pub fn build_prompt(query: &str, context: &[RetrievedChunk]) -> String {
    if context.is_empty() {
        return query.to_string();
    }

    let passages = context
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[{}] {}", i + 1, chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"Use the following pieces of context to answer the question at the end.
If the context does not contain the answer, say that you don't know instead of making one up.

CONTEXT:
{passages}

QUESTION: {query}

ANSWER:"#
    )
}
