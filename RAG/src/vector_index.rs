use crate::embedding_service::{cosine_similarity, Embedder};
use crate::models::*;
use anyhow::{anyhow, Result};
use rayon::prelude::*;
use std::sync::Arc;

/// Flat cosine index over chunk embeddings. Immutable once built.
#[derive(Debug)]
pub struct VectorIndex {
    chunks: Vec<DocumentChunk>,
    embeddings: Vec<Vec<f32>>,
    dimension: usize,
}

impl VectorIndex {
    pub fn build(chunks: Vec<DocumentChunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(anyhow!(
                "cannot index {} chunks with {} embeddings",
                chunks.len(),
                embeddings.len()
            ));
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some(pos) = embeddings.iter().position(|e| e.len() != dimension) {
            return Err(anyhow!(
                "embedding {} has dimension {}, expected {}",
                pos,
                embeddings[pos].len(),
                dimension
            ));
        }

        log::info!("Indexed {} chunks (dimension {})", chunks.len(), dimension);
        Ok(Self {
            chunks,
            embeddings,
            dimension,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn chunk(&self, position: usize) -> Option<&DocumentChunk> {
        self.chunks.get(position)
    }

    /// Returns up to `k` `(position, score)` pairs, best first. Equal scores
    /// keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        if k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .par_iter()
            .enumerate()
            .map(|(pos, embedding)| {
                let score = cosine_similarity(query, embedding);
                // NaN (from overflowing remote vectors) ranks last
                (pos, if score.is_nan() { f32::NEG_INFINITY } else { score })
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(k);
        scored
    }
}

/// Top-k query API over a [`VectorIndex`].
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embeds each chunk with `embedder` and indexes the result.
    pub async fn build(embedder: Arc<dyn Embedder>, chunks: Vec<DocumentChunk>) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed_documents(&texts).await?;
        let index = VectorIndex::build(chunks, embeddings)?;
        Ok(Self::new(embedder, Arc::new(index)))
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        if k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query).await?;
        if query_embedding.len() != self.index.dimension() {
            return Err(anyhow!(
                "query embedding has dimension {}, index expects {}",
                query_embedding.len(),
                self.index.dimension()
            ));
        }
        let hits = self.index.search(&query_embedding, k);

        let retrieved: Vec<RetrievedChunk> = hits
            .into_iter()
            .filter_map(|(pos, score)| {
                self.index.chunk(pos).map(|chunk| RetrievedChunk {
                    content: chunk.content.clone(),
                    score,
                    start: chunk.start_position,
                    end: chunk.end_position,
                })
            })
            .collect();

        log::info!("Retrieved {} chunks", retrieved.len());
        Ok(retrieved)
    }
}
