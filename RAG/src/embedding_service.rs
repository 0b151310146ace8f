use crate::models::*;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::{HashMap, HashSet};

/// Maps text to fixed-length vectors. Document and query embeddings from the
/// same embedder are comparable with cosine similarity.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>>;
}

const VOCABULARY_SIZE: usize = 1000;
const MIN_DIMENSION: usize = 100;

/// Local TF-IDF embedder fitted on the indexed chunks.
pub struct TfIdfEmbedder {
    vocabulary: HashMap<String, usize>,
    idf_scores: HashMap<String, f32>,
    dimension: usize,
}

impl TfIdfEmbedder {
    pub fn fit(texts: &[String]) -> Self {
        log::info!("Fitting TF-IDF vocabulary on {} chunks...", texts.len());

        let mut word_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_frequencies: HashMap<String, usize> = HashMap::new();

        for text in texts {
            let words = tokenize(text);
            let unique_words: HashSet<&String> = words.iter().collect();

            for word in &words {
                *word_counts.entry(word.clone()).or_insert(0) += 1;
            }
            for word in unique_words {
                *doc_frequencies.entry(word.clone()).or_insert(0) += 1;
            }
        }

        let total_docs = texts.len() as f32;
        let idf_scores: HashMap<String, f32> = doc_frequencies
            .into_iter()
            .map(|(word, df)| (word, (total_docs / df as f32).ln()))
            .collect();

        // Most frequent words first; ties broken alphabetically so the layout
        // does not depend on hash order.
        let mut word_freq_pairs: Vec<_> = word_counts.into_iter().collect();
        word_freq_pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let vocabulary: HashMap<String, usize> = word_freq_pairs
            .into_iter()
            .take(VOCABULARY_SIZE)
            .enumerate()
            .map(|(idx, (word, _))| (word, idx))
            .collect();

        let dimension = vocabulary.len().max(MIN_DIMENSION);
        log::info!("TF-IDF vocabulary holds {} terms", vocabulary.len());

        Self {
            vocabulary,
            idf_scores,
            dimension,
        }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimension];
        let words = tokenize(text);
        let total_words = words.len() as f32;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in &words {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }

        for (word, count) in counts {
            if let Some(&idx) = self.vocabulary.get(word) {
                let tf = count as f32 / total_words;
                let idf = self.idf_scores.get(word).copied().unwrap_or(1.0);
                embedding[idx] = tf * idf;
            }
        }

        normalize(&mut embedding);
        embedding
    }
}

#[async_trait]
impl Embedder for TfIdfEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        Ok(self.embed(query))
    }
}

/// Remote embedder speaking the OpenAI `/embeddings` protocol.
pub struct OpenAiEmbedder {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    /// Connects to the endpoint and embeds one sample text to learn the vector size.
    pub async fn connect(api_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let mut embedder = Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            dimension: 0,
        };
        let sample = embedder.request(&["dimension check".to_string()]).await?;
        embedder.dimension = sample.first().map(Vec::len).unwrap_or(0);
        if embedder.dimension == 0 {
            return Err(anyhow!("embedding endpoint returned an empty vector"));
        }
        log::info!("Embedding model {} has dimension {}", embedder.model, embedder.dimension);
        Ok(embedder)
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.api_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Embedding API error ({}): {}", status, error_text));
        }

        let mut payload: EmbeddingResponse = response.json().await?;
        if payload.data.len() != texts.len() {
            return Err(anyhow!(
                "Embedding API returned {} vectors for {} inputs",
                payload.data.len(),
                texts.len()
            ));
        }
        payload.data.sort_by_key(|item| item.index);
        Ok(payload.data.into_iter().map(|item| item.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        log::info!("Embedding {} chunks with {}", texts.len(), self.model);
        self.request(texts).await
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.request(&[query.to_string()])
            .await?
            .pop()
            .ok_or_else(|| anyhow!("Embedding API returned no vector for the query"))
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| word.chars().count() > 2)
        .collect()
}

fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let min_len = a.len().min(b.len());

    let dot_product: f32 = a[..min_len].iter().zip(&b[..min_len]).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
