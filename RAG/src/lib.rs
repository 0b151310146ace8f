pub mod models;
pub mod config;
pub mod document_processor;
pub mod embedding_service;
pub mod vector_index;
pub mod generator;
pub mod bytez_service;
pub mod gemini_service;
pub mod query_service;

pub use models::*;
pub use config::RagConfig;
pub use document_processor::{DocumentProcessor, TextSplitter};
pub use embedding_service::{Embedder, OpenAiEmbedder, TfIdfEmbedder};
pub use vector_index::{Retriever, VectorIndex};
pub use generator::{Generator, ModelError};
pub use bytez_service::BytezGenerator;
pub use gemini_service::GeminiGenerator;
pub use query_service::RagPipeline;
