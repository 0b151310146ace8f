use serde::Deserialize;

fn default_use_rag() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct GeneratePayload {
    pub prompt: String,
    #[serde(default = "default_use_rag")]
    pub use_rag: bool,
    pub top_k: Option<usize>,
}

/// Query string of the HTML page, e.g. `/?prompt=...&use_rag=false`.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub prompt: Option<String>,
    pub use_rag: Option<bool>,
}
