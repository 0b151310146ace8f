use prompt_rag::{Answer, IndexStatus};
use serde::Serialize;

#[derive(Serialize)]
pub struct GenerateResponse {
    pub status: String,
    #[serde(flatten)]
    pub answer: Answer,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub index: IndexStatus,
}
