use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

impl ApiError {
    pub fn invalid_prompt() -> (StatusCode, Json<ApiError>) {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "invalid_prompt".to_string(),
                message: "Prompt must not be empty".to_string(),
            }),
        )
    }

    pub fn invalid_request(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
        (
            rejection.status(),
            Json(ApiError {
                error: "invalid_request".to_string(),
                message: rejection.body_text(),
            }),
        )
    }

    pub fn generation_failed(err: anyhow::Error) -> (StatusCode, Json<ApiError>) {
        log::error!("Generation failed: {:#}", err);
        (
            StatusCode::BAD_GATEWAY,
            Json(ApiError {
                error: "generation_failed".to_string(),
                message: format!("{:#}", err),
            }),
        )
    }

    pub fn render_failed(err: minijinja::Error) -> (StatusCode, Json<ApiError>) {
        log::error!("Template rendering failed: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: "render_failed".to_string(),
                message: err.to_string(),
            }),
        )
    }
}
