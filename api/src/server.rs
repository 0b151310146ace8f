use crate::error::{ApiError, ApiResult};
use crate::page::{render_index, PageView, FAILED_OUTPUT, PROCESSING_FAILED_OUTPUT};
use crate::query_payload::{GeneratePayload, PageQuery};
use crate::rag_response::{GenerateResponse, HealthResponse};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use minijinja::Environment;
use prompt_rag::{AnswerOptions, ModelError, RagPipeline};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RagPipeline>,
    pub templates: Arc<Environment<'static>>,
    pub default_prompt: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/generate", post(generate))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the model on the given (or default) prompt and renders the result.
/// Failures are shown in the page rather than as an error status, with errors
/// reported by the model kept apart from everything else.
async fn index_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Html<String>> {
    let prompt = query
        .prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| state.default_prompt.clone());
    let options = AnswerOptions {
        use_rag: query.use_rag.unwrap_or(true),
        top_k: None,
    };

    let view = match state.pipeline.answer(&prompt, &options).await {
        Ok(answer) => PageView {
            model_name: answer.model,
            input_prompt: answer.prompt,
            ai_output: answer.output,
            error: None,
            context: answer.context,
        },
        Err(err) => {
            log::error!("Model run failed: {:#}", err);
            let (ai_output, error) = match err.downcast_ref::<ModelError>() {
                Some(model_error) => (FAILED_OUTPUT, model_error.to_string()),
                None => (
                    PROCESSING_FAILED_OUTPUT,
                    format!("An error occurred while processing: {:#}", err),
                ),
            };
            PageView {
                model_name: state.pipeline.model_name().to_string(),
                input_prompt: prompt,
                ai_output: ai_output.to_string(),
                error: Some(error),
                context: Vec::new(),
            }
        }
    };

    render_index(&state.templates, &view)
        .map(Html)
        .map_err(ApiError::render_failed)
}

async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GeneratePayload>, JsonRejection>,
) -> ApiResult<Json<GenerateResponse>> {
    let Json(payload) = payload.map_err(ApiError::invalid_request)?;
    if payload.prompt.trim().is_empty() {
        return Err(ApiError::invalid_prompt());
    }

    let options = AnswerOptions {
        use_rag: payload.use_rag,
        top_k: payload.top_k,
    };
    let answer = state
        .pipeline
        .answer(&payload.prompt, &options)
        .await
        .map_err(ApiError::generation_failed)?;

    log::info!(
        "Generated {} chars with {} context chunks in {} ms",
        answer.output.chars().count(),
        answer.context.len(),
        answer.processing_time_ms
    );

    Ok(Json(GenerateResponse {
        status: "success".to_string(),
        answer,
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.pipeline.model_name().to_string(),
        index: state.pipeline.status(),
    })
}
