mod error;
mod page;
mod query_payload;
mod rag_response;
mod server;

use anyhow::{Context, Result};
use prompt_rag::{RagConfig, RagPipeline};
use server::{build_router, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let config = RagConfig::from_env()?;
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    // The index is built before the listener opens, so every request sees a
    // ready pipeline.
    let pipeline = RagPipeline::from_config(&config)
        .await
        .context("failed to initialize RAG pipeline")?;
    log::info!("Pipeline ready: {:?}", pipeline.status());

    let state = AppState {
        pipeline: Arc::new(pipeline),
        templates: Arc::new(page::template_env()?),
        default_prompt: config.default_prompt.clone(),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
