// One-shot command line front end for the pipeline. The HTTP server lives in
// the ../api crate.

use anyhow::{anyhow, Result};
use prompt_rag::{AnswerOptions, RagConfig, RagPipeline};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = RagConfig::from_env()?;
    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let prompt = if prompt.trim().is_empty() {
        config.default_prompt.clone()
    } else {
        prompt
    };

    let pipeline = RagPipeline::from_config(&config).await?;
    let options = AnswerOptions {
        use_rag: true,
        top_k: None,
    };

    let answer = pipeline
        .answer(&prompt, &options)
        .await
        .map_err(|e| anyhow!("failed to get a result from {}: {}", pipeline.model_name(), e))?;

    println!("Model: {}", answer.model);
    println!("Prompt: {}", answer.prompt);
    if !answer.context.is_empty() {
        println!("\nContext:");
        for (i, chunk) in answer.context.iter().enumerate() {
            println!("[{}] ({:.3}) {}", i + 1, chunk.score, chunk.content);
        }
    }
    println!("\n{}", answer.output);
    log::info!("Answered in {} ms", answer.processing_time_ms);

    Ok(())
}
