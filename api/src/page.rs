use minijinja::Environment;
use prompt_rag::RetrievedChunk;
use serde::Serialize;

pub const FAILED_OUTPUT: &str = "Failed to get a result from the model.";
pub const PROCESSING_FAILED_OUTPUT: &str = "Failed to process the request.";

#[derive(Debug, Serialize)]
pub struct PageView {
    pub model_name: String,
    pub input_prompt: String,
    pub ai_output: String,
    pub error: Option<String>,
    pub context: Vec<RetrievedChunk>,
}

/// Template environment with the page templates compiled in. `.html` names get
/// HTML auto-escaping.
pub fn template_env() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("index.html", include_str!("../templates/index.html"))?;
    Ok(env)
}

pub fn render_index(env: &Environment<'static>, view: &PageView) -> Result<String, minijinja::Error> {
    env.get_template("index.html")?.render(view)
}
