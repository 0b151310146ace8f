use reqwest::Client;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new();
    let base_url = std::env::var("SERVER_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());

    println!("🔍 Testing prompt service client");

    println!("\n📋 Health Check:");
    let health_response = client.get(format!("{}/health", base_url)).send().await?;

    println!("Status: {}", health_response.status());
    let health_json: serde_json::Value = health_response.json().await?;
    println!("Response: {}", serde_json::to_string_pretty(&health_json)?);

    println!("\n🔍 Generate (with retrieval):");
    let payload = json!({
        "prompt": "Once upon a time, there was a robot",
        "use_rag": true,
        "top_k": 3
    });

    let response = client
        .post(format!("{}/generate", base_url))
        .json(&payload)
        .send()
        .await?;

    println!("Status: {}", response.status());
    let response_json: serde_json::Value = response.json().await?;
    println!("Response: {}", serde_json::to_string_pretty(&response_json)?);

    println!("\n✅ Client test completed!");
    Ok(())
}
