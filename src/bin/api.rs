use company_profile_orchestrator::{
    agent::ProfileAgent, api::start_server, finance::OctagonClient, gemini::GeminiClient,
    registry::PdsClient,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let gemini_api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
        eprintln!("⚠️  GEMINI_API_KEY not set in .env");
        eprintln!("📌 See .env.example for setup instructions");
        "mock_key".to_string()
    });

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("🚀 Company Profile Orchestrator - API Server");
    info!("📍 Port: {}", api_port);

    // Create components
    let agent = Arc::new(ProfileAgent::new(
        Arc::new(PdsClient::from_env()),
        Arc::new(OctagonClient::from_env()),
        Arc::new(GeminiClient::new(gemini_api_key)),
    ));

    info!("✅ Profile agent initialized");
    info!("📡 Starting API server...");

    // Start API server
    start_server(agent, api_port).await?;

    Ok(())
}
