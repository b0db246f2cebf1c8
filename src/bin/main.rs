use company_profile_orchestrator::{
    agent::ProfileAgent, finance::OctagonClient, gemini::GeminiClient, registry::PdsClient,
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

    let company = match std::env::args().nth(1) {
        Some(company) => company,
        None => {
            eprintln!("Usage: profile <company name>");
            std::process::exit(2);
        }
    };

    let gemini_api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
        eprintln!("⚠️  GEMINI_API_KEY not set in .env");
        eprintln!("📌 See .env.example for setup instructions");
        "mock_key".to_string()
    });

    info!("Company Profile Orchestrator starting");

    let agent = ProfileAgent::new(
        Arc::new(PdsClient::from_env()),
        Arc::new(OctagonClient::from_env()),
        Arc::new(GeminiClient::new(gemini_api_key)),
    );

    info!(company = %company, "Building profile");

    let report = agent.company_profile(&company).await;

    println!("\n=== COMPANY PROFILE ===\n");
    println!("{}", report);

    Ok(())
}
