use std::sync::Arc;

use proposalgen::config::AppConfig;
use proposalgen::core::llm::GeminiClient;
use proposalgen::core::proposal::ProposalService;
use proposalgen::server;

#[tokio::main]
async fn main() {
    proposalgen::core::logging::init();
    tracing::info!("{} v{} starting", proposalgen::NAME, proposalgen::VERSION);

    let config = AppConfig::load();

    let api_key = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("Error: GEMINI_API_KEY is missing in environment variables");
            std::process::exit(1);
        }
    };

    let client = Arc::new(GeminiClient::new(api_key, config.gemini.clone()));
    let service = Arc::new(ProposalService::new(client, config.clone()));

    let addr = config.socket_addr();
    if let Err(e) = server::serve(addr, service).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
