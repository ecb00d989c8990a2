//! RAG server binary
//!
//! Run with: cargo run --bin openrag-server

use openrag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openrag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::load_or_default();

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding backend: {:?}", config.backend);
    tracing::info!("  - Embedding model: {}", config.embedding.model);
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Collection: {}", config.collection_name);

    // Quick reachability check for the local embedding server
    if config.backend == openrag::config::EmbeddingBackend::Local {
        tracing::info!("Checking embedding server at {}...", config.embedding.base_url);
        let client = reqwest::Client::new();
        match client
            .get(format!("{}/api/tags", config.embedding.base_url))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!("Embedding server is running");
            }
            _ => {
                tracing::warn!(
                    "Embedding server not available at {}",
                    config.embedding.base_url
                );
                tracing::warn!("Start one with: ollama serve && ollama pull all-minilm");
            }
        }
    }

    if RagConfig::openai_api_key().is_none() {
        tracing::warn!("OPENAI_API_KEY not set");
        tracing::warn!("Retrieval endpoints work normally; /api/query will report missing_api_key");
        tracing::warn!("Set the key and restart to enable answer generation");
    }

    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/query     - Ask questions with citations");
    println!("  POST /api/search    - Retrieve chunks without generation");
    println!("  POST /api/rebuild   - Re-ingest the corpus");
    println!("  GET  /api/documents - List documents");
    println!("  GET  /api/stats     - System statistics");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
