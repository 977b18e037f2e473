//! Dochat server binary
//!
//! Run with: cargo run -p dochat --bin dochat-server

use dochat::{config::DochatConfig, server::DochatServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dochat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration: dochat.toml if present, defaults otherwise
    let config = match std::env::var("DOCHAT_CONFIG") {
        Ok(path) => DochatConfig::load(&path)?,
        Err(_) if std::path::Path::new("dochat.toml").exists() => {
            DochatConfig::load("dochat.toml")?
        }
        Err(_) => DochatConfig::from_env(),
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - Database: {}", config.storage.database_path.display());
    tracing::info!("  - Upload folder: {}", config.storage.upload_dir.display());
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Chunk overlap: {}", config.chunking.chunk_overlap);
    tracing::info!(
        "  - Max files per discussion: {}",
        config.limits.max_files_per_discussion
    );

    if config.llm.api_key.is_empty() {
        tracing::warn!("LLM_API_KEY is not set; chat requests will return the fallback message");
    }

    let server = DochatServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/discussions            - Create a discussion");
    println!("  POST /api/discussions/:id/files  - Upload documents");
    println!("  POST /api/discussions/:id/chat   - Ask questions");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
