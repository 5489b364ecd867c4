//! Embedding Server Main
//!
//! Entry point for the HTTP embedding server

use std::sync::Arc;
use text_embed_server::{start_hyper_http_server, EmbeddingEncoder, ModelFactory, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Initialize tracing; RUST_LOG overrides the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.monitoring.filter_directive().into()),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .init();

    config.validate()?;

    println!("🚀 Text Embedding Server");
    println!("📊 Log Level: {}", config.monitoring.log_level);
    println!("===============================");

    // The model is loaded exactly once, before the listener exists
    info!("📦 Loading model '{}' from {}", config.model.name, config.model.model_path);
    let model_config = config.model.clone();
    let model = tokio::task::spawn_blocking(move || ModelFactory::load(&model_config)).await??;
    let encoder = EmbeddingEncoder::new(model);

    println!("✅ Model loaded, {} dimensions", encoder.dimension());
    println!("📡 Ready to accept embedding requests");
    println!("🛑 Press Ctrl+C to stop");

    start_hyper_http_server(Arc::new(config), encoder).await
}
