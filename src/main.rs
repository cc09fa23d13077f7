// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use embed_node::{api, config::ServiceConfig, embeddings::EmbeddingService, version};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("Starting {}...\n", version::get_version_string());

    let config = ServiceConfig::from_env();
    tracing::info!(
        "Configuration: model={} dimension={} max_length={} policy={}",
        config.model_name,
        config.dimension,
        config.max_length,
        config.policy
    );

    println!("Loading model and tokenizer...");
    let service = EmbeddingService::load(&config)?;
    println!(
        "Model loaded in {:.2} seconds",
        service.load_duration().as_secs_f64()
    );

    let api_port = config
        .listen_addr
        .rsplit(':')
        .next()
        .unwrap_or("8080")
        .to_string();

    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("Embedding node is running");
    println!("{}", separator);
    println!("Model:          {}", service.model_name());
    println!("Dimension:      {}", service.dimension());
    println!("Policy:         {}", service.policy());
    println!("\nAPI Endpoints:");
    println!("  Health:       http://localhost:{}/health", api_port);
    println!(
        "  Embeddings:   POST http://localhost:{}/v1/embeddings",
        api_port
    );
    println!("\nTest with curl:");
    println!(
        "  curl -X POST http://localhost:{}/v1/embeddings \\",
        api_port
    );
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"input\": \"hello world\"}}'");
    println!("\nPress Ctrl+C to shutdown...");
    println!("{}\n", separator);

    let service = Arc::new(service);
    api::start_server(&config.listen_addr, service)
        .await
        .map_err(|e| anyhow::anyhow!("API server error: {}", e))?;

    println!("Goodbye!");
    Ok(())
}
