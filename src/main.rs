use gitdeck::config::Config;
use gitdeck::{AppResult, Gateway};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gitdeck=info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    // Load configuration, falling back to defaults when no file exists
    let config = Config::load_or_default()?;
    let addr = config.bind_addr()?;

    let gateway = Gateway::from_config(&config)?;
    tracing::info!(
        timeout_ms = config.execution.timeout_ms,
        max_output_bytes = config.execution.max_output_bytes,
        max_concurrent = gateway.max_concurrent(),
        "gateway ready"
    );

    gitdeck::server::serve(addr, Arc::new(gateway)).await?;

    Ok(())
}
