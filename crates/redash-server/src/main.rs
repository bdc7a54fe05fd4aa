use redash_mcp::{RedashMcpServer, ToolInvocationAdapter};
use redash_server::{config::Config, health, logging::init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config.logging);

    tracing::info!("Starting redash-mcp server");
    tracing::info!(
        interval_ms = config.poll.interval_ms,
        timeout_secs = config.poll.timeout_secs,
        "Poll policy loaded"
    );

    let adapter = ToolInvocationAdapter::from_credentials(
        config.credentials(),
        config.poll_policy(),
        config.poll.request_timeout(),
    );
    if adapter.is_configured() {
        tracing::info!("Redash credentials loaded");
    }

    if config.health.enabled {
        let health_config = config.health.clone();
        tokio::spawn(async move {
            if let Err(e) = health::serve(&health_config).await {
                tracing::error!("Health endpoint stopped: {}", e);
            }
        });
    }

    RedashMcpServer::new(adapter).serve_stdio().await?;

    Ok(())
}
