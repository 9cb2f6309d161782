use anyhow::Result;
use dotenv::dotenv;
use insightlens_server::{AppState, ServerConfig, router};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logging();

    let config = ServerConfig::from_env()?;
    let addr = config.addr;
    info!(
        max_rows = config.max_rows,
        max_upload_bytes = config.max_upload_bytes,
        "Starting InsightLens API"
    );

    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
