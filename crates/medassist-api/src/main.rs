use tracing_subscriber::EnvFilter;

use medassist_api::config::ApiConfig;
use medassist_api::router;
use medassist_api::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ApiConfig::from_env()?;
    tracing::info!(?config, "starting medassist-api");

    let sdk_config = medassist_storage::client::load_sdk_config().await;
    let app = router(AppState::build(&config, sdk_config)?);

    if config.lambda {
        lambda_http::run(app).await.map_err(|e| eyre::eyre!(e))
    } else {
        let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
        tracing::info!(addr = %config.bind_addr, "listening");
        axum::serve(listener, app).await?;
        Ok(())
    }
}
