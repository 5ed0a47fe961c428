use coffee_shop_api::{config::AppConfig, server::{self, StoreKind}};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH0_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting coffee shop API in {:?} mode", config.environment);

    server::serve(config, StoreKind::from_env()?).await
}
