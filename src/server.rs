use std::sync::Arc;

use anyhow::Context;
use clap::ValueEnum;
use tracing::info;

use crate::auth::TokenVerifier;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::database::{postgres, DrinkStore, MemoryDrinkStore, PgDrinkStore};
use crate::handlers::login::LoginPages;
use crate::routes;

/// Backing store for the drinks table
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    /// Read `COFFEE_STORE`, defaulting to PostgreSQL
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var("COFFEE_STORE") {
            Ok(value) => Self::from_str(&value, true)
                .map_err(|_| anyhow::anyhow!("Invalid value for COFFEE_STORE: {}", value)),
            Err(_) => Ok(StoreKind::Postgres),
        }
    }
}

pub async fn open_store(config: &AppConfig, kind: StoreKind) -> anyhow::Result<Arc<dyn DrinkStore>> {
    match kind {
        StoreKind::Postgres => {
            let pool = postgres::connect(&config.database).await?;
            let store = PgDrinkStore::new(pool);
            if !store.table_exists().await? {
                anyhow::bail!("drinks table does not exist; run `coffee db init` first");
            }
            Ok(Arc::new(store))
        }
        StoreKind::Memory => Ok(Arc::new(MemoryDrinkStore::new())),
    }
}

pub async fn build_context(config: &AppConfig, kind: StoreKind) -> anyhow::Result<AppContext> {
    let store = open_store(config, kind).await?;
    let verifier = TokenVerifier::from_config(&config.auth)?;
    let mut ctx = AppContext::new(store, Arc::new(verifier));

    if let Some(client_id) = config.auth.client_id.as_deref() {
        let base_url = format!("http://localhost:{}", config.server.port);
        ctx = ctx.with_login(LoginPages::new(&config.auth, client_id, &base_url)?);
        info!("Login helper pages enabled at {}/login", base_url);
    }

    Ok(ctx)
}

/// Bind, serve and shut down cleanly on Ctrl-C
pub async fn serve(config: AppConfig, kind: StoreKind) -> anyhow::Result<()> {
    let ctx = build_context(&config, kind).await?;
    let app = routes::app(ctx);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(
        "Coffee shop API listening on http://{} ({:?} mode, {:?} store)",
        bind_addr, config.environment, kind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
