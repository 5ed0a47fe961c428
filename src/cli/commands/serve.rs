use clap::Args;

use crate::config::AppConfig;
use crate::server::{self, StoreKind};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, value_enum, default_value_t = StoreKind::Postgres, help = "Backing store for drinks")]
    pub store: StoreKind,

    #[arg(long, help = "Port to listen on, overriding PORT")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    server::serve(config, args.store).await
}
