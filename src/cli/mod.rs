pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, DatabaseConfig};

#[derive(Parser)]
#[command(name = "coffee")]
#[command(about = "Coffee shop API administration: database setup and server")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Drinks table management")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },

    #[command(about = "Run the HTTP API")]
    Serve(commands::serve::ServeArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    // Table management needs only the database settings
    match cli.command {
        Commands::Db { cmd } => {
            let config = DatabaseConfig::from_env()?;
            commands::db::handle(cmd, &config, output_format).await
        }
        Commands::Serve(args) => commands::serve::handle(args, AppConfig::from_env()?).await,
    }
}
