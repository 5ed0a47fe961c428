use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::DatabaseConfig;
use crate::database::{postgres, DrinkStore, PgDrinkStore};

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    #[command(about = "Create the drinks table if it does not exist")]
    Init,

    #[command(about = "Drop and recreate the drinks table, seeded with one drink")]
    Reset,
}

pub async fn handle(cmd: DbCommands, config: &DatabaseConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = postgres::connect(config).await?;
    let store = PgDrinkStore::new(pool);

    match cmd {
        DbCommands::Init => {
            store.create_schema().await?;
            output_success(output_format, "Drinks table ready", None)
        }
        DbCommands::Reset => {
            store.reset().await?;
            let drinks = store.list_all().await?;
            output_success(
                output_format,
                &format!("Drinks table reset ({} drink seeded)", drinks.len()),
                Some(json!({ "drinks": drinks.iter().map(|d| d.long()).collect::<Vec<_>>() })),
            )
        }
    }
}
