use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use tracing::{error, info};

use crate::config::{ConfigError, DatabaseConfig};
use crate::database::models::drink::encode_recipe;
use crate::database::models::{Drink, DrinkChanges, DrinkId, DrinkRow, Ingredient};
use crate::database::repository::{check_title_length, seed_drink, DrinkStore, RepositoryError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drinks (
        id SERIAL PRIMARY KEY,
        title VARCHAR(80) NOT NULL UNIQUE,
        recipe TEXT NOT NULL
    )
"#;

/// Open a connection pool for the configured database
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, anyhow::Error> {
    let url = config
        .url
        .as_deref()
        .ok_or(ConfigError::Missing("DATABASE_URL"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(url)
        .await?;

    info!("Created database pool (max {} connections)", config.max_connections);
    Ok(pool)
}

/// Drink store backed by the PostgreSQL `drinks` table
#[derive(Clone)]
pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether `coffee db init` has created the drinks table yet
    pub async fn table_exists(&self) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT to_regclass('drinks') IS NOT NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn title_taken(
        tx: &mut Transaction<'_, Postgres>,
        title: &str,
        except: Option<DrinkId>,
    ) -> Result<bool, RepositoryError> {
        let row: Option<(DrinkId,)> =
            sqlx::query_as("SELECT id FROM drinks WHERE title = $1 AND ($2::INTEGER IS NULL OR id <> $2)")
                .bind(title)
                .bind(except)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(row.is_some())
    }
}

/// The unique index is the final word on duplicate titles
fn map_unique_violation(err: sqlx::Error, title: &str) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::DuplicateTitle(title.to_string());
        }
    }
    error!("SQLx error: {}", err);
    RepositoryError::Sqlx(err)
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, RepositoryError> {
        let rows: Vec<DrinkRow> = sqlx::query_as("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Drink::try_from).collect()
    }

    async fn get_by_id(&self, id: DrinkId) -> Result<Option<Drink>, RepositoryError> {
        let row: Option<DrinkRow> = sqlx::query_as("SELECT id, title, recipe FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Drink::try_from).transpose()
    }

    async fn create(&self, title: &str, recipe: &[Ingredient]) -> Result<Drink, RepositoryError> {
        check_title_length(title)?;
        let recipe_text = encode_recipe(recipe)?;
        let mut tx = self.pool.begin().await?;

        if Self::title_taken(&mut tx, title, None).await? {
            return Err(RepositoryError::DuplicateTitle(title.to_string()));
        }

        let row: DrinkRow = sqlx::query_as(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(title)
        .bind(&recipe_text)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, title))?;

        tx.commit().await.map_err(|e| map_unique_violation(e, title))?;
        info!("Created drink {} ({})", row.id, row.title);
        Drink::try_from(row)
    }

    async fn update(&self, id: DrinkId, changes: &DrinkChanges) -> Result<Drink, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<DrinkRow> =
            sqlx::query_as("SELECT id, title, recipe FROM drinks WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let mut drink = Drink::try_from(row.ok_or(RepositoryError::NotFound(id))?)?;

        if let Some(title) = changes.renamed_title(&drink.title) {
            check_title_length(title)?;
            if Self::title_taken(&mut tx, title, Some(id)).await? {
                return Err(RepositoryError::DuplicateTitle(title.to_string()));
            }
        }

        changes.apply(&mut drink);
        let recipe_text = encode_recipe(&drink.recipe)?;

        sqlx::query("UPDATE drinks SET title = $1, recipe = $2 WHERE id = $3")
            .bind(&drink.title)
            .bind(&recipe_text)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, &drink.title))?;

        tx.commit().await.map_err(|e| map_unique_violation(e, &drink.title))?;
        info!("Updated drink {}", id);
        Ok(drink)
    }

    async fn delete(&self, id: DrinkId) -> Result<DrinkId, RepositoryError> {
        let row: Option<(DrinkId,)> = sqlx::query_as("DELETE FROM drinks WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let (deleted,) = row.ok_or(RepositoryError::NotFound(id))?;
        info!("Deleted drink {}", deleted);
        Ok(deleted)
    }

    async fn create_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), RepositoryError> {
        let (title, recipe) = seed_drink();
        let recipe_text = encode_recipe(&recipe)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS drinks").execute(&mut *tx).await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO drinks (title, recipe) VALUES ($1, $2)")
            .bind(&title)
            .bind(&recipe_text)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Reset drinks table");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
