use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Drink, DrinkChanges, DrinkId, Ingredient};

/// Width of the `title` column; both stores reject longer titles
pub const MAX_TITLE_CHARS: usize = 80;

/// Errors from a drink store
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Drink {0} not found")]
    NotFound(DrinkId),

    #[error("A drink titled '{0}' already exists")]
    DuplicateTitle(String),

    #[error("Stored recipe for drink {id} is malformed: {source}")]
    CorruptRecipe {
        id: DrinkId,
        #[source]
        source: serde_json::Error,
    },

    #[error("Title is {0} characters, the limit is {MAX_TITLE_CHARS}")]
    TitleTooLong(usize),

    #[error("Recipe could not be serialized: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl RepositoryError {
    /// Faults of the store itself, as opposed to lookup and uniqueness outcomes
    pub fn is_storage_fault(&self) -> bool {
        !matches!(self, RepositoryError::NotFound(_) | RepositoryError::DuplicateTitle(_))
    }
}

/// Mirrors the `VARCHAR(80)` column so every store rejects the same titles
pub fn check_title_length(title: &str) -> Result<(), RepositoryError> {
    let chars = title.chars().count();
    if chars > MAX_TITLE_CHARS {
        return Err(RepositoryError::TitleTooLong(chars));
    }
    Ok(())
}

/// Seed drink inserted by [`DrinkStore::reset`]
pub fn seed_drink() -> (String, Vec<Ingredient>) {
    (
        "water".to_string(),
        vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }],
    )
}

/// Persistence of drinks. Title uniqueness is enforced by the store itself,
/// the lookups callers do beforehand only produce friendlier errors.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// All drinks ordered by id
    async fn list_all(&self) -> Result<Vec<Drink>, RepositoryError>;

    async fn get_by_id(&self, id: DrinkId) -> Result<Option<Drink>, RepositoryError>;

    async fn create(&self, title: &str, recipe: &[Ingredient]) -> Result<Drink, RepositoryError>;

    async fn update(&self, id: DrinkId, changes: &DrinkChanges) -> Result<Drink, RepositoryError>;

    /// Returns the id of the removed drink
    async fn delete(&self, id: DrinkId) -> Result<DrinkId, RepositoryError>;

    /// Create the backing table if it does not exist
    async fn create_schema(&self) -> Result<(), RepositoryError>;

    /// Drop all drinks, recreate the schema and insert the seed drink
    async fn reset(&self) -> Result<(), RepositoryError>;

    async fn health_check(&self) -> Result<(), RepositoryError>;
}
