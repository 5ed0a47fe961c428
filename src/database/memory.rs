use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::database::models::drink::encode_recipe;
use crate::database::models::{Drink, DrinkChanges, DrinkId, DrinkRow, Ingredient};
use crate::database::repository::{check_title_length, seed_drink, DrinkStore, RepositoryError};

/// In-process drink store for tests and local runs without a database.
///
/// Rows keep the recipe as JSON text, the same shape the PostgreSQL table
/// has, so both stores share the row conversion. All writes happen under a
/// single write lock, which is what makes the title check authoritative.
#[derive(Debug, Default)]
pub struct MemoryDrinkStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    next_id: DrinkId,
    rows: BTreeMap<DrinkId, DrinkRow>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl MemoryState {
    fn title_taken(&self, title: &str, except: Option<DrinkId>) -> bool {
        self.rows
            .values()
            .any(|row| row.title == title && Some(row.id) != except)
    }

    fn insert(&mut self, title: &str, recipe_text: String) -> DrinkRow {
        let row = DrinkRow {
            id: self.next_id,
            title: title.to_string(),
            recipe: recipe_text,
        };
        self.next_id += 1;
        self.rows.insert(row.id, row.clone());
        row
    }
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, RepositoryError> {
        let state = self.state.read().await;
        state.rows.values().cloned().map(Drink::try_from).collect()
    }

    async fn get_by_id(&self, id: DrinkId) -> Result<Option<Drink>, RepositoryError> {
        let state = self.state.read().await;
        state.rows.get(&id).cloned().map(Drink::try_from).transpose()
    }

    async fn create(&self, title: &str, recipe: &[Ingredient]) -> Result<Drink, RepositoryError> {
        check_title_length(title)?;
        let recipe_text = encode_recipe(recipe)?;
        let mut state = self.state.write().await;

        if state.title_taken(title, None) {
            return Err(RepositoryError::DuplicateTitle(title.to_string()));
        }

        let row = state.insert(title, recipe_text);
        info!("Created drink {} ({})", row.id, row.title);
        Drink::try_from(row)
    }

    async fn update(&self, id: DrinkId, changes: &DrinkChanges) -> Result<Drink, RepositoryError> {
        let mut state = self.state.write().await;

        let row = state.rows.get(&id).cloned().ok_or(RepositoryError::NotFound(id))?;
        let mut drink = Drink::try_from(row)?;

        if let Some(title) = changes.renamed_title(&drink.title) {
            check_title_length(title)?;
            if state.title_taken(title, Some(id)) {
                return Err(RepositoryError::DuplicateTitle(title.to_string()));
            }
        }

        changes.apply(&mut drink);
        let updated = DrinkRow {
            id,
            title: drink.title.clone(),
            recipe: encode_recipe(&drink.recipe)?,
        };
        state.rows.insert(id, updated);

        info!("Updated drink {}", id);
        Ok(drink)
    }

    async fn delete(&self, id: DrinkId) -> Result<DrinkId, RepositoryError> {
        let mut state = self.state.write().await;
        let row = state.rows.remove(&id).ok_or(RepositoryError::NotFound(id))?;
        info!("Deleted drink {}", row.id);
        Ok(row.id)
    }

    async fn create_schema(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn reset(&self) -> Result<(), RepositoryError> {
        let (title, recipe) = seed_drink();
        let recipe_text = encode_recipe(&recipe)?;

        let mut state = self.state.write().await;
        *state = MemoryState::default();
        state.insert(&title, recipe_text);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
