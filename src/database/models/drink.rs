use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::repository::RepositoryError;

pub type DrinkId = i32;

/// One line of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Partial update; `None` leaves the field as it is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkChanges {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

impl DrinkChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }

    pub fn apply(&self, drink: &mut Drink) {
        if let Some(title) = &self.title {
            drink.title = title.clone();
        }
        if let Some(recipe) = &self.recipe {
            drink.recipe = recipe.clone();
        }
    }

    /// Title that has to be checked for uniqueness, if the change renames the drink
    pub fn renamed_title<'a>(&'a self, current: &str) -> Option<&'a str> {
        self.title.as_deref().filter(|title| *title != current)
    }
}

/// Row shape of the `drinks` table: the recipe is kept as JSON text
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: DrinkId,
    pub title: String,
    pub recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = RepositoryError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let recipe = decode_recipe(&row.recipe)
            .map_err(|source| RepositoryError::CorruptRecipe { id: row.id, source })?;
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe,
        })
    }
}

pub fn encode_recipe(recipe: &[Ingredient]) -> Result<String, RepositoryError> {
    serde_json::to_string(recipe).map_err(RepositoryError::Encode)
}

pub fn decode_recipe(raw: &str) -> Result<Vec<Ingredient>, serde_json::Error> {
    serde_json::from_str(raw)
}
