use serde::Serialize;

use crate::database::models::{Drink, DrinkId, Ingredient};

/// Public view: ingredient names are withheld
#[derive(Debug, Serialize)]
pub struct ShortDrink<'a> {
    pub id: DrinkId,
    pub title: &'a str,
    pub recipe: Vec<ShortIngredient<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ShortIngredient<'a> {
    pub color: &'a str,
    pub parts: u64,
}

/// Privileged view with the full recipe
#[derive(Debug, Serialize)]
pub struct LongDrink<'a> {
    pub id: DrinkId,
    pub title: &'a str,
    pub recipe: &'a [Ingredient],
}

impl Drink {
    pub fn short(&self) -> ShortDrink<'_> {
        ShortDrink {
            id: self.id,
            title: &self.title,
            recipe: self
                .recipe
                .iter()
                .map(|i| ShortIngredient {
                    color: &i.color,
                    parts: i.parts,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> LongDrink<'_> {
        LongDrink {
            id: self.id,
            title: &self.title,
            recipe: &self.recipe,
        }
    }
}

/// Body of every response that returns drinks
#[derive(Debug, Serialize)]
pub struct DrinkList<T: Serialize> {
    pub drinks: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub delete: DrinkId,
}
