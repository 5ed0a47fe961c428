pub mod drink;

pub use drink::{Drink, DrinkChanges, DrinkId, DrinkRow, Ingredient};
