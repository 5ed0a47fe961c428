pub mod format;
pub mod validate;

pub use format::{Deleted, DrinkList, LongDrink, ShortDrink};
pub use validate::{parse_body, validate_drink_changes, validate_new_drink, NewDrink, ValidationError};
