pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use memory::MemoryDrinkStore;
pub use postgres::PgDrinkStore;
pub use repository::{DrinkStore, RepositoryError};
