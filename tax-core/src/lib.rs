pub mod calculations;
pub mod db;
pub mod models;

pub use calculations::{TaxCalculator, compute};
pub use db::repository::{
    HistoryRepository, ProfileRepository, RepositoryError, TaxRepository,
};
pub use models::*;
