pub mod factory;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use repository::{
    HistoryRepository, ProfileRepository, RepositoryError, TaxRepository, require_name,
};
