use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CalculationRecord, HistoryStatistics, NewCalculationRecord, NewTaxProfile, ProfileSummary,
    TaxProfile,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Trims `name` and rejects it when blank.
///
/// # Errors
///
/// [`RepositoryError::Validation`] for an empty or whitespace-only name.
pub fn require_name(name: &str) -> Result<&str, RepositoryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RepositoryError::Validation("name is required".to_string()));
    }
    Ok(trimmed)
}

/// Saved input profiles, keyed by display name.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Creates the profile, or replaces the inputs of an existing profile with
    /// the same name. Returns the stored row.
    async fn save_profile(&self, profile: &NewTaxProfile) -> Result<TaxProfile, RepositoryError>;

    async fn get_profile(&self, name: &str) -> Result<TaxProfile, RepositoryError>;

    /// All profiles ordered by name.
    async fn list_profiles(&self) -> Result<Vec<ProfileSummary>, RepositoryError>;

    async fn delete_profile(&self, name: &str) -> Result<(), RepositoryError>;
}

/// Append-only log of past calculations.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn save_calculation(
        &self,
        record: &NewCalculationRecord,
    ) -> Result<CalculationRecord, RepositoryError>;

    async fn get_calculation(&self, id: i64) -> Result<CalculationRecord, RepositoryError>;

    /// Newest first; `None` returns every record.
    async fn list_calculations(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<CalculationRecord>, RepositoryError>;

    async fn delete_calculation(&self, id: i64) -> Result<(), RepositoryError>;

    async fn statistics(&self) -> Result<HistoryStatistics, RepositoryError>;
}

/// A backend that stores both profiles and history.
pub trait TaxRepository: ProfileRepository + HistoryRepository {}

impl<T: ProfileRepository + HistoryRepository> TaxRepository for T {}
