use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tax_core::db::repository::{RepositoryError, TaxRepository};
use tax_core::db::{DbConfig, RepositoryFactory};
use tracing::debug;

use crate::repository::SqliteRepository;

const MEMORY: &str = ":memory:";

/// Maps a connection string to a sqlx SQLite URL.
///
/// * `":memory:"` becomes `sqlite::memory:`.
/// * Strings already starting with `sqlite:` pass through.
/// * Anything else is a file path, created on first use.
pub fn database_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed == MEMORY {
        "sqlite::memory:".to_string()
    } else if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else {
        format!("sqlite://{}?mode=rwc", trimmed)
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use tax_core::db::RepositoryRegistry;
/// use tax_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database and applies pending migrations.
    ///
    /// An in-memory database lives on a single connection so every query
    /// sees the migrated schema.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn TaxRepository>, RepositoryError> {
        let url = database_url(&config.connection_string);
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| RepositoryError::Configuration(format!("invalid sqlite url '{}': {}", url, e)))?
            .create_if_missing(true);

        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        debug!(%url, max_connections, "connecting to sqlite");
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        let repo = SqliteRepository::new_with_pool(pool);
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{:#}", e)))?;
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tax_core::db::{DbConfig, RepositoryFactory};
    use tax_core::{HistoryRepository, HistoryStatistics, ProfileRepository};

    use super::*;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[test]
    fn database_url_maps_connection_strings() {
        assert_eq!(database_url(":memory:"), "sqlite::memory:");
        assert_eq!(database_url("sqlite://taxes.db"), "sqlite://taxes.db");
        assert_eq!(database_url("thai-tax.db"), "sqlite://thai-tax.db?mode=rwc");
    }

    #[tokio::test]
    async fn creates_migrated_in_memory_repository() {
        let repo = SqliteRepositoryFactory
            .create(&DbConfig::new("sqlite", ":memory:"))
            .await
            .expect("failed to create in-memory repository");

        assert_eq!(
            repo.statistics().await.expect("history table should exist"),
            HistoryStatistics::default()
        );
        assert!(repo.list_profiles().await.expect("profile table should exist").is_empty());
    }
}
