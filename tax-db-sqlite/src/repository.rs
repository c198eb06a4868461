use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tax_core::db::require_name;
use tax_core::{
    CalculationRecord, HistoryRepository, HistoryStatistics, NewCalculationRecord, NewTaxProfile,
    ProfileRepository, ProfileSummary, RepositoryError, TaxProfile,
};
use tracing::{debug, info};

use crate::decimal::{decimal_to_f64, get_decimal, get_json, to_json};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }
}

fn column<'r, T>(
    row: &'r SqliteRow,
    name: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", name, e)))
}

fn row_to_profile(row: &SqliteRow) -> Result<TaxProfile, RepositoryError> {
    Ok(TaxProfile {
        id: column(row, "id")?,
        name: column(row, "name")?,
        income: get_json(row, "income_data")?,
        deductions: get_json(row, "deductions_data")?,
        withholding_tax: get_decimal(row, "withholding_tax")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_calculation(row: &SqliteRow) -> Result<CalculationRecord, RepositoryError> {
    Ok(CalculationRecord {
        id: column(row, "id")?,
        name: column(row, "name")?,
        income: get_decimal(row, "income")?,
        total_deductions: get_decimal(row, "total_deductions")?,
        net_income: get_decimal(row, "net_income")?,
        tax: get_decimal(row, "tax")?,
        deduction_details: get_json(row, "deduction_details")?,
        tax_details: get_json(row, "tax_details")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
    })
}

#[async_trait]
impl ProfileRepository for SqliteRepository {
    async fn save_profile(
        &self,
        profile: &NewTaxProfile,
    ) -> Result<TaxProfile, RepositoryError> {
        let name = require_name(&profile.name)?;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO tax_profile (
                name, income_data, deductions_data, withholding_tax, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                income_data = excluded.income_data,
                deductions_data = excluded.deductions_data,
                withholding_tax = excluded.withholding_tax,
                updated_at = excluded.updated_at",
        )
        .bind(name)
        .bind(to_json(&profile.income, "income")?)
        .bind(to_json(&profile.deductions, "deductions")?)
        .bind(profile.withholding_tax.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        info!(name, "profile saved");
        self.get_profile(name).await
    }

    async fn get_profile(
        &self,
        name: &str,
    ) -> Result<TaxProfile, RepositoryError> {
        let name = require_name(name)?;
        let row = sqlx::query(
            "SELECT id, name, income_data, deductions_data, withholding_tax,
                    created_at, updated_at
             FROM tax_profile WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_profile(&row)
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileSummary>, RepositoryError> {
        let rows =
            sqlx::query("SELECT id, name, created_at, updated_at FROM tax_profile ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(ProfileSummary {
                    id: column(row, "id")?,
                    name: column(row, "name")?,
                    created_at: column::<DateTime<Utc>>(row, "created_at")?,
                    updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
                })
            })
            .collect()
    }

    async fn delete_profile(
        &self,
        name: &str,
    ) -> Result<(), RepositoryError> {
        let name = require_name(name)?;
        let result = sqlx::query("DELETE FROM tax_profile WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!(name, "profile deleted");
        Ok(())
    }
}

#[async_trait]
impl HistoryRepository for SqliteRepository {
    async fn save_calculation(
        &self,
        record: &NewCalculationRecord,
    ) -> Result<CalculationRecord, RepositoryError> {
        let name = require_name(&record.name)?;

        let result = sqlx::query(
            "INSERT INTO calculation_history (
                name, income, total_deductions, net_income, tax,
                deduction_details, tax_details, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(decimal_to_f64(record.income))
        .bind(decimal_to_f64(record.total_deductions))
        .bind(decimal_to_f64(record.net_income))
        .bind(decimal_to_f64(record.tax))
        .bind(to_json(&record.deduction_details, "deduction details")?)
        .bind(to_json(&record.tax_details, "tax details")?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        info!(id, name, tax = %record.tax, "calculation recorded");
        self.get_calculation(id).await
    }

    async fn get_calculation(
        &self,
        id: i64,
    ) -> Result<CalculationRecord, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, income, total_deductions, net_income, tax,
                    deduction_details, tax_details, created_at
             FROM calculation_history WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_calculation(&row)
    }

    async fn list_calculations(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<CalculationRecord>, RepositoryError> {
        // SQLite treats a negative LIMIT as no limit.
        let limit = limit.map_or(-1, i64::from);
        let rows = sqlx::query(
            "SELECT id, name, income, total_deductions, net_income, tax,
                    deduction_details, tax_details, created_at
             FROM calculation_history
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_calculation).collect()
    }

    async fn delete_calculation(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM calculation_history WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn statistics(&self) -> Result<HistoryStatistics, RepositoryError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total_calculations,
                    SUM(tax) AS total_tax,
                    AVG(tax) AS average_tax,
                    SUM(income) AS total_income,
                    AVG(income) AS average_income
             FROM calculation_history",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let stats = HistoryStatistics {
            total_calculations: column(&row, "total_calculations")?,
            total_tax: get_decimal(&row, "total_tax")?,
            average_tax: get_decimal(&row, "average_tax")?,
            total_income: get_decimal(&row, "total_income")?,
            average_income: get_decimal(&row, "average_income")?,
        };
        debug!(count = stats.total_calculations, "history statistics computed");
        Ok(stats)
    }
}
