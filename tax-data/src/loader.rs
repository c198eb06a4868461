use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{RateTable, RateTableError, TaxBracket};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading a bracket schedule.
#[derive(Debug, Error)]
pub enum RateScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Failed to open schedule '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Tax year {0} has no built-in rate table")]
    UnsupportedYear(i32),

    #[error("No brackets for tax year {0} in schedule")]
    NoRowsForYear(i32),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(#[from] RateTableError),
}

impl From<csv::Error> for RateScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        RateScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// One row of a bracket schedule CSV.
///
/// - `tax_year`: Gregorian year (2025 for 2568 BE)
/// - `min_income`: inclusive lower bound
/// - `max_income`: inclusive upper bound, empty for the open top bracket
/// - `rate`: marginal rate as a fraction (0.05 for 5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RateScheduleRecord {
    pub tax_year: i32,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Builds a [`RateTable`] whose brackets come from a CSV schedule.
///
/// Every other parameter (allowances, caps, expense rates) comes from the
/// built-in table for the same year.
pub struct RateScheduleLoader;

impl RateScheduleLoader {
    /// Parse schedule rows from any reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RateScheduleRecord>, RateScheduleLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: RateScheduleRecord = result?;
            records.push(record);
        }

        debug!(rows = records.len(), "parsed bracket schedule");
        Ok(records)
    }

    /// Replace the brackets of the built-in `tax_year` table with the rows
    /// for that year, sorted by lower bound, and validate the result.
    pub fn build(
        records: &[RateScheduleRecord],
        tax_year: i32,
    ) -> Result<RateTable, RateScheduleLoaderError> {
        let base =
            RateTable::for_year(tax_year).ok_or(RateScheduleLoaderError::UnsupportedYear(tax_year))?;

        let mut brackets: Vec<TaxBracket> = records
            .iter()
            .filter(|record| record.tax_year == tax_year)
            .map(|record| TaxBracket::new(record.min_income, record.max_income, record.rate))
            .collect();
        if brackets.is_empty() {
            return Err(RateScheduleLoaderError::NoRowsForYear(tax_year));
        }
        brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));

        let table = base.with_brackets(brackets);
        table.validate()?;

        info!(tax_year, brackets = table.brackets.len(), "loaded bracket schedule");
        Ok(table)
    }

    /// [`parse`](Self::parse) the file at `path`, then [`build`](Self::build).
    pub fn load_path(
        path: &Path,
        tax_year: i32,
    ) -> Result<RateTable, RateScheduleLoaderError> {
        let file = File::open(path).map_err(|e| RateScheduleLoaderError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let records = Self::parse(file)?;
        Self::build(&records, tax_year)
    }
}
