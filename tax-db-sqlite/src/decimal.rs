use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};
use tax_core::RepositoryError;

/// Reads a decimal column stored as INTEGER, REAL or decimal TEXT. NULL reads
/// as zero, which is what SQL aggregates return over an empty table.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get INTEGER from '{}': {}", column, e))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            Decimal::from_str(val.trim()).map_err(|e| {
                RepositoryError::Database(format!(
                    "Column '{}' holds '{}', not a decimal: {}",
                    column, val, e
                ))
            })
        }
        "NULL" => Ok(Decimal::ZERO),
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Convert a Decimal to f64 for REAL columns.
pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Encodes `value` for a JSON TEXT column.
pub fn to_json<T: Serialize>(
    value: &T,
    what: &str,
) -> Result<String, RepositoryError> {
    serde_json::to_string(value)
        .map_err(|e| RepositoryError::Serialization(format!("Failed to encode {}: {}", what, e)))
}

/// Decodes the JSON TEXT in `column`.
pub fn get_json<T: DeserializeOwned>(
    row: &SqliteRow,
    column: &str,
) -> Result<T, RepositoryError> {
    let text: String = row
        .try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;
    serde_json::from_str(&text).map_err(|e| {
        RepositoryError::Serialization(format!("Failed to decode '{}': {}", column, e))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE test_values (
                id INTEGER PRIMARY KEY,
                int_value INTEGER,
                real_value REAL,
                null_value REAL,
                text_value TEXT,
                blob_value BLOB
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn fetch(
        pool: &SqlitePool,
        insert: &str,
        select: &str,
    ) -> SqliteRow {
        sqlx::query(insert)
            .execute(pool)
            .await
            .expect("Failed to insert test data");
        sqlx::query(select)
            .fetch_one(pool)
            .await
            .expect("Failed to fetch row")
    }

    // get_decimal tests

    #[tokio::test]
    async fn get_decimal_from_integer() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, int_value) VALUES (1, 150001)",
            "SELECT int_value FROM test_values",
        )
        .await;

        assert_eq!(get_decimal(&row, "int_value"), Ok(dec!(150001)));
    }

    #[tokio::test]
    async fn get_decimal_from_real() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, real_value) VALUES (1, 21500.5)",
            "SELECT real_value FROM test_values",
        )
        .await;

        assert_eq!(get_decimal(&row, "real_value"), Ok(dec!(21500.5)));
    }

    #[tokio::test]
    async fn get_decimal_from_decimal_text_is_exact() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, text_value) VALUES (1, '12345.678901234')",
            "SELECT text_value FROM test_values",
        )
        .await;

        assert_eq!(get_decimal(&row, "text_value"), Ok(dec!(12345.678901234)));
    }

    #[tokio::test]
    async fn get_decimal_from_null_returns_zero() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id) VALUES (1)",
            "SELECT SUM(real_value) AS total FROM test_values WHERE id = 2",
        )
        .await;

        assert_eq!(get_decimal(&row, "total"), Ok(Decimal::ZERO));
    }

    #[tokio::test]
    async fn get_decimal_rejects_non_numeric_text() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, text_value) VALUES (1, 'sixty thousand')",
            "SELECT text_value FROM test_values",
        )
        .await;

        assert!(matches!(
            get_decimal(&row, "text_value"),
            Err(RepositoryError::Database(msg)) if msg.starts_with("Column 'text_value' holds 'sixty thousand'")
        ));
    }

    #[tokio::test]
    async fn get_decimal_rejects_blob() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, blob_value) VALUES (1, x'00ff')",
            "SELECT blob_value FROM test_values",
        )
        .await;

        assert_eq!(
            get_decimal(&row, "blob_value"),
            Err(RepositoryError::Database(
                "Unexpected type 'BLOB' for column 'blob_value'".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn get_decimal_column_not_found() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id) VALUES (1)",
            "SELECT id FROM test_values",
        )
        .await;

        assert!(matches!(
            get_decimal(&row, "missing"),
            Err(RepositoryError::Database(msg)) if msg.starts_with("Column 'missing' not found:")
        ));
    }

    // JSON helpers

    #[tokio::test]
    async fn json_round_trip_through_text_column() {
        let pool = setup_test_db().await;
        let mut map = BTreeMap::new();
        map.insert("rmf".to_string(), dec!(250000.125));
        let encoded = to_json(&map, "test map").unwrap();

        sqlx::query("INSERT INTO test_values (id, text_value) VALUES (1, ?)")
            .bind(&encoded)
            .execute(&pool)
            .await
            .unwrap();
        let row = sqlx::query("SELECT text_value FROM test_values")
            .fetch_one(&pool)
            .await
            .unwrap();

        let decoded: BTreeMap<String, Decimal> = get_json(&row, "text_value").unwrap();
        assert_eq!(decoded, map);
    }

    #[tokio::test]
    async fn get_json_reports_malformed_text() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, text_value) VALUES (1, '{not json')",
            "SELECT text_value FROM test_values",
        )
        .await;

        let result: Result<BTreeMap<String, Decimal>, _> = get_json(&row, "text_value");

        assert!(matches!(result, Err(RepositoryError::Serialization(_))));
    }

    // decimal_to_f64 tests

    #[test]
    fn decimal_to_f64_converts_amounts() {
        assert_eq!(decimal_to_f64(dec!(21500.25)), 21500.25);
        assert_eq!(decimal_to_f64(Decimal::ZERO), 0.0);
    }
}
