use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculation_result::{BracketDetail, CalculationResult};
use super::deduction::DeductionDetails;

/// A stored snapshot of one calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: i64,
    pub name: String,
    /// Total gross income.
    pub income: Decimal,
    pub total_deductions: Decimal,
    pub net_income: Decimal,
    pub tax: Decimal,
    pub deduction_details: DeductionDetails,
    pub tax_details: Vec<BracketDetail>,
    pub created_at: DateTime<Utc>,
}

/// For appending to the history (no id or timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCalculationRecord {
    pub name: String,
    pub income: Decimal,
    pub total_deductions: Decimal,
    pub net_income: Decimal,
    pub tax: Decimal,
    pub deduction_details: DeductionDetails,
    pub tax_details: Vec<BracketDetail>,
}

impl NewCalculationRecord {
    /// Snapshot of `result` recorded under `name`.
    pub fn from_result(
        name: impl Into<String>,
        result: &CalculationResult,
    ) -> Self {
        Self {
            name: name.into(),
            income: result.total_income,
            total_deductions: result.total_deductions,
            net_income: result.net_income,
            tax: result.tax,
            deduction_details: result.deduction_details.clone(),
            tax_details: result.tax_details.clone(),
        }
    }
}

/// Aggregates over the whole calculation history. All zero when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStatistics {
    pub total_calculations: i64,
    pub total_tax: Decimal,
    pub average_tax: Decimal,
    pub total_income: Decimal,
    pub average_income: Decimal,
}
