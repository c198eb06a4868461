use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::deduction::DeductionDetails;
use super::income::{IncomeCategory, IncomeDetail};

/// Tax owed within one bracket of the progressive schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketDetail {
    /// Display range, e.g. `"150,001 - 300,000"`.
    pub range: String,
    pub taxable_amount: Decimal,
    /// Marginal rate in percent (5 for 5%).
    pub rate: Decimal,
    pub tax: Decimal,
}

/// Full breakdown of one tax computation.
///
/// Values are unrounded; round with
/// [`crate::calculations::common::round_half_up`] for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub income_after_expenses: Decimal,
    /// Categories with nonzero income only.
    pub income_details: BTreeMap<IncomeCategory, IncomeDetail>,

    pub total_deductions: Decimal,
    pub deduction_details: DeductionDetails,

    pub donation: Decimal,
    pub education_donation: Decimal,
    pub total_donation: Decimal,

    /// Income after expenses and all deductions.
    pub net_income_before_donation: Decimal,
    /// Taxable income: `net_income_before_donation` with donations taken off
    /// once more.
    pub net_income: Decimal,

    pub tax: Decimal,
    /// Per-bracket breakdown of `net_income_before_donation`.
    pub tax_details: Vec<BracketDetail>,

    pub withholding_tax: Decimal,
    pub tax_refund: Decimal,
    pub tax_additional: Decimal,

    pub tax_percent_of_income: Decimal,
    pub tax_percent_of_net: Decimal,
    pub net_income_after_tax: Decimal,
}
