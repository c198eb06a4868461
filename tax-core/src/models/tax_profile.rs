use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::deduction::DeductionInput;
use super::income::IncomeInput;

/// A saved set of inputs, keyed by a unique display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxProfile {
    pub id: i64,
    pub name: String,
    pub income: IncomeInput,
    pub deductions: DeductionInput,
    pub withholding_tax: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating or replacing a profile (no id or timestamps)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaxProfile {
    pub name: String,
    pub income: IncomeInput,
    pub deductions: DeductionInput,
    pub withholding_tax: Decimal,
}

impl From<TaxProfile> for NewTaxProfile {
    fn from(profile: TaxProfile) -> Self {
        Self {
            name: profile.name,
            income: profile.income,
            deductions: profile.deductions,
            withholding_tax: profile.withholding_tax,
        }
    }
}

/// Listing row for saved profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
