use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::{InputError, non_negative};

/// Income categories of Section 40 of the Thai Revenue Code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IncomeCategory {
    /// 40(1)(2) salary, wages and bonus.
    #[serde(rename = "40_1_2")]
    Salary,
    /// 40(4) interest and dividends.
    #[serde(rename = "40_4")]
    InterestDividends,
    /// 40(5) property rental.
    #[serde(rename = "40_5")]
    Rental,
    /// 40(6) liberal professions.
    #[serde(rename = "40_6")]
    ProfessionalFees,
    /// 40(7) contracting.
    #[serde(rename = "40_7")]
    Contracting,
    /// 40(8) business and other income.
    #[serde(rename = "40_8")]
    Other,
}

impl IncomeCategory {
    pub const ALL: [Self; 6] = [
        Self::Salary,
        Self::InterestDividends,
        Self::Rental,
        Self::ProfessionalFees,
        Self::Contracting,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "40_1_2",
            Self::InterestDividends => "40_4",
            Self::Rental => "40_5",
            Self::ProfessionalFees => "40_6",
            Self::Contracting => "40_7",
            Self::Other => "40_8",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Salary => "40(1)(2) Salary / bonus",
            Self::InterestDividends => "40(4) Interest / dividends",
            Self::Rental => "40(5) Property rental",
            Self::ProfessionalFees => "40(6) Professional fees",
            Self::Contracting => "40(7) Contracting",
            Self::Other => "40(8) Other income",
        }
    }
}

/// Gross income per category for one tax year.
///
/// Every field defaults to zero when absent. The keys used by earlier
/// form-based tooling (`income_40_1_2`, `expense_40_1_2`, ...) are accepted as
/// aliases when deserializing. Any other key is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IncomeInput {
    /// 40(1)(2): monthly salary × months + bonus, aggregated by the caller.
    #[serde(alias = "income_40_1_2")]
    pub salary: Decimal,

    /// Caller-supplied 40(1)(2) expense. It can lower the statutory ceiling
    /// but never raise it; `None` uses the ceiling.
    #[serde(alias = "expense_40_1_2", skip_serializing_if = "Option::is_none")]
    pub salary_expense: Option<Decimal>,

    #[serde(alias = "income_40_4")]
    pub interest_dividends: Decimal,

    #[serde(alias = "income_40_5")]
    pub rental: Decimal,

    #[serde(alias = "income_40_6")]
    pub professional_fees: Decimal,

    #[serde(alias = "income_40_7")]
    pub contracting: Decimal,

    #[serde(alias = "income_40_8")]
    pub other: Decimal,
}

impl IncomeInput {
    /// Gross amount reported for `category`.
    pub fn amount(
        &self,
        category: IncomeCategory,
    ) -> Decimal {
        match category {
            IncomeCategory::Salary => self.salary,
            IncomeCategory::InterestDividends => self.interest_dividends,
            IncomeCategory::Rental => self.rental,
            IncomeCategory::ProfessionalFees => self.professional_fees,
            IncomeCategory::Contracting => self.contracting,
            IncomeCategory::Other => self.other,
        }
    }

    /// Rejects negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NegativeAmount`] naming the first offending field.
    pub fn validate(&self) -> Result<(), InputError> {
        non_negative("salary", self.salary)?;
        if let Some(expense) = self.salary_expense {
            non_negative("salary_expense", expense)?;
        }
        non_negative("interest_dividends", self.interest_dividends)?;
        non_negative("rental", self.rental)?;
        non_negative("professional_fees", self.professional_fees)?;
        non_negative("contracting", self.contracting)?;
        non_negative("other", self.other)?;
        Ok(())
    }
}

/// Salary broken down the way payslips report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SalaryComponents {
    pub monthly_salary: Decimal,
    pub months: u32,
    pub bonus: Decimal,
}

impl Default for SalaryComponents {
    fn default() -> Self {
        Self {
            monthly_salary: Decimal::ZERO,
            months: 12,
            bonus: Decimal::ZERO,
        }
    }
}

impl SalaryComponents {
    /// `monthly_salary × months + bonus`.
    pub fn total(&self) -> Decimal {
        self.monthly_salary * Decimal::from(self.months) + self.bonus
    }

    /// # Errors
    ///
    /// Returns [`InputError`] for negative amounts or more than twelve months.
    pub fn validate(&self) -> Result<(), InputError> {
        non_negative("monthly_salary", self.monthly_salary)?;
        non_negative("bonus", self.bonus)?;
        if self.months > 12 {
            return Err(InputError::SalaryMonthsOutOfRange(self.months));
        }
        Ok(())
    }
}

/// Resolved figures for one income category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeDetail {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}
