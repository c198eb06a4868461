//! Rate table for a single Thai personal income tax year.
//!
//! A [`RateTable`] bundles everything the calculation pipeline needs that is
//! fixed by law for a tax year: the progressive bracket schedule, the
//! statutory expense rates per income category, the fixed allowance amounts
//! and every deduction ceiling. It is built once and passed by reference into
//! [`crate::calculations::compute`].
//!
//! # Brackets
//!
//! Brackets use inclusive integer lower bounds, one above the previous
//! bracket's upper bound, as published by the Revenue Department:
//!
//! | Net income              | Rate |
//! |-------------------------|------|
//! | 0 - 150,000             | 0%   |
//! | 150,001 - 300,000       | 5%   |
//! | 300,001 - 500,000       | 10%  |
//! | 500,001 - 750,000       | 15%  |
//! | 750,001 - 1,000,000     | 20%  |
//! | 1,000,001 - 2,000,000   | 25%  |
//! | 2,000,001 - 5,000,000   | 30%  |
//! | 5,000,001 - ∞           | 35%  |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::RateTable;
//!
//! let table = RateTable::thai_2025();
//!
//! assert!(table.validate().is_ok());
//! assert_eq!(table.buddhist_era_year(), 2568);
//! assert_eq!(table.brackets[1].min_income, dec!(150001));
//! assert_eq!(table.brackets[1].label(), "150,001 - 300,000");
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::format_amount;

/// The only tax year with a built-in rate table.
pub const SUPPORTED_TAX_YEAR: i32 = 2025;

/// Offset between the Gregorian and the Thai Buddhist Era calendar.
const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Errors reported by [`RateTable::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateTableError {
    #[error("rate table has no brackets")]
    NoBrackets,

    #[error("first bracket must start at 0, starts at {0}")]
    FirstBracketNotAtZero(Decimal),

    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedBeforeLast { index: usize },

    #[error("last bracket must be unbounded, ends at {0}")]
    LastBracketBounded(Decimal),

    #[error("bracket {index} starts at {found}, expected {expected}")]
    NotContiguous {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} has an upper bound {max} below its lower bound {min}")]
    InvertedBracket {
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidPercentage { name: &'static str, value: Decimal },
}

/// One band of the progressive schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive lower bound of the band.
    pub min_income: Decimal,
    /// Inclusive upper bound, `None` for the final open-ended band.
    pub max_income: Option<Decimal>,
    /// Marginal rate as a fraction (0.05 for 5%).
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            tax_rate,
        }
    }

    /// Human readable range, e.g. `"150,001 - 300,000"` or `"5,000,001 - ∞"`.
    pub fn label(&self) -> String {
        let upper = self
            .max_income
            .map(|max| format_amount(max, 0))
            .unwrap_or_else(|| "∞".to_string());
        format!("{} - {}", format_amount(self.min_income, 0), upper)
    }

    /// Whether `income` lies at or below this bracket's upper bound.
    pub fn contains_upper(
        &self,
        income: Decimal,
    ) -> bool {
        self.max_income.is_some_and(|max| income <= max)
    }
}

/// Statutory expense deductions per Section 40 income category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRates {
    /// Flat ceiling for 40(1)(2) salary and bonus.
    pub salary_ceiling: Decimal,
    /// 40(4) interest and dividends.
    pub interest_dividends: Decimal,
    /// 40(5) property rental.
    pub rental: Decimal,
    /// 40(6) liberal professions.
    pub professional_fees: Decimal,
    /// 40(7) contracting.
    pub contracting: Decimal,
    /// 40(8) other income.
    pub other: Decimal,
}

/// Fixed allowance amounts that are granted rather than claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowances {
    /// Reference personal allowance. The aggregator takes the supplied
    /// personal amount as-is; this value is what callers normally supply.
    pub personal: Decimal,
    pub spouse: Decimal,
    pub child: Decimal,
    /// Second and later children born from 2018 (2561 BE) onwards.
    pub child_second: Decimal,
    pub parent: Decimal,
    pub easy_e_receipt: Decimal,
}

/// A fund ceiling expressed both as a share of income and as an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundCap {
    pub percent_of_income: Decimal,
    pub amount: Decimal,
}

impl FundCap {
    pub fn new(
        percent_of_income: Decimal,
        amount: Decimal,
    ) -> Self {
        Self {
            percent_of_income,
            amount,
        }
    }

    /// `min(claimed, income × percent, amount)`.
    pub fn apply(
        &self,
        claimed: Decimal,
        income: Decimal,
    ) -> Decimal {
        claimed
            .min(income * self.percent_of_income)
            .min(self.amount)
    }
}

/// Ceilings for every capped deduction line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionCaps {
    pub life_insurance: Decimal,
    pub health_insurance_self: Decimal,
    pub health_insurance_parent: Decimal,
    pub social_security: Decimal,
    pub solar_cell: Decimal,
    pub home_construction: Decimal,
    pub home_interest: Decimal,
    pub political_donation: Decimal,
    pub social_enterprise: Decimal,
    pub nssf: Decimal,

    pub rmf: FundCap,
    pub ssf: FundCap,
    pub pvd: FundCap,
    pub thai_esg: FundCap,
    /// Joint ceiling for RMF + SSF + PVD after their individual caps.
    pub retirement_combined: Decimal,

    /// Share of income after basic deductions available to donations.
    pub donation_percent: Decimal,
    pub education_donation_multiplier: Decimal,
}

/// Immutable tax law parameters for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    /// Gregorian tax year.
    pub tax_year: i32,
    /// Ascending, contiguous bracket schedule.
    pub brackets: Vec<TaxBracket>,
    pub expense_rates: ExpenseRates,
    pub allowances: Allowances,
    pub caps: DeductionCaps,
}

impl RateTable {
    /// Rate table for tax year 2025 (2568 BE).
    pub fn thai_2025() -> Self {
        Self {
            tax_year: SUPPORTED_TAX_YEAR,
            brackets: vec![
                TaxBracket::new(dec!(0), Some(dec!(150000)), dec!(0)),
                TaxBracket::new(dec!(150001), Some(dec!(300000)), dec!(0.05)),
                TaxBracket::new(dec!(300001), Some(dec!(500000)), dec!(0.10)),
                TaxBracket::new(dec!(500001), Some(dec!(750000)), dec!(0.15)),
                TaxBracket::new(dec!(750001), Some(dec!(1000000)), dec!(0.20)),
                TaxBracket::new(dec!(1000001), Some(dec!(2000000)), dec!(0.25)),
                TaxBracket::new(dec!(2000001), Some(dec!(5000000)), dec!(0.30)),
                TaxBracket::new(dec!(5000001), None, dec!(0.35)),
            ],
            expense_rates: ExpenseRates {
                salary_ceiling: dec!(100000),
                interest_dividends: dec!(0.10),
                rental: dec!(0.30),
                professional_fees: dec!(0.60),
                contracting: dec!(0.70),
                other: dec!(0.92),
            },
            allowances: Allowances {
                personal: dec!(60000),
                spouse: dec!(60000),
                child: dec!(30000),
                child_second: dec!(60000),
                parent: dec!(30000),
                easy_e_receipt: dec!(50000),
            },
            caps: DeductionCaps {
                life_insurance: dec!(100000),
                health_insurance_self: dec!(25000),
                health_insurance_parent: dec!(15000),
                social_security: dec!(9000),
                solar_cell: dec!(200000),
                home_construction: dec!(100000),
                home_interest: dec!(100000),
                political_donation: dec!(10000),
                social_enterprise: dec!(100000),
                nssf: dec!(30000),
                rmf: FundCap::new(dec!(0.30), dec!(500000)),
                ssf: FundCap::new(dec!(0.30), dec!(200000)),
                pvd: FundCap::new(dec!(0.15), dec!(500000)),
                thai_esg: FundCap::new(dec!(0.30), dec!(300000)),
                retirement_combined: dec!(500000),
                donation_percent: dec!(0.10),
                education_donation_multiplier: dec!(2),
            },
        }
    }

    /// Built-in rate table for `tax_year`, if that year is supported.
    pub fn for_year(tax_year: i32) -> Option<Self> {
        (tax_year == SUPPORTED_TAX_YEAR).then(Self::thai_2025)
    }

    /// Replaces the bracket schedule, keeping every other parameter.
    pub fn with_brackets(
        mut self,
        brackets: Vec<TaxBracket>,
    ) -> Self {
        self.brackets = brackets;
        self
    }

    /// The tax year in the Thai Buddhist Era calendar.
    pub fn buddhist_era_year(&self) -> i32 {
        self.tax_year + BUDDHIST_ERA_OFFSET
    }

    /// Checks that the schedule covers `[0, ∞)` without gaps or overlaps and
    /// that every rate and percentage is a fraction.
    ///
    /// # Errors
    ///
    /// Returns the first [`RateTableError`] found.
    pub fn validate(&self) -> Result<(), RateTableError> {
        let first = self.brackets.first().ok_or(RateTableError::NoBrackets)?;
        if first.min_income != Decimal::ZERO {
            return Err(RateTableError::FirstBracketNotAtZero(first.min_income));
        }

        let last_index = self.brackets.len() - 1;
        for (index, bracket) in self.brackets.iter().enumerate() {
            check_fraction("bracket rate", bracket.tax_rate)?;

            match bracket.max_income {
                None if index != last_index => {
                    return Err(RateTableError::UnboundedBeforeLast { index });
                }
                Some(max) if index == last_index => {
                    return Err(RateTableError::LastBracketBounded(max));
                }
                Some(max) if max < bracket.min_income => {
                    return Err(RateTableError::InvertedBracket {
                        index,
                        min: bracket.min_income,
                        max,
                    });
                }
                _ => {}
            }

            if let Some(next) = self.brackets.get(index + 1) {
                // Bounded here, otherwise the match above already returned.
                let expected = bracket.max_income.unwrap_or_default() + Decimal::ONE;
                if next.min_income != expected {
                    return Err(RateTableError::NotContiguous {
                        index: index + 1,
                        expected,
                        found: next.min_income,
                    });
                }
            }
        }

        let rates = &self.expense_rates;
        check_fraction("interest/dividend expense rate", rates.interest_dividends)?;
        check_fraction("rental expense rate", rates.rental)?;
        check_fraction("professional fee expense rate", rates.professional_fees)?;
        check_fraction("contracting expense rate", rates.contracting)?;
        check_fraction("other income expense rate", rates.other)?;

        let caps = &self.caps;
        check_fraction("RMF percentage", caps.rmf.percent_of_income)?;
        check_fraction("SSF percentage", caps.ssf.percent_of_income)?;
        check_fraction("PVD percentage", caps.pvd.percent_of_income)?;
        check_fraction("Thai ESG percentage", caps.thai_esg.percent_of_income)?;
        check_fraction("donation percentage", caps.donation_percent)?;

        Ok(())
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::thai_2025()
    }
}

fn check_fraction(
    name: &'static str,
    value: Decimal,
) -> Result<(), RateTableError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(RateTableError::InvalidPercentage { name, value });
    }
    Ok(())
}
