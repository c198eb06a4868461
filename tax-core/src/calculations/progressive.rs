//! Progressive bracket tax.
//!
//! Lower bounds are inclusive integers (`150,001`), so the amount taxed in a
//! bracket is `min(net, max) − (min − 1)`. The zero-rate band and bands with
//! nothing taxable are left out of the breakdown.

use rust_decimal::Decimal;

use crate::models::{BracketDetail, TaxBracket};

/// Total tax and per-bracket breakdown for one net income figure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressiveTaxResult {
    pub tax: Decimal,
    pub details: Vec<BracketDetail>,
}

#[derive(Debug, Clone)]
pub struct ProgressiveTax<'a> {
    brackets: &'a [TaxBracket],
}

impl<'a> ProgressiveTax<'a> {
    /// `brackets` must be ascending and contiguous, see
    /// [`crate::models::RateTable::validate`].
    pub fn new(brackets: &'a [TaxBracket]) -> Self {
        Self { brackets }
    }

    pub fn calculate(
        &self,
        net_income: Decimal,
    ) -> ProgressiveTaxResult {
        let mut result = ProgressiveTaxResult::default();
        if net_income <= Decimal::ZERO {
            return result;
        }

        for bracket in self.brackets {
            if bracket.min_income >= net_income {
                break;
            }

            let upper = bracket
                .max_income
                .map_or(net_income, |max| net_income.min(max));
            let taxable = upper - (bracket.min_income - Decimal::ONE);

            if taxable > Decimal::ZERO && !bracket.tax_rate.is_zero() {
                let tax = taxable * bracket.tax_rate;
                result.tax += tax;
                result.details.push(BracketDetail {
                    range: bracket.label(),
                    taxable_amount: taxable,
                    rate: bracket.tax_rate * Decimal::ONE_HUNDRED,
                    tax,
                });
            }

            if bracket.contains_upper(net_income) {
                break;
            }
        }

        result
    }
}
