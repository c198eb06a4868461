//! End-to-end tax computation for one taxpayer.
//!
//! | Step | Figure |
//! |------|--------|
//! | 1    | Income after statutory expenses |
//! | 2    | Deductions, capped ([`DeductionAggregator`]) |
//! | 3    | Net income = max(0, step 1 − step 2) |
//! | 4    | Bracket breakdown of step 3 |
//! | 5    | Taxable income = max(0, step 3 − general and education donations) |
//! | 6    | Tax on step 5 |
//! | 7    | Refund or additional payment against withholding |
//!
//! Donations are part of step 2 and are taken off again in step 5, so the
//! breakdown in step 4 does not add up to the tax in step 6 when donations
//! are claimed.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::compute;
//! use tax_core::{DeductionInput, IncomeInput, RateTable};
//!
//! let table = RateTable::thai_2025();
//! let income = IncomeInput {
//!     salary: dec!(600000),
//!     ..Default::default()
//! };
//! let deductions = DeductionInput {
//!     personal: dec!(60000),
//!     ..Default::default()
//! };
//!
//! let result = compute(&table, &income, &deductions, dec!(30000));
//!
//! assert_eq!(result.net_income, dec!(440000));
//! assert_eq!(result.tax, dec!(21500));
//! assert_eq!(result.tax_refund, dec!(8500));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{clamp_zero, percent_of};
use crate::calculations::deductions::DeductionAggregator;
use crate::calculations::income::IncomeResolver;
use crate::calculations::progressive::ProgressiveTax;
use crate::models::{CalculationResult, DeductionInput, DeductionLine, IncomeInput, RateTable};

/// Runs the whole pipeline against one [`RateTable`].
#[derive(Debug, Clone)]
pub struct TaxCalculator<'a> {
    rate_table: &'a RateTable,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(rate_table: &'a RateTable) -> Self {
        Self { rate_table }
    }

    /// Computes the full breakdown. Never fails; inputs are expected to have
    /// passed their `validate` methods.
    pub fn compute(
        &self,
        income: &IncomeInput,
        deductions: &DeductionInput,
        withholding_tax: Decimal,
    ) -> CalculationResult {
        let resolved = IncomeResolver::new(&self.rate_table.expense_rates).resolve(income);
        debug!(
            total_income = %resolved.total_income,
            total_expenses = %resolved.total_expenses,
            income_after_expenses = %resolved.income_after_expenses,
            "income resolved"
        );

        let aggregated = DeductionAggregator::new(self.rate_table)
            .aggregate(resolved.income_after_expenses, deductions);
        let net_income_before_donation =
            clamp_zero(resolved.income_after_expenses - aggregated.total_deductions);

        let progressive = ProgressiveTax::new(&self.rate_table.brackets);
        let breakdown = progressive.calculate(net_income_before_donation);

        let donation = aggregated.line(DeductionLine::Donation);
        let education_donation = aggregated.line(DeductionLine::EducationDonation);
        let total_donation = donation + education_donation;
        let net_income = clamp_zero(net_income_before_donation - total_donation);

        let tax = progressive.calculate(net_income).tax;
        debug!(
            %net_income_before_donation,
            %total_donation,
            %net_income,
            %tax,
            "tax computed"
        );

        let tax_refund = clamp_zero(withholding_tax - tax);
        let tax_additional = clamp_zero(tax - withholding_tax);

        CalculationResult {
            total_income: resolved.total_income,
            total_expenses: resolved.total_expenses,
            income_after_expenses: resolved.income_after_expenses,
            income_details: resolved.details,
            total_deductions: aggregated.total_deductions,
            deduction_details: aggregated.details,
            donation,
            education_donation,
            total_donation,
            net_income_before_donation,
            net_income,
            tax,
            tax_details: breakdown.details,
            withholding_tax,
            tax_refund,
            tax_additional,
            tax_percent_of_income: percent_of(tax, resolved.total_income),
            tax_percent_of_net: percent_of(tax, net_income),
            net_income_after_tax: net_income - tax,
        }
    }
}

/// Shorthand for `TaxCalculator::new(rate_table).compute(...)`.
pub fn compute(
    rate_table: &RateTable,
    income: &IncomeInput,
    deductions: &DeductionInput,
    withholding_tax: Decimal,
) -> CalculationResult {
    TaxCalculator::new(rate_table).compute(income, deductions, withholding_tax)
}
