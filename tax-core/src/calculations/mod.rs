//! The calculation pipeline: income resolution, deduction aggregation,
//! progressive tax and the composer that ties them together.

pub mod common;
pub mod composer;
pub mod deductions;
pub mod income;
pub mod progressive;

pub use composer::{TaxCalculator, compute};
pub use deductions::{AggregatedDeductions, DeductionAggregator};
pub use income::{IncomeResolver, ResolvedIncome};
pub use progressive::{ProgressiveTax, ProgressiveTaxResult};
