mod calculation_history;
mod calculation_result;
mod deduction;
mod income;
mod rate_table;
mod tax_profile;
mod validation;

pub use calculation_history::{CalculationRecord, HistoryStatistics, NewCalculationRecord};
pub use calculation_result::{BracketDetail, CalculationResult};
pub use deduction::{DeductionDetails, DeductionInput, DeductionLine};
pub use income::{IncomeCategory, IncomeDetail, IncomeInput, SalaryComponents};
pub use rate_table::{
    Allowances, DeductionCaps, ExpenseRates, FundCap, RateTable, RateTableError,
    SUPPORTED_TAX_YEAR, TaxBracket,
};
pub use tax_profile::{NewTaxProfile, ProfileSummary, TaxProfile};
pub use validation::InputError;
