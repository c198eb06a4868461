//! Statutory expense deduction per Section 40 income category.
//!
//! | Category  | Expense                                   |
//! |-----------|-------------------------------------------|
//! | 40(1)(2)  | flat ceiling; a supplied amount may lower it |
//! | 40(4)     | 10% of income                             |
//! | 40(5)     | 30% of income                             |
//! | 40(6)     | 60% of income                             |
//! | 40(7)     | 70% of income                             |
//! | 40(8)     | 92% of income                             |

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::clamp_zero;
use crate::models::{ExpenseRates, IncomeCategory, IncomeDetail, IncomeInput};

/// Gross income reduced by statutory expenses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIncome {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// `max(0, total_income − total_expenses)`.
    pub income_after_expenses: Decimal,
    /// Only categories with nonzero income appear.
    pub details: BTreeMap<IncomeCategory, IncomeDetail>,
}

#[derive(Debug, Clone)]
pub struct IncomeResolver<'a> {
    rates: &'a ExpenseRates,
}

impl<'a> IncomeResolver<'a> {
    pub fn new(rates: &'a ExpenseRates) -> Self {
        Self { rates }
    }

    pub fn resolve(
        &self,
        input: &IncomeInput,
    ) -> ResolvedIncome {
        let mut details = BTreeMap::new();
        let mut total_income = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;

        for category in IncomeCategory::ALL {
            let income = input.amount(category);
            if income.is_zero() {
                continue;
            }

            let expense = self.expense(category, income, input.salary_expense);
            debug!(category = category.as_str(), %income, %expense, "income category resolved");
            total_income += income;
            total_expenses += expense;
            details.insert(
                category,
                IncomeDetail {
                    income,
                    expense,
                    net: clamp_zero(income - expense),
                },
            );
        }

        ResolvedIncome {
            total_income,
            total_expenses,
            income_after_expenses: clamp_zero(total_income - total_expenses),
            details,
        }
    }

    /// Statutory expense for one category.
    ///
    /// The salary expense is the flat ceiling regardless of the salary amount;
    /// a caller-supplied expense replaces it only when lower.
    pub fn expense(
        &self,
        category: IncomeCategory,
        income: Decimal,
        salary_override: Option<Decimal>,
    ) -> Decimal {
        match category {
            IncomeCategory::Salary => {
                let ceiling = self.rates.salary_ceiling;
                salary_override.unwrap_or(ceiling).min(ceiling)
            }
            IncomeCategory::InterestDividends => income * self.rates.interest_dividends,
            IncomeCategory::Rental => income * self.rates.rental,
            IncomeCategory::ProfessionalFees => income * self.rates.professional_fees,
            IncomeCategory::Contracting => income * self.rates.contracting,
            IncomeCategory::Other => income * self.rates.other,
        }
    }
}
