//! TOML input files for `thai-tax calculate`.
//!
//! ```toml
//! name = "Somchai"
//! withholding_tax = 30000
//!
//! [salary]
//! monthly_salary = 50000
//! months = 12
//! bonus = 100000
//!
//! [income]
//! interest_dividends = 12000
//!
//! [deductions]
//! personal = 60000
//! social_security = 9000
//! ```
//!
//! Every section is optional. A `[salary]` section replaces `income.salary`
//! with `monthly_salary × months + bonus`. Unknown keys are rejected in every
//! section.
//!
//! Claims are taken as written, including the personal allowance: leaving
//! out `deductions.personal` claims zero, not the statutory 60,000. The
//! calculation logs a warning when income is present and the allowance is
//! missing.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::{
    Allowances, DeductionInput, IncomeCategory, IncomeInput, InputError, NewTaxProfile,
    SalaryComponents, TaxProfile,
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum InputFileError {
    #[error("failed to read '{path}': {message}")]
    Io { path: String, message: String },

    #[error("invalid input file: {0}")]
    Parse(String),

    #[error("invalid input: {0}")]
    Invalid(#[from] InputError),
}

impl From<toml::de::Error> for InputFileError {
    fn from(err: toml::de::Error) -> Self {
        InputFileError::Parse(err.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub withholding_tax: Decimal,
    pub income: IncomeInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryComponents>,
    pub deductions: DeductionInput,
}

impl InputFile {
    /// Parses and validates TOML text, folding `[salary]` into the income.
    ///
    /// # Errors
    ///
    /// [`InputFileError::Parse`] for malformed TOML or unknown keys,
    /// [`InputFileError::Invalid`] for values the calculation cannot accept.
    pub fn from_toml_str(text: &str) -> Result<Self, InputFileError> {
        let mut input: InputFile = toml::from_str(text)?;

        if let Some(components) = &input.salary {
            components.validate()?;
            if !input.income.salary.is_zero() {
                warn!(
                    salary = %input.income.salary,
                    "[salary] section replaces income.salary"
                );
            }
            input.income.salary = components.total();
        }

        input.validate()?;
        debug!(name = ?input.name, salary = %input.income.salary, "parsed input file");
        Ok(input)
    }

    /// Reads `path` and hands its contents to [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: &Path) -> Result<Self, InputFileError> {
        let text = fs::read_to_string(path).map_err(|e| InputFileError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// The first [`InputError`] found in the withholding, income or deductions.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.withholding_tax < Decimal::ZERO {
            return Err(InputError::NegativeAmount {
                field: "withholding_tax",
                value: self.withholding_tax,
            });
        }
        self.income.validate()?;
        self.deductions.validate()
    }

    /// The statutory personal allowance when income is reported but no
    /// allowance is claimed.
    pub fn unclaimed_personal_allowance(
        &self,
        allowances: &Allowances,
    ) -> Option<Decimal> {
        let has_income = IncomeCategory::ALL
            .into_iter()
            .any(|category| !self.income.amount(category).is_zero());
        (has_income && self.deductions.personal.is_zero()).then_some(allowances.personal)
    }

    /// The name in the file, else `fallback`.
    pub fn name_or<'a>(
        &'a self,
        fallback: &'a str,
    ) -> &'a str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(fallback)
    }

    pub fn to_profile(
        &self,
        name: &str,
    ) -> NewTaxProfile {
        NewTaxProfile {
            name: name.to_string(),
            income: self.income.clone(),
            deductions: self.deductions.clone(),
            withholding_tax: self.withholding_tax,
        }
    }

    /// Renders as TOML that [`from_toml_str`](Self::from_toml_str) reads back.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl From<TaxProfile> for InputFile {
    fn from(profile: TaxProfile) -> Self {
        Self {
            name: Some(profile.name),
            withholding_tax: profile.withholding_tax,
            income: profile.income,
            salary: None,
            deductions: profile.deductions,
        }
    }
}

/// Input file stem, used when the file does not name the calculation.
pub fn default_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "calculation".to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::RateTable;

    use super::*;

    #[test]
    fn empty_file_is_all_zero() {
        let input = InputFile::from_toml_str("").expect("empty input is valid");

        assert_eq!(input, InputFile::default());
    }

    #[test]
    fn reads_every_section() {
        let input = InputFile::from_toml_str(
            r#"
            name = "Somchai"
            withholding_tax = 30000

            [income]
            salary = 600000
            interest_dividends = "1200.50"

            [deductions]
            personal = 60000
            spouse = true
            children = 2
            children_2nd = 1
            "#,
        )
        .expect("valid input");

        assert_eq!(input.name.as_deref(), Some("Somchai"));
        assert_eq!(input.withholding_tax, dec!(30000));
        assert_eq!(input.income.salary, dec!(600000));
        assert_eq!(input.income.interest_dividends, dec!(1200.50));
        assert_eq!(input.deductions.personal, dec!(60000));
        assert!(input.deductions.spouse);
        assert_eq!(input.deductions.children_2nd, 1);
    }

    #[test]
    fn legacy_income_keys_are_accepted() {
        let input = InputFile::from_toml_str(
            r#"
            [income]
            income_40_1_2 = 480000
            income_40_8 = 20000
            "#,
        )
        .expect("valid input");

        assert_eq!(input.income.salary, dec!(480000));
        assert_eq!(input.income.other, dec!(20000));
    }

    #[test]
    fn salary_components_set_salary() {
        let input = InputFile::from_toml_str(
            r#"
            [income]
            salary = 1

            [salary]
            monthly_salary = 50000
            bonus = 100000
            "#,
        )
        .expect("valid input");

        assert_eq!(input.income.salary, dec!(700000));
        assert_eq!(input.salary.map(|s| s.months), Some(12));
    }

    #[test]
    fn partial_year_salary() {
        let input = InputFile::from_toml_str(
            r#"
            [salary]
            monthly_salary = 40000
            months = 7
            "#,
        )
        .expect("valid input");

        assert_eq!(input.income.salary, dec!(280000));
    }

    #[test]
    fn thirteen_months_is_rejected() {
        let err = InputFile::from_toml_str("[salary]\nmonthly_salary = 1000\nmonths = 13\n")
            .expect_err("13 months");

        assert!(matches!(
            err,
            InputFileError::Invalid(InputError::SalaryMonthsOutOfRange(13))
        ));
    }

    #[test]
    fn negative_withholding_is_rejected() {
        let err = InputFile::from_toml_str("withholding_tax = -1\n").expect_err("negative");

        assert!(matches!(
            err,
            InputFileError::Invalid(InputError::NegativeAmount {
                field: "withholding_tax",
                ..
            })
        ));
    }

    #[test]
    fn negative_deduction_is_rejected() {
        let err = InputFile::from_toml_str("[deductions]\nrmf = -5000\n").expect_err("negative");

        assert!(matches!(
            err,
            InputFileError::Invalid(InputError::NegativeAmount { field: "rmf", .. })
        ));
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let err = InputFile::from_toml_str("withholding = 100\n").expect_err("typo");

        assert!(matches!(err, InputFileError::Parse(_)));
    }

    #[test]
    fn misspelled_deduction_is_rejected() {
        let err = InputFile::from_toml_str("[income]\nsalary = 600000\n[deductions]\npersnal = 60000\n")
            .expect_err("typo in [deductions]");

        let InputFileError::Parse(message) = err else {
            panic!("expected a parse error");
        };
        assert!(message.contains("persnal"), "got: {message}");
    }

    #[test]
    fn misspelled_income_is_rejected() {
        let err = InputFile::from_toml_str("[income]\nrentl = 120000\n").expect_err("typo in [income]");

        assert!(matches!(err, InputFileError::Parse(_)));
    }

    #[test]
    fn unclaimed_personal_allowance_is_reported() {
        let allowances = RateTable::thai_2025().allowances;
        let salaried = InputFile::from_toml_str("[income]\nsalary = 600000\n").expect("valid input");
        let claimed =
            InputFile::from_toml_str("[income]\nsalary = 600000\n[deductions]\npersonal = 60000\n")
                .expect("valid input");

        assert_eq!(salaried.unclaimed_personal_allowance(&allowances), Some(dec!(60000)));
        assert_eq!(claimed.unclaimed_personal_allowance(&allowances), None);
        assert_eq!(InputFile::default().unclaimed_personal_allowance(&allowances), None);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = InputFile::load(Path::new("no/such/input.toml")).expect_err("missing");

        assert!(matches!(err, InputFileError::Io { .. }));
    }

    #[test]
    fn name_falls_back_when_blank() {
        let named = InputFile {
            name: Some("  Malee ".to_string()),
            ..Default::default()
        };
        let blank = InputFile {
            name: Some("   ".to_string()),
            ..Default::default()
        };

        assert_eq!(named.name_or("input"), "Malee");
        assert_eq!(blank.name_or("input"), "input");
        assert_eq!(InputFile::default().name_or("input"), "input");
    }

    #[test]
    fn default_name_is_file_stem() {
        assert_eq!(default_name(Path::new("inputs/somchai-2568.toml")), "somchai-2568");
    }

    #[test]
    fn rendered_toml_reads_back() {
        let input = InputFile {
            name: Some("Somchai".to_string()),
            withholding_tax: dec!(12000.25),
            income: IncomeInput {
                salary: dec!(600000),
                salary_expense: Some(dec!(80000)),
                ..Default::default()
            },
            salary: None,
            deductions: DeductionInput {
                personal: dec!(60000),
                parents: 2,
                easy_e_receipt: true,
                ..Default::default()
            },
        };

        let text = input.to_toml().expect("serializable");
        let parsed = InputFile::from_toml_str(&text).expect("reads back");

        assert_eq!(parsed, input);
    }
}
