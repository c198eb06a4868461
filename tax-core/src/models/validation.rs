use rust_decimal::Decimal;
use thiserror::Error;

/// Rejected caller input, reported by the `validate` methods on the input
/// models. The calculation pipeline itself never validates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("second-child count {children_2nd} exceeds total children {children}")]
    SecondChildrenExceedChildren { children: u32, children_2nd: u32 },

    #[error("salary months must be between 0 and 12, got {0}")]
    SalaryMonthsOutOfRange(u32),
}

pub(crate) fn non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<(), InputError> {
    if value < Decimal::ZERO {
        return Err(InputError::NegativeAmount { field, value });
    }
    Ok(())
}
