//! The module contains the errors the calculator core can report.
//!
//! None of them is ever thrown across the calculator contracts: transitions
//! hand them back as the reason of a rejected edit, and the state machine
//! keeps the last one as its error state.
//!
//! - [`DigitLimitExceeded`] and [`DecimalLimitExceeded`] reject an edit.
//! - [`DivisionByZero`] and [`ResultOutOfRange`] put the calculator in its
//!   error state.
//!
//!  [`DigitLimitExceeded`]: EngineError::DigitLimitExceeded
//!  [`DecimalLimitExceeded`]: EngineError::DecimalLimitExceeded
//!  [`DivisionByZero`]: EngineError::DivisionByZero
//!  [`ResultOutOfRange`]: EngineError::ResultOutOfRange
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EngineError {
    #[error("Invalid digit: {0:?}")]
    InvalidDigit(char),
    #[error("Too many digits: max {0}")]
    DigitLimitExceeded(usize),
    #[error("Too many decimals: max {0}")]
    DecimalLimitExceeded(usize),
    #[error("Division by zero!")]
    DivisionByZero,
    #[error("Result out of range: {0}")]
    ResultOutOfRange(String),
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}
