//! Canonical form and limits of the digits typed into the calculator.
//!
//! A display string follows the grammar `-?\d*(\.\d*)?`. The normalizer
//! strips leading zeros from the integer part while leaving anything the
//! user typed after the decimal point untouched, so `"12."` and `"12.50"`
//! survive as typed.

use crate::{EngineError, ResultEngine};

/// Maximum number of digits (sign and `.` excluded).
pub const MAX_DIGITS: usize = 14;
/// Maximum number of fractional digits.
pub const MAX_DECIMALS: usize = 2;
/// Display shown when nothing has been typed.
pub const DEFAULT_DISPLAY: &str = "0";

/// Returns the canonical form of `display`.
///
/// ```rust
/// use engine::normalize_display;
///
/// assert_eq!(normalize_display("000123"), "123");
/// assert_eq!(normalize_display("000.45"), "0.45");
/// assert_eq!(normalize_display("008."), "8.");
/// ```
#[must_use]
pub fn normalize_display(display: &str) -> String {
    let (negative, unsigned) = match display.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, display),
    };

    let normalized = match unsigned.split_once('.') {
        Some((integer, decimals)) => {
            format!("{}.{decimals}", strip_leading_zeros(integer))
        }
        None => strip_leading_zeros(unsigned).to_string(),
    };

    if negative && normalized != DEFAULT_DISPLAY {
        format!("-{normalized}")
    } else {
        normalized
    }
}

fn strip_leading_zeros(digits: &str) -> &str {
    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        DEFAULT_DISPLAY
    } else {
        stripped
    }
}

/// Checks `display` against [`MAX_DECIMALS`] and [`MAX_DIGITS`].
pub fn validate_display(display: &str) -> ResultEngine<()> {
    if let Some((_, decimals)) = display.split_once('.')
        && decimals.len() > MAX_DECIMALS
    {
        return Err(EngineError::DecimalLimitExceeded(MAX_DECIMALS));
    }

    let digits = display.chars().filter(char::is_ascii_digit).count();
    if digits > MAX_DIGITS {
        return Err(EngineError::DigitLimitExceeded(MAX_DIGITS));
    }

    Ok(())
}

/// `true` when `display` may be committed.
#[must_use]
pub fn is_valid_display(display: &str) -> bool {
    validate_display(display).is_ok()
}

/// Numeric value of a display string, `0` for anything unparseable.
///
/// Trailing-dot states (`"5."`) parse to their integer part.
#[must_use]
pub fn parse_display(display: &str) -> f64 {
    let trimmed = display.strip_suffix('.').unwrap_or(display);
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value != 0.0 => value,
        _ => 0.0,
    }
}

/// Renders a computed value as a display string.
///
/// Never uses exponent notation and never yields `-0`.
#[must_use]
pub fn display_from_value(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return DEFAULT_DISPLAY.to_string();
    }
    value.to_string()
}
