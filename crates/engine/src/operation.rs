use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Binary operation of the calculator keypad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Plus,
    Minus,
    Multiply,
    Divide,
    /// `left % right` is "right percent of left".
    Percent,
}

impl Operation {
    /// Keypad symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Operation::Plus => '+',
            Operation::Minus => '-',
            Operation::Multiply => '×',
            Operation::Divide => '÷',
            Operation::Percent => '%',
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Operation {
    type Error = EngineError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '+' => Ok(Operation::Plus),
            '-' | '−' => Ok(Operation::Minus),
            '×' | '*' | 'x' | 'X' => Ok(Operation::Multiply),
            '÷' | '/' => Ok(Operation::Divide),
            '%' => Ok(Operation::Percent),
            other => Err(EngineError::InvalidOption(format!(
                "unsupported operator: {other}"
            ))),
        }
    }
}

impl FromStr for Operation {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Operation::try_from(c),
            _ => Err(EngineError::InvalidOption(format!(
                "unsupported operator: {s}"
            ))),
        }
    }
}

/// Evaluates `left <operation> right`.
///
/// Without a pending operation the right operand passes through unchanged.
/// Division by zero yields `NaN`; the caller decides how to surface it.
///
/// ```rust
/// use engine::{Operation, calculate_operation};
///
/// assert_eq!(calculate_operation(Some(Operation::Plus), 2.0, 3.0), 5.0);
/// assert_eq!(calculate_operation(Some(Operation::Percent), 100.0, 20.0), 20.0);
/// assert!(calculate_operation(Some(Operation::Divide), 10.0, 0.0).is_nan());
/// ```
#[must_use]
pub fn calculate_operation(operation: Option<Operation>, left: f64, right: f64) -> f64 {
    match operation {
        Some(Operation::Plus) => left + right,
        Some(Operation::Minus) => left - right,
        Some(Operation::Multiply) => left * right,
        Some(Operation::Divide) if right == 0.0 => f64::NAN,
        Some(Operation::Divide) => left / right,
        Some(Operation::Percent) => (left * right) / 100.0,
        None => right,
    }
}

/// Rounds half away from zero to `decimals` fractional digits.
#[must_use]
pub fn round_to_decimals(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() { rounded } else { value }
}
