//! Calculator core behind the amount-entry sheets of the app.
//!
//! Four pieces, leaf to root:
//!
//! - [`normalize`]: canonical form and digit/decimal limits of the typed
//!   display.
//! - [`operation`]: the binary operations of the keypad.
//! - [`format`]: locale and currency aware rendering, memoized.
//! - [`state`] and [`Calculator`]: the input state machine.
//!
//! Nothing here performs I/O or panics on user input; invalid edits are
//! rejected and reported through [`Outcome`].

pub use calculator::Calculator;
pub use currency::{Currency, CurrencyDisplayMode, CurrencyLookup, CurrencyRegistry};
pub use error::EngineError;
pub use format::{
    DisplayFormatter, DisplayFormatterBuilder, FormatOptions, FormatterCache, SignDisplay,
};
pub use normalize::{
    DEFAULT_DISPLAY, MAX_DECIMALS, MAX_DIGITS, display_from_value, is_valid_display,
    normalize_display, parse_display, validate_display,
};
pub use operation::{Operation, calculate_operation, round_to_decimals};
pub use state::{CalculatorState, Event, Outcome, Phase, Transition};

mod calculator;
mod currency;
mod error;
pub mod format;
pub mod normalize;
pub mod operation;
pub mod state;

pub type ResultEngine<T> = Result<T, EngineError>;
