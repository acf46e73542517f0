//! Calculator state and its transitions.
//!
//! [`CalculatorState::apply`] is a pure function from the current state and
//! an [`Event`] to the next state. Invalid edits never fail: they hand back
//! the prior state together with the reason they were rejected.

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, Operation, ResultEngine, calculate_operation,
    normalize::{
        DEFAULT_DISPLAY, MAX_DECIMALS, display_from_value, normalize_display, parse_display,
        validate_display,
    },
    operation::round_to_decimals,
};

/// Input accepted by the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum Event {
    Digit(char),
    Decimal,
    Operator(Operation),
    Equals,
    Clear,
    Backspace,
    ToggleSign,
    Reset(f64),
}

/// What a transition did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Accepted, but nothing changed (e.g. a second `.`).
    Unchanged,
    Rejected(EngineError),
}

impl Outcome {
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

/// Result of [`CalculatorState::apply`].
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: CalculatorState,
    pub outcome: Outcome,
}

/// Phase of the state machine, derived from the fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PendingOperator,
    Editing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculatorState {
    pub display: String,
    pub input_value: f64,
    pub previous_value: Option<f64>,
    pub operation: Option<Operation>,
    pub waiting_for_operand: bool,
    pub show_calculator_actions: bool,
    /// Set when the last evaluation could not produce a finite, displayable
    /// result. Cleared by the next event.
    pub error: Option<EngineError>,
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self {
            display: DEFAULT_DISPLAY.to_string(),
            input_value: 0.0,
            previous_value: None,
            operation: None,
            waiting_for_operand: false,
            show_calculator_actions: false,
            error: None,
        }
    }
}

impl CalculatorState {
    /// Fresh state seeded with `initial_value`.
    ///
    /// A non-zero seed waits for an operand, so the first digit replaces it.
    /// A seed that does not fit the display limits opens on `0`.
    #[must_use]
    pub fn with_initial(initial_value: f64) -> Self {
        Self::seeded(initial_value).unwrap_or_default()
    }

    /// Like [`CalculatorState::with_initial`], but reports a seed whose
    /// rounded display exceeds the digit or decimal limits.
    pub fn seeded(initial_value: f64) -> ResultEngine<Self> {
        let value = if initial_value.is_finite() {
            round_to_decimals(initial_value, MAX_DECIMALS)
        } else {
            0.0
        };
        let display = display_from_value(value);
        validate_display(&display)?;
        Ok(Self {
            input_value: parse_display(&display),
            display,
            waiting_for_operand: value != 0.0,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.operation.is_some() && self.waiting_for_operand {
            Phase::PendingOperator
        } else if self.operation.is_none() && self.display == DEFAULT_DISPLAY {
            Phase::Idle
        } else {
            Phase::Editing
        }
    }

    #[must_use]
    pub fn has_active_operation(&self) -> bool {
        self.operation.is_some() && self.previous_value.is_some()
    }

    /// Applies `event` and returns the next state.
    #[must_use]
    pub fn apply(&self, event: Event) -> Transition {
        let mut next = self.clone();
        next.error = None;

        let outcome = match event {
            Event::Digit(digit) => next.input_number(digit),
            Event::Decimal => next.input_decimal(),
            Event::Operator(operation) => next.perform_operation(operation),
            Event::Equals => next.calculate_result(),
            Event::Clear => next.clear(),
            Event::Backspace => next.backspace(),
            Event::ToggleSign => next.toggle_sign(),
            Event::Reset(initial_value) => match CalculatorState::seeded(initial_value) {
                Ok(seeded) => {
                    next = seeded;
                    Outcome::Applied
                }
                Err(err) => Outcome::Rejected(err),
            },
        };

        match outcome {
            Outcome::Rejected(_) => Transition {
                state: self.clone(),
                outcome,
            },
            Outcome::Unchanged if self.error.is_none() => Transition {
                state: self.clone(),
                outcome,
            },
            _ => Transition {
                state: next,
                outcome,
            },
        }
    }

    /// Commits `display` if it passes validation.
    fn commit_display(&mut self, display: String) -> Outcome {
        if let Err(err) = validate_display(&display) {
            return Outcome::Rejected(err);
        }
        self.input_value = parse_display(&display);
        self.display = display;
        Outcome::Applied
    }

    fn input_number(&mut self, digit: char) -> Outcome {
        if !digit.is_ascii_digit() {
            return Outcome::Rejected(EngineError::InvalidDigit(digit));
        }

        if self.waiting_for_operand {
            self.waiting_for_operand = false;
            return self.commit_display(digit.to_string());
        }

        let display = normalize_display(&format!("{}{digit}", self.display));
        if display == self.display {
            return Outcome::Unchanged;
        }
        self.commit_display(display)
    }

    fn input_decimal(&mut self) -> Outcome {
        if self.waiting_for_operand {
            self.waiting_for_operand = false;
            return self.commit_display("0.".to_string());
        }
        if self.display.contains('.') {
            return Outcome::Unchanged;
        }
        let display = format!("{}.", self.display);
        self.commit_display(display)
    }

    fn clear(&mut self) -> Outcome {
        if self.has_active_operation() {
            self.display = DEFAULT_DISPLAY.to_string();
            self.input_value = 0.0;
            self.waiting_for_operand = true;
        } else {
            self.display = DEFAULT_DISPLAY.to_string();
            self.input_value = 0.0;
            self.previous_value = None;
            self.operation = None;
            self.waiting_for_operand = false;
        }
        Outcome::Applied
    }

    fn backspace(&mut self) -> Outcome {
        let mut chars = self.display.chars();
        chars.next_back();
        let remaining = chars.as_str();

        let display = if self.display.chars().count() > 1 {
            normalize_display(remaining)
        } else {
            DEFAULT_DISPLAY.to_string()
        };
        if display == self.display && !self.waiting_for_operand {
            return Outcome::Unchanged;
        }

        self.waiting_for_operand = false;
        self.commit_display(display)
    }

    fn toggle_sign(&mut self) -> Outcome {
        if self.waiting_for_operand {
            return Outcome::Unchanged;
        }
        let display = match self.display.strip_prefix('-') {
            Some(unsigned) => unsigned.to_string(),
            None if self.display == DEFAULT_DISPLAY => return Outcome::Unchanged,
            None => format!("-{}", self.display),
        };
        self.commit_display(display)
    }

    fn perform_operation(&mut self, next: Operation) -> Outcome {
        self.show_calculator_actions = true;

        match (self.previous_value, self.operation) {
            (Some(previous), Some(pending)) => {
                let result = calculate_operation(Some(pending), previous, self.input_value);
                match settle(result) {
                    Ok(value) => self.previous_value = Some(value),
                    Err(err) => return self.enter_error(err),
                }
            }
            _ => self.previous_value = Some(self.input_value),
        }

        self.operation = Some(next);
        self.display = DEFAULT_DISPLAY.to_string();
        self.input_value = 0.0;
        self.waiting_for_operand = true;
        Outcome::Applied
    }

    fn calculate_result(&mut self) -> Outcome {
        let (Some(previous), Some(pending)) = (self.previous_value, self.operation) else {
            return Outcome::Unchanged;
        };

        let result = calculate_operation(Some(pending), previous, self.input_value);
        let value = match settle(result) {
            Ok(value) => value,
            Err(err) => return self.enter_error(err),
        };

        self.display = display_from_value(value);
        self.input_value = value;
        self.previous_value = None;
        self.operation = None;
        self.waiting_for_operand = false;
        Outcome::Applied
    }

    /// Drops the pending computation and shows `0` with `err` recorded.
    fn enter_error(&mut self, err: EngineError) -> Outcome {
        tracing::warn!("calculator entered error state: {err}");
        self.display = DEFAULT_DISPLAY.to_string();
        self.input_value = 0.0;
        self.previous_value = None;
        self.operation = None;
        self.waiting_for_operand = true;
        self.error = Some(err);
        Outcome::Applied
    }
}

/// Rounds an evaluation result and checks it can be displayed.
fn settle(result: f64) -> Result<f64, EngineError> {
    if result.is_nan() {
        return Err(EngineError::DivisionByZero);
    }
    if !result.is_finite() {
        return Err(EngineError::ResultOutOfRange(result.to_string()));
    }
    let value = round_to_decimals(result, MAX_DECIMALS);
    let display = display_from_value(value);
    validate_display(&display).map_err(|_| EngineError::ResultOutOfRange(display))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::MAX_DIGITS;

    fn run(events: &[Event]) -> CalculatorState {
        events
            .iter()
            .fold(CalculatorState::default(), |state, event| {
                state.apply(*event).state
            })
    }

    fn digits(s: &str) -> Vec<Event> {
        s.chars()
            .map(|c| if c == '.' { Event::Decimal } else { Event::Digit(c) })
            .collect()
    }

    #[test]
    fn digits_append_and_normalize() {
        let state = run(&digits("0012"));
        assert_eq!(state.display, "12");
        assert_eq!(state.input_value, 12.0);
        assert_eq!(state.phase(), Phase::Editing);
    }

    #[test]
    fn second_decimal_point_is_ignored() {
        let state = run(&digits("1.5"));
        let transition = state.apply(Event::Decimal);
        assert_eq!(transition.outcome, Outcome::Unchanged);
        assert_eq!(transition.state.display, "1.5");
    }

    #[test]
    fn leading_zero_digit_is_unchanged() {
        let transition = CalculatorState::default().apply(Event::Digit('0'));
        assert_eq!(transition.outcome, Outcome::Unchanged);
        assert_eq!(transition.state.display, "0");
    }

    #[test]
    fn third_decimal_is_rejected() {
        let state = run(&digits("1.23"));
        let transition = state.apply(Event::Digit('4'));
        assert_eq!(
            transition.outcome,
            Outcome::Rejected(EngineError::DecimalLimitExceeded(2))
        );
        assert_eq!(transition.state, state);
    }

    #[test]
    fn fifteenth_digit_is_rejected() {
        let state = run(&digits("12345678901234"));
        let transition = state.apply(Event::Digit('5'));
        assert!(transition.outcome.is_rejected());
        assert_eq!(transition.state.display, "12345678901234");
    }

    #[test]
    fn non_digit_is_rejected() {
        let transition = CalculatorState::default().apply(Event::Digit('a'));
        assert_eq!(
            transition.outcome,
            Outcome::Rejected(EngineError::InvalidDigit('a'))
        );
    }

    #[test]
    fn decimal_after_operator_starts_fraction() {
        let mut events = digits("7");
        events.push(Event::Operator(Operation::Plus));
        events.push(Event::Decimal);
        let state = run(&events);
        assert_eq!(state.display, "0.");
        assert!(!state.waiting_for_operand);
    }

    #[test]
    fn operator_captures_left_operand() {
        let mut events = digits("12");
        events.push(Event::Operator(Operation::Multiply));
        let state = run(&events);
        assert_eq!(state.previous_value, Some(12.0));
        assert_eq!(state.operation, Some(Operation::Multiply));
        assert_eq!(state.display, "0");
        assert!(state.waiting_for_operand);
        assert!(state.show_calculator_actions);
        assert_eq!(state.phase(), Phase::PendingOperator);
    }

    #[test]
    fn consecutive_operators_fold_against_zero_operand() {
        let mut events = digits("6");
        events.push(Event::Operator(Operation::Multiply));
        events.push(Event::Operator(Operation::Plus));
        let state = run(&events);
        assert_eq!(state.previous_value, Some(0.0));
        assert_eq!(state.operation, Some(Operation::Plus));

        events.extend(digits("4"));
        events.push(Event::Equals);
        assert_eq!(run(&events).display, "4");
    }

    #[test]
    fn operator_after_clear_entry_folds_cleared_operand() {
        let mut events = digits("9");
        events.push(Event::Operator(Operation::Multiply));
        events.extend(digits("3"));
        events.push(Event::Clear);
        events.push(Event::Operator(Operation::Plus));
        let state = run(&events);
        assert_eq!(state.previous_value, Some(0.0));
        assert_eq!(state.operation, Some(Operation::Plus));

        let mut events = digits("9");
        events.push(Event::Operator(Operation::Minus));
        events.extend(digits("3"));
        events.push(Event::Clear);
        events.push(Event::Operator(Operation::Plus));
        events.extend(digits("1"));
        events.push(Event::Equals);
        assert_eq!(run(&events).display, "10");
    }

    #[test]
    fn chained_operations_fold_left_to_right() {
        let mut events = digits("2");
        events.push(Event::Operator(Operation::Plus));
        events.extend(digits("3"));
        events.push(Event::Operator(Operation::Multiply));
        events.extend(digits("4"));
        events.push(Event::Equals);
        let state = run(&events);
        assert_eq!(state.display, "20");
        assert_eq!(state.input_value, 20.0);
        assert_eq!(state.operation, None);
        assert_eq!(state.previous_value, None);
        assert!(!state.waiting_for_operand);
    }

    #[test]
    fn equals_rounds_to_two_decimals() {
        let mut events = digits("10");
        events.push(Event::Operator(Operation::Divide));
        events.extend(digits("3"));
        events.push(Event::Equals);
        assert_eq!(run(&events).display, "3.33");
    }

    #[test]
    fn percent_takes_fraction_of_left() {
        let mut events = digits("200");
        events.push(Event::Operator(Operation::Percent));
        events.extend(digits("15"));
        events.push(Event::Equals);
        assert_eq!(run(&events).display, "30");
    }

    #[test]
    fn equals_without_operation_is_unchanged() {
        let state = run(&digits("5"));
        let transition = state.apply(Event::Equals);
        assert_eq!(transition.outcome, Outcome::Unchanged);
        assert_eq!(transition.state, state);
    }

    #[test]
    fn division_by_zero_enters_error_state() {
        let mut events = digits("10");
        events.push(Event::Operator(Operation::Divide));
        events.extend(digits("0"));
        events.push(Event::Equals);
        let state = run(&events);
        assert_eq!(state.error, Some(EngineError::DivisionByZero));
        assert_eq!(state.display, "0");
        assert_eq!(state.input_value, 0.0);
        assert!(!state.has_active_operation());

        let next = state.apply(Event::Digit('4')).state;
        assert_eq!(next.error, None);
        assert_eq!(next.display, "4");
    }

    #[test]
    fn chained_division_by_zero_enters_error_state() {
        let mut events = digits("1");
        events.push(Event::Operator(Operation::Divide));
        events.extend(digits("0"));
        events.push(Event::Operator(Operation::Plus));
        let state = run(&events);
        assert_eq!(state.error, Some(EngineError::DivisionByZero));
        assert_eq!(state.operation, None);
    }

    #[test]
    fn oversized_result_enters_error_state() {
        let mut events = digits("99999999999999");
        events.push(Event::Operator(Operation::Multiply));
        events.extend(digits("10"));
        events.push(Event::Equals);
        let state = run(&events);
        assert!(matches!(state.error, Some(EngineError::ResultOutOfRange(_))));
        assert_eq!(state.display, "0");
    }

    #[test]
    fn unchanged_event_clears_error() {
        let mut events = digits("1");
        events.push(Event::Operator(Operation::Divide));
        events.push(Event::Digit('0'));
        events.push(Event::Equals);
        let state = run(&events);
        assert!(state.error.is_some());
        let transition = state.apply(Event::Equals);
        assert_eq!(transition.outcome, Outcome::Unchanged);
        assert_eq!(transition.state.error, None);
    }

    #[test]
    fn clear_with_pending_operation_keeps_operator() {
        let mut events = digits("8");
        events.push(Event::Operator(Operation::Minus));
        events.extend(digits("3"));
        events.push(Event::Clear);
        let state = run(&events);
        assert_eq!(state.display, "0");
        assert_eq!(state.input_value, 0.0);
        assert_eq!(state.operation, Some(Operation::Minus));
        assert_eq!(state.previous_value, Some(8.0));
        assert!(state.waiting_for_operand);
    }

    #[test]
    fn clear_without_operation_resets_everything() {
        let mut events = digits("8.5");
        events.push(Event::Clear);
        let state = run(&events);
        assert_eq!(state.display, "0");
        assert_eq!(state.input_value, 0.0);
        assert_eq!(state.previous_value, None);
        assert_eq!(state.operation, None);
        assert!(!state.waiting_for_operand);
    }

    #[test]
    fn backspace_drops_last_character() {
        let state = run(&digits("5"));
        assert_eq!(state.apply(Event::Backspace).state.display, "0");

        let state = run(&digits("12.5"));
        let state = state.apply(Event::Backspace).state;
        assert_eq!(state.display, "12.");
        assert_eq!(state.input_value, 12.0);
        let state = state.apply(Event::Backspace).state;
        assert_eq!(state.display, "12");
    }

    #[test]
    fn backspace_on_negative_single_digit_resets() {
        let mut events = digits("5");
        events.push(Event::ToggleSign);
        events.push(Event::Backspace);
        let state = run(&events);
        assert_eq!(state.display, "0");
        assert_eq!(state.input_value, 0.0);
    }

    #[test]
    fn toggle_sign_flips_display_and_value() {
        let mut events = digits("12.5");
        events.push(Event::ToggleSign);
        let state = run(&events);
        assert_eq!(state.display, "-12.5");
        assert_eq!(state.input_value, -12.5);

        let state = state.apply(Event::ToggleSign).state;
        assert_eq!(state.display, "12.5");
        assert_eq!(state.input_value, 12.5);
    }

    #[test]
    fn toggle_sign_on_zero_is_unchanged() {
        let transition = CalculatorState::default().apply(Event::ToggleSign);
        assert_eq!(transition.outcome, Outcome::Unchanged);
        assert_eq!(transition.state.display, "0");
    }

    #[test]
    fn negative_operand_in_operation() {
        let mut events = digits("5");
        events.push(Event::ToggleSign);
        events.push(Event::Operator(Operation::Plus));
        events.extend(digits("2"));
        events.push(Event::Equals);
        assert_eq!(run(&events).display, "-3");
    }

    #[test]
    fn reset_seeds_initial_value() {
        let state = run(&[Event::Reset(42.5)]);
        assert_eq!(state.display, "42.5");
        assert_eq!(state.input_value, 42.5);
        assert!(state.waiting_for_operand);

        let state = state.apply(Event::Digit('7')).state;
        assert_eq!(state.display, "7");
    }

    #[test]
    fn reset_to_zero_does_not_wait() {
        let mut events = digits("3");
        events.push(Event::Operator(Operation::Plus));
        events.push(Event::Reset(0.0));
        let state = run(&events);
        assert_eq!(state, CalculatorState::default());
        assert!(!state.show_calculator_actions);
    }

    #[test]
    fn reset_beyond_digit_limit_is_rejected() {
        let state = run(&digits("12"));
        for seed in [1e20, 1_234_567_890_123.45] {
            let transition = state.apply(Event::Reset(seed));
            assert_eq!(
                transition.outcome,
                Outcome::Rejected(EngineError::DigitLimitExceeded(MAX_DIGITS))
            );
            assert_eq!(transition.state, state);
        }

        let state = CalculatorState::with_initial(1e20);
        assert_eq!(state, CalculatorState::default());
        assert_eq!(state.apply(Event::Backspace).outcome, Outcome::Unchanged);
    }

    #[test]
    fn reset_at_digit_limit_is_accepted() {
        let state = run(&[Event::Reset(123_456_789_012.34)]);
        assert_eq!(state.display, "123456789012.34");
        assert!(validate_display(&state.display).is_ok());
    }

    #[test]
    fn operation_implies_previous_value_after_every_event() {
        let mut events = vec![
            Event::Reset(3.0),
            Event::Operator(Operation::Multiply),
            Event::Operator(Operation::Minus),
            Event::Clear,
            Event::Operator(Operation::Plus),
            Event::Digit('9'),
            Event::Backspace,
            Event::Operator(Operation::Divide),
            Event::Digit('0'),
            Event::Operator(Operation::Plus),
            Event::Equals,
            Event::ToggleSign,
            Event::Operator(Operation::Percent),
            Event::Decimal,
            Event::Digit('5'),
            Event::Clear,
            Event::Clear,
            Event::Operator(Operation::Minus),
            Event::Equals,
            Event::Reset(1e20),
        ];
        events.extend(digits("12.345"));
        events.push(Event::Operator(Operation::Plus));
        events.push(Event::Equals);

        let mut state = CalculatorState::default();
        for event in events {
            state = state.apply(event).state;
            if state.operation.is_some() {
                assert!(state.previous_value.is_some(), "after {event:?}: {state:?}");
            }
            assert!(validate_display(&state.display).is_ok(), "after {event:?}: {state:?}");
            assert!(state.input_value.is_finite());
        }
    }
}
