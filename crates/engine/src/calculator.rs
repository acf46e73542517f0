use crate::{
    DisplayFormatter, FormatOptions, Operation,
    state::{CalculatorState, Event, Outcome},
};

/// Single-owner calculator for one UI surface.
///
/// Wraps a [`CalculatorState`] and replaces it on every transition. Each
/// transition returns its [`Outcome`]; callers that only care about the
/// display can ignore it, rejected edits leave the state untouched.
///
/// ```rust
/// use engine::{Calculator, Operation};
///
/// let mut calculator = Calculator::new();
/// calculator.input_number('2');
/// calculator.perform_operation(Operation::Plus);
/// calculator.input_number('3');
/// calculator.perform_operation(Operation::Multiply);
/// calculator.input_number('4');
/// calculator.calculate_result();
/// assert_eq!(calculator.state().display, "20");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    state: CalculatorState,
}

impl Calculator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculator opened on a starting amount.
    #[must_use]
    pub fn with_initial(initial_value: f64) -> Self {
        Self {
            state: CalculatorState::with_initial(initial_value),
        }
    }

    #[must_use]
    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    /// Applies an event and keeps the resulting state.
    pub fn dispatch(&mut self, event: Event) -> Outcome {
        let transition = self.state.apply(event);
        match &transition.outcome {
            Outcome::Applied => {
                tracing::debug!(?event, display = %transition.state.display, "transition applied");
            }
            Outcome::Unchanged => tracing::trace!(?event, "transition left state unchanged"),
            Outcome::Rejected(reason) => {
                tracing::debug!(?event, "edit rejected: {reason}");
            }
        }
        self.state = transition.state;
        transition.outcome
    }

    pub fn input_number(&mut self, digit: char) -> Outcome {
        self.dispatch(Event::Digit(digit))
    }

    pub fn input_decimal(&mut self) -> Outcome {
        self.dispatch(Event::Decimal)
    }

    /// Clear entry while an operation is pending, full clear otherwise.
    pub fn clear(&mut self) -> Outcome {
        self.dispatch(Event::Clear)
    }

    pub fn backspace(&mut self) -> Outcome {
        self.dispatch(Event::Backspace)
    }

    pub fn toggle_sign(&mut self) -> Outcome {
        self.dispatch(Event::ToggleSign)
    }

    pub fn perform_operation(&mut self, operation: Operation) -> Outcome {
        self.dispatch(Event::Operator(operation))
    }

    /// The `=` key.
    pub fn calculate_result(&mut self) -> Outcome {
        self.dispatch(Event::Equals)
    }

    pub fn reset(&mut self, initial_value: f64) -> Outcome {
        self.dispatch(Event::Reset(initial_value))
    }

    #[must_use]
    pub fn current_value(&self) -> f64 {
        if self.state.input_value.is_finite() {
            self.state.input_value
        } else {
            0.0
        }
    }

    /// Whether `=` would evaluate something; UIs use it to pick the label
    /// of the confirm key.
    #[must_use]
    pub fn has_active_operation(&self) -> bool {
        self.state.has_active_operation()
    }

    /// Human readable display.
    pub fn format_display(
        &self,
        formatter: &DisplayFormatter,
        options: &FormatOptions,
        locale: Option<&str>,
    ) -> String {
        formatter.format_with_options(&self.state.display, options, locale)
    }
}
