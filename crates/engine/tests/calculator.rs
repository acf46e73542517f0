use std::sync::Arc;

use engine::{
    Calculator, CurrencyDisplayMode, DisplayFormatter, EngineError, Event, FormatOptions,
    Operation, Outcome, display_from_value,
};

fn type_in(calculator: &mut Calculator, keys: &str) {
    for key in keys.chars() {
        let event = match key {
            '.' => Event::Decimal,
            '=' => Event::Equals,
            'c' => Event::Clear,
            '<' => Event::Backspace,
            'n' => Event::ToggleSign,
            digit if digit.is_ascii_digit() => Event::Digit(digit),
            op => Event::Operator(Operation::try_from(op).unwrap()),
        };
        calculator.dispatch(event);
    }
}

#[test]
fn chained_operations_have_no_precedence() {
    let mut calculator = Calculator::new();
    type_in(&mut calculator, "2+3×4=");
    assert_eq!(calculator.state().display, "20");
    assert_eq!(calculator.current_value(), 20.0);
}

#[test]
fn result_can_be_used_as_next_left_operand() {
    let mut calculator = Calculator::new();
    type_in(&mut calculator, "12.5×2=");
    assert_eq!(calculator.state().display, "25");
    type_in(&mut calculator, "-5=");
    assert_eq!(calculator.state().display, "20");
}

#[test]
fn sheet_opened_with_amount() {
    let mut calculator = Calculator::with_initial(49.99);
    assert_eq!(calculator.state().display, "49.99");

    type_in(&mut calculator, "+");
    assert_eq!(calculator.state().previous_value, Some(49.99));
    type_in(&mut calculator, "0.01=");
    assert_eq!(calculator.state().display, "50");

    let mut calculator = Calculator::with_initial(49.99);
    type_in(&mut calculator, "7");
    assert_eq!(calculator.state().display, "7");
}

#[test]
fn clear_entry_then_full_clear() {
    let mut calculator = Calculator::new();
    type_in(&mut calculator, "9÷3c");
    assert_eq!(calculator.state().display, "0");
    assert_eq!(calculator.state().operation, Some(Operation::Divide));
    assert_eq!(calculator.state().previous_value, Some(9.0));

    type_in(&mut calculator, "2=");
    assert_eq!(calculator.state().display, "4.5");

    type_in(&mut calculator, "c");
    assert_eq!(calculator.state().display, "0");
    assert_eq!(calculator.state().previous_value, None);
    assert_eq!(calculator.state().operation, None);
}

#[test]
fn backspace_to_zero() {
    let mut calculator = Calculator::new();
    type_in(&mut calculator, "5<");
    assert_eq!(calculator.state().display, "0");
    assert_eq!(calculator.backspace(), Outcome::Unchanged);
}

#[test]
fn division_by_zero_never_reaches_the_display() {
    let formatter = DisplayFormatter::default();
    let options = FormatOptions::currency("USD", CurrencyDisplayMode::Symbol);
    let mut calculator = Calculator::new();
    type_in(&mut calculator, "8÷0=");

    assert_eq!(calculator.state().error, Some(EngineError::DivisionByZero));
    assert_eq!(calculator.format_display(&formatter, &options, None), "$0");
    assert!(calculator.current_value().is_finite());

    type_in(&mut calculator, "6");
    assert_eq!(calculator.state().error, None);
    assert_eq!(calculator.state().display, "6");
}

#[test]
fn operator_after_clear_entry_uses_zero_operand() {
    let mut calculator = Calculator::new();
    type_in(&mut calculator, "9×3c+");
    assert_eq!(calculator.state().previous_value, Some(0.0));
    type_in(&mut calculator, "5=");
    assert_eq!(calculator.state().display, "5");
}

#[test]
fn reset_outside_display_limits_keeps_state() {
    let mut calculator = Calculator::new();
    type_in(&mut calculator, "42");
    assert_eq!(
        calculator.reset(1e20),
        Outcome::Rejected(EngineError::DigitLimitExceeded(14))
    );
    assert!(calculator.reset(1_234_567_890_123.45).is_rejected());
    assert_eq!(calculator.state().display, "42");

    let calculator = Calculator::with_initial(1e20);
    assert_eq!(calculator.state().display, "0");
    assert_eq!(calculator.current_value(), 0.0);
}

#[test]
fn non_canonical_display_values_format_as_numbers() {
    let formatter = DisplayFormatter::default();
    let usd = |value| {
        formatter.format_display_value(value, Some("USD"), CurrencyDisplayMode::Symbol, None)
    };
    assert_eq!(usd("007"), "$7");
    assert_eq!(usd("0012."), "$12.");
    assert_eq!(usd("0005.5"), "$5.5");
    assert_eq!(
        formatter.format_display_value("0000", None, CurrencyDisplayMode::Symbol, None),
        "0"
    );
}

#[test]
fn limits_reject_silently() {
    let mut calculator = Calculator::new();
    type_in(&mut calculator, "99999999999999");
    assert!(calculator.input_number('9').is_rejected());
    assert_eq!(calculator.state().display, "99999999999999");
    type_in(&mut calculator, ".");
    assert!(calculator.input_number('1').is_rejected());
}

#[test]
fn formatted_display_round_trips() {
    let formatter = DisplayFormatter::default();
    let options = FormatOptions::currency("USD", CurrencyDisplayMode::Code);

    for keys in ["0", "7", "1234.5", "12.50", "99999999999999", "1000000.01", "0.05"] {
        let mut calculator = Calculator::new();
        type_in(&mut calculator, keys);
        let expected = calculator.current_value();

        let formatted = calculator.format_display(&formatter, &options, None);
        let parsed = formatter.parse_formatted(&formatted, None).unwrap();
        assert_eq!(parsed, expected, "{keys} -> {formatted}");

        let mut reentered = Calculator::new();
        type_in(&mut reentered, &display_from_value(parsed));
        assert_eq!(reentered.current_value(), expected, "{keys}");
    }
}

#[test]
fn currency_display_modes_for_typed_amount() {
    let formatter = DisplayFormatter::default();
    assert_eq!(
        formatter.format_display_value("1234.5", Some("USD"), CurrencyDisplayMode::Symbol, None),
        "$1,234.5"
    );
    assert_eq!(
        formatter.format_display_value("1234.5", Some("USD"), CurrencyDisplayMode::Code, None),
        "USD 1,234.5"
    );
}

#[test]
fn formatter_is_shared_between_threads() {
    let formatter = Arc::new(DisplayFormatter::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let formatter = Arc::clone(&formatter);
            std::thread::spawn(move || {
                formatter.format_display_value(
                    &format!("{i}000"),
                    Some("EUR"),
                    CurrencyDisplayMode::Symbol,
                    None,
                )
            })
        })
        .collect();

    let mut rendered: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    rendered.sort();
    assert_eq!(rendered, ["€0", "€1,000", "€2,000", "€3,000"]);
    assert_eq!(formatter.cache().len(), 4);
}
