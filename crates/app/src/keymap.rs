use engine::{EngineError, Event, Operation};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Press(Event),
    Quit,
}

/// Maps one whitespace-separated token to key presses.
///
/// Multi-character tokens such as `12.5` expand to one press per key;
/// `r<amount>` reopens the calculator on `amount`.
pub fn map_token(token: &str) -> Result<Vec<KeyAction>, EngineError> {
    let action = match token {
        "q" | "quit" => KeyAction::Quit,
        "c" | "C" | "AC" => KeyAction::Press(Event::Clear),
        "b" | "<" | "⌫" => KeyAction::Press(Event::Backspace),
        "n" | "±" => KeyAction::Press(Event::ToggleSign),
        "=" => KeyAction::Press(Event::Equals),
        _ => {
            if let Some(amount) = token.strip_prefix('r') {
                return parse_reset(amount).map(|event| vec![KeyAction::Press(event)]);
            }
            return token.chars().map(map_key).collect();
        }
    };
    Ok(vec![action])
}

fn map_key(key: char) -> Result<KeyAction, EngineError> {
    let event = match key {
        '0'..='9' => Event::Digit(key),
        '.' | ',' => Event::Decimal,
        '=' => Event::Equals,
        other => Event::Operator(
            Operation::try_from(other).map_err(|_| EngineError::InvalidDigit(other))?,
        ),
    };
    Ok(KeyAction::Press(event))
}

fn parse_reset(amount: &str) -> Result<Event, EngineError> {
    if amount.is_empty() {
        return Ok(Event::Reset(0.0));
    }
    amount
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(Event::Reset)
        .ok_or_else(|| EngineError::InvalidAmount(amount.to_string()))
}
