use std::io::{self, BufRead, Write};

use engine::{Calculator, DisplayFormatter, Event, FormatOptions, display_from_value};

use crate::{error::Result, keymap::KeyAction, settings::Settings};

mod error;
mod keymap;
mod settings;

fn main() -> Result<()> {
    let settings = settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "sparagne_calc={level},engine={level}",
            level = settings.level
        ))
        .with_writer(io::stderr)
        .init();

    let formatter = DisplayFormatter::builder()
        .locale(settings.locale.as_str())
        .build()?;
    let options = FormatOptions {
        currency: settings.currency.clone(),
        currency_display: settings.currency_display,
        sign_display: settings.sign_display,
    };
    tracing::info!(
        locale = %settings.locale,
        currency = ?settings.currency,
        "calculator ready"
    );

    let mut calculator = Calculator::with_initial(settings.round_amount(settings.initial));
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", render(&calculator, &formatter, &options))?;

    for line in stdin.lock().lines() {
        let line = line?;
        let mut quit = false;

        for token in line.split_whitespace() {
            let actions = match keymap::map_token(token) {
                Ok(actions) => actions,
                Err(err) => {
                    tracing::warn!("skipping {token:?}: {err}");
                    continue;
                }
            };
            for action in actions {
                match action {
                    KeyAction::Press(Event::Reset(amount)) => {
                        calculator.reset(settings.round_amount(amount));
                    }
                    KeyAction::Press(event) => {
                        calculator.dispatch(event);
                    }
                    KeyAction::Quit => quit = true,
                }
            }
            if quit {
                break;
            }
        }

        writeln!(stdout, "{}", render(&calculator, &formatter, &options))?;
        if quit {
            break;
        }
    }

    log_summary(&settings, &calculator);
    Ok(())
}

/// One status line: pending operand and operator, the display, and the
/// label of the confirm key.
fn render(
    calculator: &Calculator,
    formatter: &DisplayFormatter,
    options: &FormatOptions,
) -> String {
    let state = calculator.state();
    if state.error.is_some() {
        return "Error".to_string();
    }

    let display = calculator.format_display(formatter, options, None);
    let confirm = if calculator.has_active_operation() {
        "="
    } else {
        "ok"
    };

    match (state.previous_value, state.operation) {
        (Some(previous), Some(operation)) => {
            let previous =
                formatter.format_with_options(&display_from_value(previous), options, None);
            format!("{previous} {operation} {display}  [{confirm}]")
        }
        _ => format!("{display}  [{confirm}]"),
    }
}

fn log_summary(settings: &Settings, calculator: &Calculator) {
    tracing::info!(
        value = calculator.current_value(),
        currency = ?settings.currency,
        "calculator closed"
    );
}
