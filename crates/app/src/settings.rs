//! Settings for the calculator driver.
//!
//! Sources, lowest priority first: `config/calculator.toml` (optional),
//! `SPARAGNE_CALC_*` environment variables, command line flags.
use clap::Parser;
use engine::{CurrencyDisplayMode, MAX_DECIMALS, SignDisplay, round_to_decimals};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/calculator.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level for the workspace crates.
    pub level: String,
    pub locale: String,
    /// ISO code; without it amounts are shown as plain numbers.
    pub currency: Option<String>,
    pub currency_display: CurrencyDisplayMode,
    pub sign_display: SignDisplay,
    /// Amount the calculator opens with.
    pub initial: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            locale: "en-US".to_string(),
            currency: None,
            currency_display: CurrencyDisplayMode::Symbol,
            sign_display: SignDisplay::Auto,
            initial: 0.0,
        }
    }
}

impl Settings {
    /// Rounds `value` to the fraction digits the configured currency uses,
    /// never more than the calculator accepts.
    pub fn round_amount(&self, value: f64) -> f64 {
        let decimals = self
            .currency
            .as_deref()
            .and_then(|code| engine::Currency::try_from(code).ok())
            .map_or(MAX_DECIMALS, |currency| {
                usize::from(currency.minor_units()).min(MAX_DECIMALS)
            });
        round_to_decimals(value, decimals)
    }
}

#[derive(Debug, Parser)]
#[command(name = "sparagne_calc", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override locale (BCP-47, e.g. de-DE).
    #[arg(long)]
    locale: Option<String>,
    /// Override currency code (e.g. USD).
    #[arg(long)]
    currency: Option<String>,
    /// Override currency display: symbol, code or name.
    #[arg(long)]
    currency_display: Option<CurrencyDisplayMode>,
    /// Override the starting amount.
    #[arg(long, allow_negative_numbers = true)]
    initial: Option<f64>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    level: Option<String>,
}

pub fn load() -> Result<Settings> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("SPARAGNE_CALC"));
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(locale) = args.locale {
        settings.locale = locale;
    }
    if let Some(currency) = args.currency {
        settings.currency = Some(currency);
    }
    if let Some(currency_display) = args.currency_display {
        settings.currency_display = currency_display;
    }
    if let Some(initial) = args.initial {
        settings.initial = initial;
    }
    if let Some(level) = args.level {
        settings.level = level;
    }

    if let Some(code) = settings.currency.as_deref() {
        engine::Currency::try_from(code)?;
    }

    Ok(settings)
}
