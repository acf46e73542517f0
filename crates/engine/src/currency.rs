use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// How a currency is labelled in front of a formatted amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyDisplayMode {
    /// Localized symbol, e.g. `$`.
    #[default]
    Symbol,
    /// ISO 4217 code, e.g. `USD`.
    Code,
    /// Currency name, e.g. `US Dollar`.
    Name,
}

impl CurrencyDisplayMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CurrencyDisplayMode::Symbol => "symbol",
            CurrencyDisplayMode::Code => "code",
            CurrencyDisplayMode::Name => "name",
        }
    }
}

impl fmt::Display for CurrencyDisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyDisplayMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symbol" => Ok(CurrencyDisplayMode::Symbol),
            "code" => Ok(CurrencyDisplayMode::Code),
            "name" => Ok(CurrencyDisplayMode::Name),
            other => Err(EngineError::InvalidOption(format!(
                "unsupported currency display mode: {other}"
            ))),
        }
    }
}

/// Source of currency symbols and names.
///
/// The formatter only depends on this trait, so hosts can plug in their own
/// registry (exchange-rate services, user-defined currencies, ...).
pub trait CurrencyLookup: Send + Sync {
    /// Symbol for an ISO code, `None` when unknown.
    fn symbol(&self, code: &str) -> Option<String>;
    /// Human readable name for an ISO code, `None` when unknown.
    fn name(&self, code: &str) -> Option<String>;

    /// Resolves the label printed before an amount.
    ///
    /// Unknown codes fall back to the upper-cased code in every mode.
    fn label(&self, code: &str, mode: CurrencyDisplayMode) -> String {
        let code = code.trim().to_ascii_uppercase();
        match mode {
            CurrencyDisplayMode::Symbol => self.symbol(&code).unwrap_or(code),
            CurrencyDisplayMode::Code => code,
            CurrencyDisplayMode::Name => self.name(&code).unwrap_or(code),
        }
    }
}

/// ISO 4217 currency known to the built-in registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Currency {
    code: &'static str,
    symbol: &'static str,
    name: &'static str,
    minor_units: u8,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        self.code
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        self.symbol
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Number of fraction digits the currency uses.
    ///
    /// Example: EUR uses 2 fraction digits (cents), JPY uses none.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        self.minor_units
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_uppercase();
        CurrencyRegistry
            .all()
            .iter()
            .copied()
            .find(|currency| currency.code == code)
            .ok_or(EngineError::UnknownCurrency(code))
    }
}

const fn currency(
    code: &'static str,
    symbol: &'static str,
    name: &'static str,
    minor_units: u8,
) -> Currency {
    Currency {
        code,
        symbol,
        name,
        minor_units,
    }
}

static CURRENCIES: &[Currency] = &[
    currency("USD", "$", "US Dollar", 2),
    currency("EUR", "€", "Euro", 2),
    currency("GBP", "£", "British Pound", 2),
    currency("JPY", "¥", "Japanese Yen", 0),
    currency("CNY", "CN¥", "Chinese Yuan", 2),
    currency("KRW", "₩", "South Korean Won", 0),
    currency("INR", "₹", "Indian Rupee", 2),
    currency("RUB", "₽", "Russian Ruble", 2),
    currency("BRL", "R$", "Brazilian Real", 2),
    currency("CAD", "CA$", "Canadian Dollar", 2),
    currency("AUD", "A$", "Australian Dollar", 2),
    currency("NZD", "NZ$", "New Zealand Dollar", 2),
    currency("HKD", "HK$", "Hong Kong Dollar", 2),
    currency("SGD", "S$", "Singapore Dollar", 2),
    currency("MXN", "MX$", "Mexican Peso", 2),
    currency("CHF", "CHF", "Swiss Franc", 2),
    currency("SEK", "kr", "Swedish Krona", 2),
    currency("NOK", "kr", "Norwegian Krone", 2),
    currency("DKK", "kr", "Danish Krone", 2),
    currency("PLN", "zł", "Polish Zloty", 2),
    currency("CZK", "Kč", "Czech Koruna", 2),
    currency("TRY", "₺", "Turkish Lira", 2),
    currency("ILS", "₪", "Israeli New Shekel", 2),
    currency("THB", "฿", "Thai Baht", 2),
    currency("ZAR", "R", "South African Rand", 2),
    currency("TWD", "NT$", "New Taiwan Dollar", 2),
    currency("VND", "₫", "Vietnamese Dong", 0),
    currency("IDR", "Rp", "Indonesian Rupiah", 2),
    currency("NGN", "₦", "Nigerian Naira", 2),
    currency("KWD", "KD", "Kuwaiti Dinar", 3),
];

/// Built-in registry backed by a static ISO 4217 table.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrencyRegistry;

impl CurrencyRegistry {
    /// All currencies known to the registry.
    #[must_use]
    pub fn all(&self) -> &'static [Currency] {
        CURRENCIES
    }

    pub fn get(&self, code: &str) -> Result<Currency, EngineError> {
        Currency::try_from(code)
    }
}

impl CurrencyLookup for CurrencyRegistry {
    fn symbol(&self, code: &str) -> Option<String> {
        self.get(code).ok().map(|c| c.symbol().to_string())
    }

    fn name(&self, code: &str) -> Option<String> {
        self.get(code).ok().map(|c| c.name().to_string())
    }
}
