//! Locale and currency aware rendering of the calculator display.
//!
//! The formatter never reformats what the user is still typing: a trailing
//! decimal point is kept, and fractional digits are shown exactly as typed.
//! Every rendered string is memoized in a [`FormatterCache`] owned by the
//! [`DisplayFormatter`].

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{Arc, PoisonError, RwLock},
};

use fixed_decimal::{Decimal, SignedRoundingMode, UnsignedRoundingMode};
use icu::decimal::options::{DecimalFormatterOptions, GroupingStrategy};
use icu::decimal::{DecimalFormatter, DecimalFormatterPreferences};
use icu::locale::{Locale, locale};
use serde::{Deserialize, Serialize};

use crate::{
    CurrencyDisplayMode, CurrencyLookup, CurrencyRegistry, EngineError, ResultEngine,
    normalize::{DEFAULT_DISPLAY, MAX_DECIMALS, display_from_value, parse_display},
    operation::round_to_decimals,
};

/// When a sign character is printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignDisplay {
    /// `-` for negative values only.
    #[default]
    Auto,
    /// `+` or `-` on every value.
    Always,
    /// `+` or `-`, nothing for zero.
    ExceptZero,
    /// `-` for negative values, nothing for negative zero.
    Negative,
    /// Never print a sign.
    Never,
}

impl SignDisplay {
    fn prefix(self, negative: bool, zero: bool) -> &'static str {
        match (self, negative, zero) {
            (SignDisplay::Never, ..) => "",
            (SignDisplay::Auto | SignDisplay::Always, true, _) => "-",
            (SignDisplay::Always, false, _) => "+",
            (SignDisplay::ExceptZero | SignDisplay::Negative, true, false) => "-",
            (SignDisplay::ExceptZero, false, false) => "+",
            _ => "",
        }
    }
}

impl FromStr for SignDisplay {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(SignDisplay::Auto),
            "always" => Ok(SignDisplay::Always),
            "except_zero" | "exceptzero" => Ok(SignDisplay::ExceptZero),
            "negative" => Ok(SignDisplay::Negative),
            "never" => Ok(SignDisplay::Never),
            other => Err(EngineError::InvalidOption(format!(
                "unsupported sign display: {other}"
            ))),
        }
    }
}

/// Options that, together with the locale and the value, identify a
/// rendered string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatOptions {
    /// ISO code; `None` renders a plain number.
    pub currency: Option<String>,
    pub currency_display: CurrencyDisplayMode,
    pub sign_display: SignDisplay,
}

impl FormatOptions {
    #[must_use]
    pub fn currency(code: impl Into<String>, currency_display: CurrencyDisplayMode) -> Self {
        Self {
            currency: Some(code.into()),
            currency_display,
            sign_display: SignDisplay::default(),
        }
    }

    #[must_use]
    pub fn with_sign_display(mut self, sign_display: SignDisplay) -> Self {
        self.sign_display = sign_display;
        self
    }
}

/// Memoized formatter output keyed by the serialized `(locale, options, value)`.
///
/// Entries are never evicted; call [`FormatterCache::clear`] to drop them.
#[derive(Debug, Default)]
pub struct FormatterCache {
    entries: RwLock<HashMap<String, String>>,
}

impl FormatterCache {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn insert(&self, key: String, formatted: String) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, formatted);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// ICU decimal formatter and decimal separator of one locale.
struct LocaleFormat {
    formatter: Option<DecimalFormatter>,
    separator: char,
}

impl LocaleFormat {
    fn new(locale: &Locale) -> Self {
        let formatter = decimal_formatter(locale);
        let separator = formatter.as_ref().map_or('.', decimal_separator);
        Self {
            formatter,
            separator,
        }
    }

    /// Groups an unsigned decimal string, rounding half away from zero at
    /// `max_fraction` and padding to `min_fraction` digits.
    fn format_unsigned(&self, digits: &str, min_fraction: usize, max_fraction: usize) -> String {
        let mut decimal = Decimal::try_from_str(digits).unwrap_or_else(|_| Decimal::from(0));
        decimal.round_with_mode(
            -(max_fraction as i16),
            SignedRoundingMode::Unsigned(UnsignedRoundingMode::HalfExpand),
        );
        decimal.absolute.trim_end();
        if min_fraction > 0 {
            decimal.absolute.pad_end(-(min_fraction as i16));
        }

        match &self.formatter {
            Some(formatter) => formatter.format(&decimal).to_string(),
            None => decimal.to_string(),
        }
    }
}

/// Renders display strings for a UI surface.
///
/// Owns its default locale, its currency lookup, one ICU formatter per
/// locale it has seen and its cache; it can be shared between threads.
///
/// The engine does not read the host locale. Hosts pass theirs through
/// [`DisplayFormatterBuilder::locale`]; without one, `en-US` is used.
pub struct DisplayFormatter {
    default_locale: Locale,
    lookup: Box<dyn CurrencyLookup>,
    locales: RwLock<HashMap<String, Arc<LocaleFormat>>>,
    cache: FormatterCache,
}

impl fmt::Debug for DisplayFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayFormatter")
            .field("default_locale", &self.default_locale.to_string())
            .field("cache_entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl Default for DisplayFormatter {
    fn default() -> Self {
        Self {
            default_locale: locale!("en-US"),
            lookup: Box::new(CurrencyRegistry),
            locales: RwLock::default(),
            cache: FormatterCache::default(),
        }
    }
}

impl DisplayFormatter {
    /// Return a builder for `DisplayFormatter`.
    pub fn builder() -> DisplayFormatterBuilder {
        DisplayFormatterBuilder::default()
    }

    #[must_use]
    pub fn cache(&self) -> &FormatterCache {
        &self.cache
    }

    #[must_use]
    pub fn default_locale(&self) -> String {
        self.default_locale.to_string()
    }

    /// Formats a display string, optionally as an amount of `currency`.
    ///
    /// ```rust
    /// use engine::{CurrencyDisplayMode, DisplayFormatter};
    ///
    /// let formatter = DisplayFormatter::default();
    /// assert_eq!(
    ///     formatter.format_display_value("1234.5", Some("USD"), CurrencyDisplayMode::Symbol, None),
    ///     "$1,234.5"
    /// );
    /// assert_eq!(formatter.format_display_value("1234.", None, CurrencyDisplayMode::Symbol, None), "1,234.");
    /// ```
    pub fn format_display_value(
        &self,
        value: &str,
        currency: Option<&str>,
        currency_display: CurrencyDisplayMode,
        locale: Option<&str>,
    ) -> String {
        let options = FormatOptions {
            currency: currency.map(str::to_string),
            currency_display,
            sign_display: SignDisplay::default(),
        };
        self.format_with_options(value, &options, locale)
    }

    /// Formats a display string with explicit options.
    pub fn format_with_options(
        &self,
        value: &str,
        options: &FormatOptions,
        locale: Option<&str>,
    ) -> String {
        let locale = self.resolve_locale(locale);
        let key = serde_json::to_string(&(locale.to_string(), options, value)).ok();

        if let Some(key) = key.as_deref()
            && let Some(hit) = self.cache.get(key)
        {
            return hit;
        }

        tracing::debug!(value, locale = %locale, "formatter cache miss");
        let formatted = self.render(value, options, &locale);
        if let Some(key) = key {
            self.cache.insert(key, formatted.clone());
        }
        formatted
    }

    /// Formats a computed value (plain number, up to two decimals).
    pub fn format_number(&self, value: f64, locale: Option<&str>) -> String {
        if !value.is_finite() {
            return DEFAULT_DISPLAY.to_string();
        }
        let display = display_from_value(round_to_decimals(value, MAX_DECIMALS));
        self.format_with_options(&display, &FormatOptions::default(), locale)
    }

    /// Parses a string produced by this formatter back into a number.
    ///
    /// Grouping separators, currency labels, spaces and `+` are ignored.
    pub fn parse_formatted(&self, formatted: &str, locale: Option<&str>) -> ResultEngine<f64> {
        let locale = self.resolve_locale(locale);
        let separator = self.locale_format(&locale).separator;

        let mut negative = false;
        let mut seen_separator = false;
        let mut digits = String::new();
        for ch in formatted.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
            } else if ch == separator && !digits.is_empty() {
                if seen_separator {
                    return Err(EngineError::InvalidAmount(formatted.to_string()));
                }
                seen_separator = true;
                digits.push('.');
            } else if matches!(ch, '-' | '−') && digits.is_empty() {
                negative = true;
            }
        }

        if digits.is_empty() {
            return Err(EngineError::InvalidAmount(formatted.to_string()));
        }

        let value: f64 = digits
            .parse()
            .map_err(|_| EngineError::InvalidAmount(formatted.to_string()))?;
        Ok(if negative { -value } else { value })
    }

    fn resolve_locale(&self, locale: Option<&str>) -> Locale {
        match locale.map(str::parse::<Locale>) {
            Some(Ok(locale)) => locale,
            Some(Err(err)) => {
                tracing::debug!("unparseable locale, using default: {err}");
                self.default_locale.clone()
            }
            None => self.default_locale.clone(),
        }
    }

    /// ICU data for `locale`, built on first use.
    fn locale_format(&self, locale: &Locale) -> Arc<LocaleFormat> {
        let key = locale.to_string();
        if let Some(format) = self
            .locales
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(format);
        }

        let format = Arc::new(LocaleFormat::new(locale));
        self.locales
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(format)
            .clone()
    }

    fn render(&self, value: &str, options: &FormatOptions, locale: &Locale) -> String {
        let trimmed = value.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let format = self.locale_format(locale);
        let separator = format.separator;

        if let Some(integer) = unsigned.strip_suffix('.') {
            let integer = if integer.is_empty() { "0" } else { integer };
            if !is_plain_number(integer) || integer.contains('.') {
                return "0.".to_string();
            }
            let integer = strip_leading_zeros(integer);
            let number = format.format_unsigned(integer, 0, 0);
            let sign = options
                .sign_display
                .prefix(negative, parse_display(integer) == 0.0);
            return format!("{sign}{}{number}{separator}", self.label(options));
        }

        if !is_plain_number(unsigned) {
            return if unsigned == "." {
                "0.".to_string()
            } else {
                DEFAULT_DISPLAY.to_string()
            };
        }

        let sign = options
            .sign_display
            .prefix(negative, parse_display(unsigned) == 0.0);
        let (integer, fraction) = match unsigned.split_once('.') {
            Some((integer, fraction)) => (strip_leading_zeros(integer), Some(fraction)),
            None => (strip_leading_zeros(unsigned), None),
        };

        if options.currency.is_some() {
            let min_decimals = fraction.map_or(0, |f| f.len().min(MAX_DECIMALS));
            let digits = match fraction {
                Some(fraction) => format!("{integer}.{fraction}"),
                None => integer.to_string(),
            };
            let number = format.format_unsigned(&digits, min_decimals, MAX_DECIMALS);
            return format!("{sign}{}{number}", self.label(options));
        }

        let number = format.format_unsigned(integer, 0, 0);
        match fraction {
            Some(fraction) => format!("{sign}{number}{separator}{fraction}"),
            None => format!("{sign}{number}"),
        }
    }

    /// Currency label followed by its separator, empty without a currency.
    fn label(&self, options: &FormatOptions) -> String {
        let Some(code) = options.currency.as_deref() else {
            return String::new();
        };
        let label = self.lookup.label(code, options.currency_display);
        if label.chars().last().is_some_and(char::is_alphabetic) {
            format!("{label} ")
        } else {
            label
        }
    }
}

/// Builder for [`DisplayFormatter`].
#[derive(Default)]
pub struct DisplayFormatterBuilder {
    locale: Option<String>,
    lookup: Option<Box<dyn CurrencyLookup>>,
}

impl DisplayFormatterBuilder {
    /// Locale used when a call does not pass one (BCP-47, e.g. `de-DE`).
    /// Hosts pass their system or user locale here.
    pub fn locale(mut self, locale: impl Into<String>) -> DisplayFormatterBuilder {
        self.locale = Some(locale.into());
        self
    }

    /// Currency symbol/name source.
    pub fn lookup(mut self, lookup: impl CurrencyLookup + 'static) -> DisplayFormatterBuilder {
        self.lookup = Some(Box::new(lookup));
        self
    }

    /// Construct `DisplayFormatter`.
    pub fn build(self) -> ResultEngine<DisplayFormatter> {
        let mut formatter = DisplayFormatter::default();
        if let Some(locale) = self.locale {
            formatter.default_locale = locale
                .parse()
                .map_err(|_| EngineError::InvalidLocale(locale.clone()))?;
        }
        if let Some(lookup) = self.lookup {
            formatter.lookup = lookup;
        }
        Ok(formatter)
    }
}

fn is_plain_number(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.matches('.').count() <= 1
}

/// Integer digits without leading zeros; `""` and `"000"` become `"0"`.
fn strip_leading_zeros(integer: &str) -> &str {
    let stripped = integer.trim_start_matches('0');
    if stripped.is_empty() { "0" } else { stripped }
}

fn decimal_formatter(locale: &Locale) -> Option<DecimalFormatter> {
    let mut options = DecimalFormatterOptions::default();
    options.grouping_strategy = Some(GroupingStrategy::Auto);
    DecimalFormatter::try_new(DecimalFormatterPreferences::from(locale), options)
        .or_else(|_| DecimalFormatter::try_new(Default::default(), options))
        .ok()
}

fn decimal_separator(formatter: &DecimalFormatter) -> char {
    let Ok(sample) = Decimal::try_from_str("1.5") else {
        return '.';
    };
    formatter
        .format(&sample)
        .to_string()
        .chars()
        .find(|c| !c.is_numeric())
        .unwrap_or('.')
}
