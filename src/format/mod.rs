//! Locale-aware rendering of money, percentages and dates.

use chrono::NaiveDate;

use crate::config::Config;

/// Separators derived from a BCP 47 language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberStyle {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl NumberStyle {
    pub fn for_locale(tag: &str) -> Self {
        let (decimal_separator, grouping_separator) = match language(tag).as_str() {
            "es" | "de" | "it" | "pt" | "nl" => (',', '.'),
            "fr" => (',', ' '),
            _ => ('.', ','),
        };
        Self {
            decimal_separator,
            grouping_separator,
        }
    }
}

fn language(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

pub fn format_number(style: NumberStyle, value: f64, precision: usize) -> String {
    let body = format!("{:.*}", precision, value.abs());
    let (int_part, fraction) = match body.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (body.as_str(), None),
    };
    let mut rendered = group_digits(int_part, style.grouping_separator);
    if let Some(fraction) = fraction {
        rendered.push(style.decimal_separator);
        rendered.push_str(fraction);
    }
    // Avoid "-0.00" for values that round to zero.
    if value < 0.0 && rendered.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        rendered.insert(0, '-');
    }
    rendered
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index != 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Two decimals with the symbol in front, e.g. `$1,234.50` or `€1.234,50`.
pub fn format_money(amount: f64, symbol: &str, locale: &str) -> String {
    let body = format_number(NumberStyle::for_locale(locale), amount.abs(), 2);
    if amount < 0.0 && body.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        format!("-{}{}", symbol, body)
    } else {
        format!("{}{}", symbol, body)
    }
}

pub fn format_percentage(value: f64, locale: &str) -> String {
    format!("{}%", format_number(NumberStyle::for_locale(locale), value, 2))
}

pub fn format_date(locale: &str, date: NaiveDate) -> String {
    let pattern = match language(locale).as_str() {
        "en" if locale.eq_ignore_ascii_case("en-US") || locale.eq_ignore_ascii_case("en") => {
            "%m/%d/%Y"
        }
        "en" | "es" | "fr" | "pt" | "it" => "%d/%m/%Y",
        "de" => "%d.%m.%Y",
        _ => "%Y-%m-%d",
    };
    date.format(pattern).to_string()
}

/// Missing dates render as `N/A`.
pub fn format_optional_date(locale: &str, date: Option<NaiveDate>) -> String {
    date.map(|date| format_date(locale, date))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Formatting bound to the active configuration.
#[derive(Debug, Clone)]
pub struct LocaleFormatter {
    locale: String,
    symbol: String,
}

impl LocaleFormatter {
    pub fn new(locale: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            symbol: symbol.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.locale, &config.currency_symbol)
    }

    pub fn money(&self, amount: f64) -> String {
        format_money(amount, &self.symbol, &self.locale)
    }

    pub fn percentage(&self, value: f64) -> String {
        format_percentage(value, &self.locale)
    }

    pub fn date(&self, date: Option<NaiveDate>) -> String {
        format_optional_date(&self.locale, date)
    }
}

impl Default for LocaleFormatter {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_uses_locale_separators() {
        assert_eq!(format_money(1234.5, "$", "en-US"), "$1,234.50");
        assert_eq!(format_money(1234567.891, "€", "es-ES"), "€1.234.567,89");
        assert_eq!(format_money(-200.0, "$", "en-US"), "-$200.00");
        assert_eq!(format_money(-0.001, "$", "en-US"), "$0.00");
        assert_eq!(format_money(12.0, "$", "en-US"), "$12.00");
    }

    #[test]
    fn percentages_keep_two_decimals() {
        assert_eq!(format_percentage(75.0, "en-US"), "75.00%");
        assert_eq!(format_percentage(33.33, "fr-FR"), "33,33%");
    }

    #[test]
    fn dates_follow_locale() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(format_date("en-US", date), "03/15/2024");
        assert_eq!(format_date("es-AR", date), "15/03/2024");
        assert_eq!(format_date("de-DE", date), "15.03.2024");
        assert_eq!(format_date("ja-JP", date), "2024-03-15");
        assert_eq!(format_optional_date("en-US", None), "N/A");
    }
}
