//! # Currency
//!
//! Currency descriptors and display formatting for cart amounts.
//! All amounts are carried as integers in the currency's smallest unit.

use crate::error::{CartError, CartResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    MXN,
}

impl Currency {
    /// All supported currencies, in display order
    pub const ALL: [Currency; 8] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::CAD,
        Currency::AUD,
        Currency::CHF,
        Currency::MXN,
    ];

    /// Returns the ISO 4217 currency code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::MXN => "MXN",
        }
    }

    /// Display symbol placed before the amount
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CAD => "C$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF ",
            Currency::MXN => "MX$",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, most others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }
}

impl FromStr for Currency {
    type Err = CartError;

    fn from_str(s: &str) -> CartResult<Self> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CartError::UnsupportedCurrency {
                currency: s.to_string(),
            })
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Format an amount given in the smallest currency unit for display
/// (e.g. `2000` USD → `"$20.00"`, `150000` JPY → `"¥150,000"`).
pub fn format_currency_value(currency: Currency, value: i64) -> String {
    let places = u32::from(currency.decimal_places());
    let divisor = 10_u64.pow(places);
    let magnitude = value.unsigned_abs();
    let major = magnitude / divisor;
    let minor = magnitude % divisor;

    let mut out = String::new();
    if value < 0 {
        out.push('-');
    }
    out.push_str(currency.symbol());
    out.push_str(&group_thousands(major));
    if places > 0 {
        out.push('.');
        out.push_str(&format!("{:0width$}", minor, width = places as usize));
    }
    out
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_currency_value(Currency::USD, 2000), "$20.00");
        assert_eq!(format_currency_value(Currency::USD, 5), "$0.05");
        assert_eq!(format_currency_value(Currency::USD, 0), "$0.00");
        assert_eq!(format_currency_value(Currency::USD, 123_456_789), "$1,234,567.89");
    }

    #[test]
    fn test_format_other_currencies() {
        assert_eq!(format_currency_value(Currency::EUR, 1999), "€19.99");
        assert_eq!(format_currency_value(Currency::JPY, 150_000), "¥150,000");
        assert_eq!(format_currency_value(Currency::CHF, 100), "CHF 1.00");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_currency_value(Currency::USD, -250), "-$2.50");
    }

    #[test]
    fn test_parse_code() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!(" GBP ".parse::<Currency>().unwrap(), Currency::GBP);
        assert!(matches!(
            "XYZ".parse::<Currency>(),
            Err(CartError::UnsupportedCurrency { .. })
        ));
    }

    #[test]
    fn test_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Currency::EUR).unwrap(), r#""EUR""#);
    }
}
