//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when building or combining prices.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
    #[error("unsupported currency code {0:?}")]
    UnknownCurrency(String),
    #[error("cannot combine {0} with {1}")]
    CurrencyMismatch(CurrencyCode, CurrencyCode),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// A whole-unit amount, e.g. `Price::whole(1999, CurrencyCode::INR)`.
    #[must_use]
    pub fn whole(units: i64, currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::from(units), currency_code)
    }

    /// Parse the decimal-string/currency-code pair Shopify returns for `Money`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the amount is not a decimal or the currency
    /// code is not supported.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|_| PriceError::InvalidAmount(amount.to_owned()))?;
        let currency_code = currency_code.parse()?;
        Ok(Self::new(amount, currency_code))
    }

    /// Add two prices of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`] if the currencies differ.
    pub fn checked_add(self, other: Self) -> Result<Self, PriceError> {
        if self.currency_code != other.currency_code {
            return Err(PriceError::CurrencyMismatch(
                self.currency_code,
                other.currency_code,
            ));
        }
        Ok(Self::new(self.amount + other.amount, self.currency_code))
    }

    /// Multiply by a quantity (line totals).
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }
}

/// Formats as symbol, thousands-grouped integer part and two decimals:
/// `₹3,499.00`, `$19.99`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = format!("{:.2}", self.amount.abs().round_dp(2));
        let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
        let sign = if self.amount.is_sign_negative() && !self.amount.is_zero() {
            "-"
        } else {
            ""
        };
        write!(
            f,
            "{sign}{}{}.{fraction}",
            self.currency_code.symbol(),
            group_thousands(whole)
        )
    }
}

/// Insert `,` between every group of three digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[allow(clippy::upper_case_acronyms)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Self::INR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(PriceError::UnknownCurrency(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::whole(1999, CurrencyCode::INR).to_string(), "₹1,999.00");
        assert_eq!(
            Price::whole(1_234_567, CurrencyCode::INR).to_string(),
            "₹1,234,567.00"
        );
        assert_eq!(Price::whole(999, CurrencyCode::INR).to_string(), "₹999.00");
        assert_eq!(Price::zero(CurrencyCode::GBP).to_string(), "£0.00");
    }

    #[test]
    fn test_parse_shopify_money() {
        let price = Price::parse("24.5", "USD").unwrap();
        assert_eq!(price.to_string(), "$24.50");
        assert_eq!(price.currency_code, CurrencyCode::USD);

        assert!(matches!(
            Price::parse("abc", "USD"),
            Err(PriceError::InvalidAmount(_))
        ));
        assert!(matches!(
            Price::parse("1.00", "XYZ"),
            Err(PriceError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn test_checked_add_rejects_mixed_currency() {
        let inr = Price::whole(10, CurrencyCode::INR);
        let usd = Price::whole(10, CurrencyCode::USD);
        assert_eq!(
            inr.checked_add(inr).unwrap(),
            Price::whole(20, CurrencyCode::INR)
        );
        assert_eq!(
            inr.checked_add(usd),
            Err(PriceError::CurrencyMismatch(CurrencyCode::INR, CurrencyCode::USD))
        );
    }

    #[test]
    fn test_times() {
        let price = Price::parse("12.99", "USD").unwrap();
        assert_eq!(price.times(3).to_string(), "$38.97");
    }

    #[test]
    fn test_negative_display() {
        let price = Price::parse("-1500", "INR").unwrap();
        assert_eq!(price.to_string(), "-₹1,500.00");
    }
}
