// ABOUTME: Supported currencies with static conversion rates
// ABOUTME: Conversion is display-only; ledger amounts keep their bid currency

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money::Cents;

/// Currencies accepted for bids, payouts, and tips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Cad,
    Usd,
    Eur,
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Cad
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CAD" => Ok(Currency::Cad),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            other => Err(format!("unsupported currency: {}", other)),
        }
    }
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Cad => "CAD",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Lowercase code as payment processors expect it.
    pub fn processor_code(&self) -> &'static str {
        match self {
            Currency::Cad => "cad",
            Currency::Usd => "usd",
            Currency::Eur => "eur",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Cad | Currency::Usd => "$",
            Currency::Eur => "\u{20ac}",
        }
    }
}

/// Static exchange rates in basis points (1 unit of `from` = rate/10000 of `to`).
///
/// Approximate rates used for viewer-facing totals only; settlement always
/// moves money in the currency it was pledged in.
const RATES_BPS: [(Currency, Currency, i64); 6] = [
    (Currency::Cad, Currency::Usd, 7_400),
    (Currency::Cad, Currency::Eur, 6_800),
    (Currency::Usd, Currency::Cad, 13_500),
    (Currency::Usd, Currency::Eur, 9_200),
    (Currency::Eur, Currency::Cad, 14_700),
    (Currency::Eur, Currency::Usd, 10_900),
];

/// Convert an amount between currencies using the static rate table.
///
/// Returns the input unchanged when the currencies match or no rate is
/// listed.
pub fn convert(amount: Cents, from: Currency, to: Currency) -> Cents {
    if from == to {
        return amount;
    }
    match RATES_BPS.iter().find(|(f, t, _)| *f == from && *t == to) {
        Some((_, _, rate)) => amount.mul_ratio(*rate, 10_000),
        None => amount,
    }
}

/// Format an amount for display, e.g. `$12.50 CAD`.
pub fn format_amount(amount: Cents, currency: Currency) -> String {
    format!("{}{} {}", currency.symbol(), amount, currency.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_same_currency_is_identity() {
        assert_eq!(convert(Cents(1000), Currency::Cad, Currency::Cad), Cents(1000));
    }

    #[test]
    fn test_cad_to_usd() {
        // 100.00 CAD * 0.74 = 74.00 USD
        assert_eq!(convert(Cents(10_000), Currency::Cad, Currency::Usd), Cents(7_400));
    }

    #[test]
    fn test_round_trip_is_approximate() {
        let eur = convert(Cents(10_000), Currency::Usd, Currency::Eur);
        let back = convert(eur, Currency::Eur, Currency::Usd);
        // Static rates do not invert exactly; the result stays within 1%.
        assert!((back.value() - 10_000).abs() < 100);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Cents(1250), Currency::Cad), "$12.50 CAD");
        assert_eq!(format_amount(Cents(30), Currency::Eur), "\u{20ac}0.30 EUR");
    }

    #[test]
    fn test_parse() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert!("GBP".parse::<Currency>().is_err());
    }
}
