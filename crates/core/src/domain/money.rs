use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ISO-style currency code. Stored uppercase; construction normalises.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cost entered in its own currency, converted to the quote currency at
/// calculation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostInCurrency {
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

impl CostInCurrency {
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: CurrencyCode) -> Self {
        Self { amount: Decimal::ZERO, currency }
    }
}

/// Already-resolved exchange rates supplied by the caller: units of quote
/// currency per one unit of the foreign currency. The quote currency itself
/// always converts at 1.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRates {
    pub rates: BTreeMap<CurrencyCode, Decimal>,
}

impl ExchangeRates {
    pub fn rate(&self, currency: &CurrencyCode, quote_currency: &CurrencyCode) -> Option<Decimal> {
        if currency == quote_currency {
            return Some(Decimal::ONE);
        }
        self.rates.get(currency).copied()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{CurrencyCode, ExchangeRates};

    #[test]
    fn currency_codes_normalise_to_uppercase() {
        assert_eq!(CurrencyCode::new(" usd "), CurrencyCode("USD".to_string()));
    }

    #[test]
    fn quote_currency_converts_at_one() {
        let fx = ExchangeRates::default();
        let usd = CurrencyCode::new("USD");
        assert_eq!(fx.rate(&usd, &usd), Some(Decimal::ONE));
    }

    #[test]
    fn unknown_currency_has_no_rate() {
        let mut fx = ExchangeRates::default();
        fx.rates.insert(CurrencyCode::new("EUR"), dec!(1.08));
        assert_eq!(fx.rate(&CurrencyCode::new("EUR"), &CurrencyCode::new("USD")), Some(dec!(1.08)));
        assert_eq!(fx.rate(&CurrencyCode::new("TRY"), &CurrencyCode::new("USD")), None);
    }
}
