use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money::CurrencyCode;

/// One purchased item within a quote. Immutable during a calculation run;
/// any input change triggers a full recompute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    pub name: String,
    /// Unit purchase price as quoted by the supplier. Includes supplier VAT
    /// unless the supplier country is flagged as quoting VAT-exclusive.
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub weight_kg: Decimal,
    pub currency: CurrencyCode,
    /// Rate-book key, e.g. "Turkey" or "China".
    pub supplier_country: String,
    pub customs_code: String,
    #[serde(default)]
    pub overrides: LineOverrides,
}

/// Sparse per-line overrides of quote-level variables. An absent value
/// falls through to the quote default at every read site.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LineOverrides {
    pub discount_pct: Option<Decimal>,
    pub markup_pct: Option<Decimal>,
    pub import_tariff_pct: Option<Decimal>,
    pub excise_rate: Option<Decimal>,
    pub advance_to_supplier_pct: Option<Decimal>,
    pub exchange_rate: Option<Decimal>,
}

impl LineOverrides {
    pub fn is_empty(&self) -> bool {
        self.discount_pct.is_none()
            && self.markup_pct.is_none()
            && self.import_tariff_pct.is_none()
            && self.excise_rate.is_none()
            && self.advance_to_supplier_pct.is_none()
            && self.exchange_rate.is_none()
    }
}
