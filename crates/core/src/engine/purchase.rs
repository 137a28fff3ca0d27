use rust_decimal::Decimal;

use crate::domain::product::ProductLine;
use crate::domain::variables::QuoteVariables;
use crate::engine::Phase;
use crate::errors::CalcError;
use crate::numeric::pct;
use crate::rates::RateBook;
use crate::resolve::resolve;

/// Phase 1 output for one line.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseBreakdown {
    pub unit_price_net_of_vat: Decimal,
    pub unit_price_discounted: Decimal,
    pub unit_price_converted: Decimal,
    pub total_purchase_price: Decimal,
}

/// Phase 1: supplier VAT removal, supplier discount, conversion to the
/// quote currency, extension by quantity.
pub fn purchase_price(
    index: usize,
    line: &ProductLine,
    variables: &QuoteVariables,
    rates: &RateBook,
) -> Result<PurchaseBreakdown, CalcError> {
    let profile = rates.country(&line.supplier_country)?;

    // Countries that quote VAT-exclusive prices skip the removal step.
    let unit_price_net_of_vat = if profile.price_includes_vat {
        line.unit_price / (Decimal::ONE + pct(profile.vat_pct))
    } else {
        line.unit_price
    };

    let discount_pct = resolve(line.overrides.discount_pct, variables.financial.discount_pct);
    let unit_price_discounted = unit_price_net_of_vat * (Decimal::ONE - pct(discount_pct));

    let rate = match line.overrides.exchange_rate {
        Some(rate) => rate,
        None => variables
            .fx
            .rate(&line.currency, &variables.financial.quote_currency)
            .ok_or_else(|| {
                CalcError::invalid_input(
                    Some(index),
                    "exchange_rate",
                    format!("no rate supplied for `{}`", line.currency),
                )
            })?,
    };
    let unit_price_converted = unit_price_discounted * rate;
    let total_purchase_price = unit_price_converted * line.quantity;

    if total_purchase_price < Decimal::ZERO {
        return Err(CalcError::NegativeResult {
            phase: Phase::PurchasePrice,
            product_index: index,
            field: "total_purchase_price",
        });
    }

    Ok(PurchaseBreakdown {
        unit_price_net_of_vat,
        unit_price_discounted,
        unit_price_converted,
        total_purchase_price,
    })
}
