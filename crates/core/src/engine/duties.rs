use rust_decimal::Decimal;

use crate::domain::product::ProductLine;
use crate::domain::variables::{ExciseBasis, QuoteVariables, SaleType, SellerRegion};
use crate::engine::Phase;
use crate::errors::CalcError;
use crate::numeric::pct;
use crate::resolve::resolve;

/// Phase 4 output for one line.
#[derive(Clone, Debug, PartialEq)]
pub struct DutyBreakdown {
    pub internal_sale_price: Decimal,
    pub customs_duty: Decimal,
    pub excise_tax: Decimal,
}

/// Internal sale price: the seller-group transfer price the duty and VAT
/// math runs on. Marked up from the purchase total by the
/// (supplier country, seller region) rate.
pub fn internal_sale_price(purchase_total: Decimal, internal_markup_pct: Decimal) -> Decimal {
    purchase_total * (Decimal::ONE + pct(internal_markup_pct))
}

/// Phase 4: internal pricing, customs duty and excise for one line.
///
/// Duty base is the internal sale price, except transit sales where the
/// purchase price is the base. A Turkish-region seller exporting owes no
/// duty at all.
pub fn duty_breakdown(
    index: usize,
    line: &ProductLine,
    purchase_total: Decimal,
    internal_sale: Decimal,
    variables: &QuoteVariables,
) -> Result<DutyBreakdown, CalcError> {
    let sale_type = variables.company.sale_type;
    let duty_forgiven = variables.company.seller_region == SellerRegion::Turkey
        && sale_type == SaleType::Export;

    let customs_duty = if duty_forgiven {
        Decimal::ZERO
    } else {
        let base = match sale_type {
            SaleType::Transit => purchase_total,
            _ => internal_sale,
        };
        let tariff_pct =
            resolve(line.overrides.import_tariff_pct, variables.taxes.import_tariff_pct);
        base * pct(tariff_pct)
    };
    if customs_duty < Decimal::ZERO {
        return Err(CalcError::NegativeResult {
            phase: Phase::InternalPricing,
            product_index: index,
            field: "customs_duty",
        });
    }

    let excise_rate = resolve(line.overrides.excise_rate, variables.taxes.excise.rate);
    let excise_tax = match variables.taxes.excise.basis {
        ExciseBasis::PerKilogram => excise_rate * line.weight_kg * line.quantity,
        ExciseBasis::PerUnit => excise_rate * line.quantity,
    };
    if excise_tax < Decimal::ZERO {
        return Err(CalcError::NegativeResult {
            phase: Phase::InternalPricing,
            product_index: index,
            field: "excise_tax",
        });
    }

    Ok(DutyBreakdown { internal_sale_price: internal_sale, customs_duty, excise_tax })
}
