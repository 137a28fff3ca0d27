use rust_decimal::Decimal;

use crate::errors::CalcError;

/// Per-product share of the total purchase value. Every quote-level pooled
/// cost (logistics, insurance, financing, credit interest) is allocated by
/// these fractions — by purchase value, not by quantity.
///
/// Fractions are kept unrounded so they sum to one within decimal
/// precision.
pub fn distribution_base(purchase_totals: &[Decimal]) -> Result<Vec<Decimal>, CalcError> {
    let grand_total: Decimal = purchase_totals.iter().copied().sum();
    if grand_total.is_zero() {
        // Allocating against a zero base would silently drop every pooled
        // cost downstream; fail instead.
        return Err(CalcError::DistributionUndefined);
    }

    Ok(purchase_totals.iter().map(|total| total / grand_total).collect())
}
