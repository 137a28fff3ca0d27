use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

/// Half-up rounding to two decimal places, the standard mode for currency
/// amounts throughout the pipeline.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Ceiling to one decimal place. Used only for the quote-level insurance
/// reserve, which the legacy model always rounds up.
pub fn ceil_1dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::ToPositiveInfinity)
}

/// Converts a percentage in [0, 100] to a fraction.
pub fn pct(rate: Decimal) -> Decimal {
    rate / Decimal::ONE_HUNDRED
}

/// Compound-interest future value: `principal * (1 + daily_rate)^days`.
/// Returns `None` on arithmetic overflow.
pub fn future_value(principal: Decimal, daily_rate: Decimal, days: u32) -> Option<Decimal> {
    if days == 0 || principal.is_zero() {
        return Some(principal);
    }
    let growth = (Decimal::ONE + daily_rate).checked_powi(i64::from(days))?;
    principal.checked_mul(growth)
}

/// Interest accrued over the holding period: future value minus principal.
pub fn accrued_interest(principal: Decimal, daily_rate: Decimal, days: u32) -> Option<Decimal> {
    future_value(principal, daily_rate, days).map(|fv| fv - principal)
}
