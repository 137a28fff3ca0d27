use rust_decimal::Decimal;

/// Two-tier variable resolution: per-product override wins over the quote
/// default. Called at every read site so the precedence is identical
/// everywhere; resolved values are never cached across a run.
pub fn resolve(line_override: Option<Decimal>, quote_default: Decimal) -> Decimal {
    line_override.unwrap_or(quote_default)
}

/// Three-tier variant for variables whose quote default is itself optional.
pub fn resolve_or(
    line_override: Option<Decimal>,
    quote_default: Option<Decimal>,
    fallback: Decimal,
) -> Decimal {
    line_override.or(quote_default).unwrap_or(fallback)
}
