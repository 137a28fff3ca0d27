use rust_decimal::Decimal;

use crate::domain::money::CostInCurrency;
use crate::domain::variables::QuoteVariables;
use crate::errors::CalcError;
use crate::numeric::{ceil_1dp, pct};

/// Phase 2: the quote-level logistics pool. Three delivery legs, the five
/// clearance costs and the flat utility fee, each converted to the quote
/// currency and summed once. Allocation back to lines happens by
/// distribution share, never by recomputing per line.
pub fn logistics_pool(variables: &QuoteVariables) -> Result<Decimal, CalcError> {
    let legs = [
        ("supplier_to_hub", &variables.logistics.supplier_to_hub),
        ("hub_to_border", &variables.logistics.hub_to_border),
        ("border_to_client", &variables.logistics.border_to_client),
    ];

    let mut pool = Decimal::ZERO;
    for (field, cost) in legs {
        pool += convert(cost, field, variables)?;
    }
    for (field, cost) in variables.clearance.iter() {
        pool += convert(cost, field, variables)?;
    }
    pool += variables.taxes.utility_fee;

    Ok(pool)
}

/// Phase 3: the insurance reserve, computed exactly once per quote on the
/// combined internal sale value and rounded UP to one decimal place.
/// Recomputing this per product overstates the reserve N-fold on
/// multi-product quotes.
pub fn insurance_total(total_internal_sale_value: Decimal, insurance_rate_pct: Decimal) -> Decimal {
    ceil_1dp(total_internal_sale_value * pct(insurance_rate_pct))
}

fn convert(
    cost: &CostInCurrency,
    field: &'static str,
    variables: &QuoteVariables,
) -> Result<Decimal, CalcError> {
    let rate = variables
        .fx
        .rate(&cost.currency, &variables.financial.quote_currency)
        .ok_or_else(|| {
            CalcError::invalid_input(
                None,
                field,
                format!("no exchange rate supplied for `{}`", cost.currency),
            )
        })?;
    Ok(cost.amount * rate)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::domain::money::{CostInCurrency, CurrencyCode};
    use crate::engine::test_support::quote_variables;
    use crate::errors::CalcError;

    use super::{insurance_total, logistics_pool};

    #[test]
    fn pool_sums_legs_clearance_and_utility_in_quote_currency() {
        let mut variables = quote_variables();
        variables.logistics.supplier_to_hub =
            CostInCurrency::new(dec!(500), CurrencyCode::new("USD"));
        variables.logistics.hub_to_border =
            CostInCurrency::new(dec!(200), CurrencyCode::new("EUR"));
        variables.logistics.border_to_client =
            CostInCurrency::new(dec!(300), CurrencyCode::new("USD"));
        variables.clearance.warehousing = CostInCurrency::new(dec!(50), CurrencyCode::new("USD"));
        variables.taxes.utility_fee = dec!(25);
        variables.fx.rates.insert(CurrencyCode::new("EUR"), dec!(1.1));

        let pool = logistics_pool(&variables).expect("phase 2");
        assert_eq!(pool, dec!(500) + dec!(220) + dec!(300) + dec!(50) + dec!(25));
    }

    #[test]
    fn missing_leg_currency_rate_names_the_leg() {
        let mut variables = quote_variables();
        variables.logistics.hub_to_border =
            CostInCurrency::new(dec!(200), CurrencyCode::new("CNY"));
        let error = logistics_pool(&variables).unwrap_err();
        assert!(matches!(
            error,
            CalcError::InvalidInput { product_index: None, field: "hub_to_border", .. }
        ));
    }

    #[test]
    fn insurance_rounds_up_to_one_decimal() {
        // 24500 * 0.15% = 36.75 -> 36.8
        assert_eq!(insurance_total(dec!(24500), dec!(0.15)), dec!(36.8));
        assert_eq!(insurance_total(dec!(24000), dec!(0.15)), dec!(36.0));
    }

    #[test]
    fn insurance_on_combined_value_differs_from_per_product_sums() {
        // One pool over the combined value, not N pools over the parts:
        // the ceiling makes the difference observable.
        let combined = insurance_total(dec!(1900), dec!(0.13));
        assert_eq!(combined, dec!(2.5));
        let per_product = insurance_total(dec!(950), dec!(0.13)) * dec!(2);
        assert_eq!(per_product, dec!(2.6));
        assert!(per_product > combined);
    }
}
