use rust_decimal::Decimal;

use crate::domain::product::ProductLine;
use crate::domain::variables::{DmFee, Incoterms, QuoteVariables, SaleType, SellerRegion};
use crate::engine::duties::DutyBreakdown;
use crate::engine::purchase::PurchaseBreakdown;
use crate::engine::Phase;
use crate::errors::CalcError;
use crate::numeric::{pct, round_money};
use crate::rates::RateBook;
use crate::resolve::resolve;

/// Quote-level pools allocated to one line by its distribution share.
#[derive(Clone, Debug, PartialEq)]
pub struct LineAllocations {
    pub distribution_share: Decimal,
    pub logistics: Decimal,
    pub insurance: Decimal,
    pub financing: Decimal,
    pub credit_interest: Decimal,
}

/// Phases 10–13 output for one line.
#[derive(Clone, Debug, PartialEq)]
pub struct SaleBreakdown {
    pub cogs: Decimal,
    pub profit: Decimal,
    pub dm_fee: Decimal,
    pub forex_reserve: Decimal,
    pub agent_fee: Decimal,
    pub price_per_unit_excl_vat: Decimal,
    pub total_excl_vat: Decimal,
    pub price_per_unit_incl_vat: Decimal,
    pub total_incl_vat: Decimal,
    pub sales_vat: Decimal,
    pub import_vat_deductible: Decimal,
    pub net_vat_payable: Decimal,
    pub transit_commission: Decimal,
    pub profit_margin_pct: Decimal,
}

/// Phases 10–13: COGS, sale price, VAT and the transit commission for one
/// line, consuming the quote-level allocations.
pub fn final_pricing(
    index: usize,
    line: &ProductLine,
    purchase: &PurchaseBreakdown,
    duty: &DutyBreakdown,
    allocations: &LineAllocations,
    revenue_estimate: Decimal,
    variables: &QuoteVariables,
    rates: &RateBook,
) -> Result<SaleBreakdown, CalcError> {
    let sale_type = variables.company.sale_type;
    let seller_region = variables.company.seller_region;

    // Phase 10: landed cost of the line, pooled costs included.
    let cogs = purchase.total_purchase_price
        + allocations.logistics
        + allocations.insurance
        + duty.customs_duty
        + duty.excise_tax
        + allocations.financing
        + allocations.credit_interest;
    if cogs < Decimal::ZERO {
        return Err(CalcError::NegativeResult {
            phase: Phase::Cogs,
            product_index: index,
            field: "cogs",
        });
    }

    // Phase 11: margin and fee stack on top of COGS.
    let markup_pct = resolve(line.overrides.markup_pct, variables.financial.markup_pct);
    let profit = cogs * pct(markup_pct);

    let dm_fee = match &variables.financial.dm_fee {
        DmFee::Fixed(amount) => *amount * allocations.distribution_share,
        DmFee::PercentOfCogs(rate) => cogs * pct(*rate),
    };

    let forex_reserve =
        revenue_estimate * pct(variables.admin.forex_risk_pct) * allocations.distribution_share;

    // The financial agent is not involved when the seller exports or sits
    // in the Turkish region.
    let agent_fee = if sale_type == SaleType::Export || seller_region == SellerRegion::Turkey {
        Decimal::ZERO
    } else {
        cogs * pct(variables.financial.agent_fee_pct)
    };

    let price_per_unit_excl_vat =
        round_money((cogs + profit + dm_fee + forex_reserve + agent_fee) / line.quantity);
    if price_per_unit_excl_vat < Decimal::ZERO {
        return Err(CalcError::NegativeResult {
            phase: Phase::SalePrice,
            product_index: index,
            field: "price_per_unit_excl_vat",
        });
    }
    let total_excl_vat = price_per_unit_excl_vat * line.quantity;

    // Phase 12: the DDP gross-up applies the Russian VAT rate to the
    // client-facing price; import VAT paid at the border is deductible
    // against it. Exports and non-DDP terms carry no VAT.
    let ddp_domestic =
        variables.logistics.incoterms == Incoterms::Ddp && sale_type != SaleType::Export;
    let (price_per_unit_incl_vat, total_incl_vat, sales_vat, import_vat_deductible) =
        if ddp_domestic {
            let vat_pct = rates.vat_pct(SellerRegion::Russia.country_key())?;
            let per_unit = round_money(price_per_unit_excl_vat * (Decimal::ONE + pct(vat_pct)));
            let total = per_unit * line.quantity;
            let sales_vat = total - total_excl_vat;
            let import_vat =
                (duty.internal_sale_price + duty.customs_duty + duty.excise_tax) * pct(vat_pct);
            (per_unit, total, sales_vat, import_vat)
        } else {
            (price_per_unit_excl_vat, total_excl_vat, Decimal::ZERO, Decimal::ZERO)
        };
    let net_vat_payable = sales_vat - import_vat_deductible;

    // Phase 13: only transit sales carry the pass-through commission.
    let transit_commission = if sale_type == SaleType::Transit {
        profit + dm_fee + forex_reserve + agent_fee + allocations.financing
            + allocations.credit_interest
    } else {
        Decimal::ZERO
    };

    let profit_margin_pct = if cogs.is_zero() {
        Decimal::ZERO
    } else {
        profit / cogs * Decimal::ONE_HUNDRED
    };

    Ok(SaleBreakdown {
        cogs,
        profit,
        dm_fee,
        forex_reserve,
        agent_fee,
        price_per_unit_excl_vat,
        total_excl_vat,
        price_per_unit_incl_vat,
        total_incl_vat,
        sales_vat,
        import_vat_deductible,
        net_vat_payable,
        transit_commission,
        profit_margin_pct,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::domain::variables::{DmFee, Incoterms, SaleType, SellerRegion};
    use crate::engine::duties::DutyBreakdown;
    use crate::engine::purchase::PurchaseBreakdown;
    use crate::engine::test_support::{product_line, quote_variables};
    use crate::rates::RateBook;

    use super::{final_pricing, LineAllocations, SaleBreakdown};

    fn purchase(total: Decimal) -> PurchaseBreakdown {
        PurchaseBreakdown {
            unit_price_net_of_vat: total,
            unit_price_discounted: total,
            unit_price_converted: total,
            total_purchase_price: total,
        }
    }

    fn no_duty() -> DutyBreakdown {
        DutyBreakdown {
            internal_sale_price: dec!(1050),
            customs_duty: Decimal::ZERO,
            excise_tax: Decimal::ZERO,
        }
    }

    fn whole_quote_allocations() -> LineAllocations {
        LineAllocations {
            distribution_share: Decimal::ONE,
            logistics: Decimal::ZERO,
            insurance: Decimal::ZERO,
            financing: Decimal::ZERO,
            credit_interest: Decimal::ZERO,
        }
    }

    fn run(
        variables: &crate::domain::variables::QuoteVariables,
        allocations: &LineAllocations,
    ) -> SaleBreakdown {
        let line = product_line("pump", dec!(1200), dec!(10));
        final_pricing(
            0,
            &line,
            &purchase(dec!(1000)),
            &no_duty(),
            allocations,
            dec!(1207.5),
            variables,
            &RateBook::default(),
        )
        .expect("phases 10-13")
    }

    #[test]
    fn profit_margin_equals_the_markup_rate() {
        let mut variables = quote_variables();
        variables.financial.markup_pct = dec!(15);
        let sale = run(&variables, &whole_quote_allocations());
        assert_eq!(sale.profit, dec!(150.00));
        assert_eq!(sale.profit_margin_pct, dec!(15));
    }

    #[test]
    fn non_ddp_sale_carries_no_vat() {
        let variables = quote_variables();
        let sale = run(&variables, &whole_quote_allocations());
        assert_eq!(sale.total_incl_vat, sale.total_excl_vat);
        assert_eq!(sale.sales_vat, Decimal::ZERO);
        assert_eq!(sale.net_vat_payable, Decimal::ZERO);
    }

    #[test]
    fn ddp_grosses_up_by_russian_vat_and_deducts_import_vat() {
        let mut variables = quote_variables();
        variables.financial.markup_pct = dec!(15);
        variables.logistics.incoterms = Incoterms::Ddp;
        variables.taxes.import_tariff_pct = Decimal::ZERO;
        let sale = run(&variables, &whole_quote_allocations());

        // 1150 excl -> 115.00/unit, 138.00/unit incl at 20%
        assert_eq!(sale.price_per_unit_excl_vat, dec!(115.00));
        assert_eq!(sale.price_per_unit_incl_vat, dec!(138.00));
        assert_eq!(sale.sales_vat, dec!(230.00));
        // (1050 + 0 + 0) * 20%
        assert_eq!(sale.import_vat_deductible, dec!(210.0));
        assert_eq!(sale.net_vat_payable, dec!(20.00));
    }

    #[test]
    fn export_sale_skips_the_gross_up_even_under_ddp() {
        let mut variables = quote_variables();
        variables.logistics.incoterms = Incoterms::Ddp;
        variables.company.sale_type = SaleType::Export;
        let sale = run(&variables, &whole_quote_allocations());
        assert_eq!(sale.total_incl_vat, sale.total_excl_vat);
        assert_eq!(sale.import_vat_deductible, Decimal::ZERO);
    }

    #[test]
    fn agent_fee_waived_for_exports_and_turkish_sellers() {
        let mut variables = quote_variables();
        variables.financial.agent_fee_pct = dec!(1);
        let sale = run(&variables, &whole_quote_allocations());
        assert_eq!(sale.agent_fee, dec!(10.00));

        variables.company.sale_type = SaleType::Export;
        let sale = run(&variables, &whole_quote_allocations());
        assert_eq!(sale.agent_fee, Decimal::ZERO);

        variables.company.sale_type = SaleType::Supply;
        variables.company.seller_region = SellerRegion::Turkey;
        let sale = run(&variables, &whole_quote_allocations());
        assert_eq!(sale.agent_fee, Decimal::ZERO);
    }

    #[test]
    fn fixed_dm_fee_follows_the_distribution_share() {
        let mut variables = quote_variables();
        variables.financial.dm_fee = DmFee::Fixed(dec!(200));
        let mut allocations = whole_quote_allocations();
        allocations.distribution_share = dec!(0.25);
        let sale = run(&variables, &allocations);
        assert_eq!(sale.dm_fee, dec!(50.00));

        variables.financial.dm_fee = DmFee::PercentOfCogs(dec!(2));
        let sale = run(&variables, &allocations);
        assert_eq!(sale.dm_fee, dec!(20.00));
    }

    #[test]
    fn transit_commission_is_exact_fee_stack_for_transit_only() {
        let mut variables = quote_variables();
        variables.financial.markup_pct = dec!(15);
        variables.financial.dm_fee = DmFee::Fixed(dec!(80));
        variables.admin.forex_risk_pct = dec!(2);
        let mut allocations = whole_quote_allocations();
        allocations.financing = dec!(120);
        allocations.credit_interest = dec!(30);

        let sale = run(&variables, &allocations);
        assert_eq!(sale.transit_commission, Decimal::ZERO);

        variables.company.sale_type = "транзит".parse().expect("legacy label");
        let sale = run(&variables, &allocations);
        let expected =
            sale.profit + sale.dm_fee + sale.forex_reserve + sale.agent_fee + dec!(150);
        assert_eq!(sale.transit_commission, expected);
        assert!(sale.transit_commission > Decimal::ZERO);
    }
}
