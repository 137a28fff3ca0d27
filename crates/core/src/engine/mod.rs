pub mod distribution;
pub mod duties;
pub mod financing;
pub mod logistics;
pub mod outcome;
pub mod pricing;
pub mod purchase;

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{LineOverrides, ProductLine};
use crate::domain::variables::{DmFee, QuoteHeader, QuoteVariables};
use crate::errors::CalcError;
use crate::numeric::{pct, round_money};
use crate::rates::RateBook;

use self::outcome::{
    CalculationOutcome, CalculationTrace, LineBreakdown, QuoteTotals, TraceStep,
};

/// The thirteen ordered phases of the pipeline. Used in error reporting and
/// the quote-level trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    PurchasePrice,
    Logistics,
    Insurance,
    InternalPricing,
    SupplierPaymentPlan,
    RevenueEstimate,
    SupplierFinancing,
    ClientCredit,
    CreditInterest,
    Cogs,
    SalePrice,
    Vat,
    TransitCommission,
}

impl Phase {
    pub fn number(self) -> u8 {
        match self {
            Self::PurchasePrice => 1,
            Self::Logistics => 2,
            Self::Insurance => 3,
            Self::InternalPricing => 4,
            Self::SupplierPaymentPlan => 5,
            Self::RevenueEstimate => 6,
            Self::SupplierFinancing => 7,
            Self::ClientCredit => 8,
            Self::CreditInterest => 9,
            Self::Cogs => 10,
            Self::SalePrice => 11,
            Self::Vat => 12,
            Self::TransitCommission => 13,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PurchasePrice => "purchase price",
            Self::Logistics => "logistics",
            Self::Insurance => "insurance",
            Self::InternalPricing => "internal pricing and duties",
            Self::SupplierPaymentPlan => "supplier payment plan",
            Self::RevenueEstimate => "revenue estimate",
            Self::SupplierFinancing => "supplier financing",
            Self::ClientCredit => "client credit",
            Self::CreditInterest => "credit interest",
            Self::Cogs => "cost of goods sold",
            Self::SalePrice => "sale price",
            Self::Vat => "vat",
            Self::TransitCommission => "transit commission",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "phase {} ({})", self.number(), self.label())
    }
}

/// Read-only input owned by the caller. The engine borrows it for the
/// duration of one run and returns everything by value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub header: QuoteHeader,
    pub lines: Vec<ProductLine>,
    pub variables: QuoteVariables,
}

pub trait QuoteCalculator: Send + Sync {
    fn calculate(&self, input: &CalculationInput) -> Result<CalculationOutcome, CalcError>;
}

/// The production calculator: a pure function of its input and the
/// injected rate book. Safe to share across request handlers.
pub struct DeterministicCalculator {
    rate_book: RateBook,
}

impl DeterministicCalculator {
    pub fn new(rate_book: RateBook) -> Self {
        Self { rate_book }
    }

    pub fn rate_book(&self) -> &RateBook {
        &self.rate_book
    }
}

impl Default for DeterministicCalculator {
    fn default() -> Self {
        Self::new(RateBook::default())
    }
}

impl QuoteCalculator for DeterministicCalculator {
    fn calculate(&self, input: &CalculationInput) -> Result<CalculationOutcome, CalcError> {
        calculate_quote(input, &self.rate_book)
    }
}

/// Runs the full pipeline: phase 1 and the distribution base first, then
/// the quote-level pools, then per-line final pricing consuming the
/// allocations.
pub fn calculate_quote(
    input: &CalculationInput,
    rates: &RateBook,
) -> Result<CalculationOutcome, CalcError> {
    validate_input(input)?;
    let variables = &input.variables;
    let region = variables.company.seller_region;

    // Phase 1: per-line purchase prices, then the quote pool they form.
    let purchases = input
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| purchase::purchase_price(index, line, variables, rates))
        .collect::<Result<Vec<_>, _>>()?;
    let purchase_totals: Vec<Decimal> =
        purchases.iter().map(|p| p.total_purchase_price).collect();
    let total_purchase_value: Decimal = purchase_totals.iter().copied().sum();

    let shares = distribution::distribution_base(&purchase_totals)?;

    // Phase 2.
    let logistics_pool = logistics::logistics_pool(variables)?;

    // Internal sale values feed both the insurance basis and phase 4.
    let internal_values: Vec<Decimal> = input
        .lines
        .iter()
        .zip(&purchase_totals)
        .map(|(line, total)| {
            duties::internal_sale_price(
                *total,
                rates.internal_markup_pct(&line.supplier_country, region),
            )
        })
        .collect();
    let total_internal_sale_value: Decimal = internal_values.iter().copied().sum();

    // Phase 3.
    let insurance = logistics::insurance_total(
        total_internal_sale_value,
        variables.logistics.insurance_rate_pct,
    );

    // Phase 4.
    let duty_lines = input
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            duties::duty_breakdown(
                index,
                line,
                purchase_totals[index],
                internal_values[index],
                variables,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Phases 5–9.
    let financing = financing::financing(
        &input.lines,
        &purchase_totals,
        total_internal_sale_value,
        variables,
    )?;

    // Phases 10–13 per line, consuming the quote-level allocations.
    let mut lines_out = Vec::with_capacity(input.lines.len());
    let mut total_cogs = Decimal::ZERO;
    let mut total_profit = Decimal::ZERO;
    let mut total_excl_vat = Decimal::ZERO;
    let mut total_incl_vat = Decimal::ZERO;
    let mut total_net_vat = Decimal::ZERO;
    for (index, line) in input.lines.iter().enumerate() {
        let allocations = pricing::LineAllocations {
            distribution_share: shares[index],
            logistics: logistics_pool * shares[index],
            insurance: insurance * shares[index],
            financing: financing.supplier_financing_cost * shares[index],
            credit_interest: financing.credit_interest_cost * shares[index],
        };
        let sale = pricing::final_pricing(
            index,
            line,
            &purchases[index],
            &duty_lines[index],
            &allocations,
            financing.revenue_estimate,
            variables,
            rates,
        )?;

        total_cogs += sale.cogs;
        total_profit += sale.profit;
        total_excl_vat += sale.total_excl_vat;
        total_incl_vat += sale.total_incl_vat;
        total_net_vat += sale.net_vat_payable;

        lines_out.push(assemble_line(line, &purchases[index], &duty_lines[index], &allocations, &sale));
    }

    let total_forex_reserve = financing.revenue_estimate * pct(variables.admin.forex_risk_pct);
    let profit_margin_pct = if total_cogs.is_zero() {
        Decimal::ZERO
    } else {
        total_profit / total_cogs * Decimal::ONE_HUNDRED
    };

    let totals = QuoteTotals {
        total_purchase_value: round_money(total_purchase_value),
        total_logistics: round_money(logistics_pool),
        total_insurance: insurance,
        revenue_estimate: round_money(financing.revenue_estimate),
        total_financing_cost: round_money(financing.supplier_financing_cost),
        total_credit_interest: round_money(financing.credit_interest_cost),
        total_forex_reserve: round_money(total_forex_reserve),
        total_cogs: round_money(total_cogs),
        total_excl_vat: round_money(total_excl_vat),
        total_incl_vat: round_money(total_incl_vat),
        total_net_vat_payable: round_money(total_net_vat),
        total_profit: round_money(total_profit),
        profit_margin_pct: round_money(profit_margin_pct),
    };

    let trace = CalculationTrace {
        quote_id: input.header.quote_id.clone(),
        currency: variables.financial.quote_currency.clone(),
        steps: vec![
            step(Phase::PurchasePrice, "sum of line purchase totals", total_purchase_value),
            step(Phase::Logistics, "delivery legs + clearance + utility fee", logistics_pool),
            step(Phase::Insurance, "ceiling of internal sale value x insurance rate", insurance),
            step(
                Phase::InternalPricing,
                "sum of internal sale prices",
                total_internal_sale_value,
            ),
            step(
                Phase::SupplierPaymentPlan,
                "supplier balance x (1 + financing commission)",
                financing.financed_base,
            ),
            step(
                Phase::RevenueEstimate,
                "internal sale value x (1 + markup)",
                financing.revenue_estimate,
            ),
            step(
                Phase::SupplierFinancing,
                "compound interest over the holding period",
                financing.supplier_financing_cost,
            ),
            step(
                Phase::ClientCredit,
                "milestone balances carried past delivery",
                financing.client_credit_balance,
            ),
            step(
                Phase::CreditInterest,
                "compound interest per milestone",
                financing.credit_interest_cost,
            ),
        ],
    };

    Ok(CalculationOutcome {
        header: input.header.clone(),
        currency: variables.financial.quote_currency.clone(),
        lines: lines_out,
        totals,
        trace,
    })
}

fn step(phase: Phase, detail: &str, amount: Decimal) -> TraceStep {
    TraceStep { phase, detail: detail.to_string(), amount: round_money(amount) }
}

fn assemble_line(
    line: &ProductLine,
    purchase: &purchase::PurchaseBreakdown,
    duty: &duties::DutyBreakdown,
    allocations: &pricing::LineAllocations,
    sale: &pricing::SaleBreakdown,
) -> LineBreakdown {
    LineBreakdown {
        name: line.name.clone(),
        quantity: line.quantity,
        unit_price_net_of_vat: round_money(purchase.unit_price_net_of_vat),
        unit_price_discounted: round_money(purchase.unit_price_discounted),
        unit_price_converted: round_money(purchase.unit_price_converted),
        total_purchase_price: round_money(purchase.total_purchase_price),
        distribution_share: allocations.distribution_share,
        logistics_allocated: round_money(allocations.logistics),
        insurance_allocated: round_money(allocations.insurance),
        internal_sale_price: round_money(duty.internal_sale_price),
        customs_duty: round_money(duty.customs_duty),
        excise_tax: round_money(duty.excise_tax),
        financing_allocated: round_money(allocations.financing),
        credit_interest_allocated: round_money(allocations.credit_interest),
        cogs: round_money(sale.cogs),
        profit: round_money(sale.profit),
        dm_fee: round_money(sale.dm_fee),
        forex_reserve: round_money(sale.forex_reserve),
        agent_fee: round_money(sale.agent_fee),
        price_per_unit_excl_vat: sale.price_per_unit_excl_vat,
        total_excl_vat: round_money(sale.total_excl_vat),
        price_per_unit_incl_vat: sale.price_per_unit_incl_vat,
        total_incl_vat: round_money(sale.total_incl_vat),
        sales_vat: round_money(sale.sales_vat),
        import_vat_deductible: round_money(sale.import_vat_deductible),
        net_vat_payable: round_money(sale.net_vat_payable),
        transit_commission: round_money(sale.transit_commission),
        profit_margin_pct: round_money(sale.profit_margin_pct),
    }
}

/// Input validation, also exposed so callers can pre-check a quote without
/// running the pipeline.
pub fn validate_input(input: &CalculationInput) -> Result<(), CalcError> {
    if input.lines.is_empty() {
        return Err(CalcError::invalid_input(
            None,
            "lines",
            "at least one product line is required",
        ));
    }

    for (position, line) in input.lines.iter().enumerate() {
        let index = Some(position);
        if line.quantity <= Decimal::ZERO {
            return Err(CalcError::invalid_input(
                index,
                "quantity",
                "must be greater than zero",
            ));
        }
        ensure_non_negative(index, "unit_price", line.unit_price)?;
        ensure_non_negative(index, "weight_kg", line.weight_kg)?;
        validate_overrides(position, &line.overrides)?;
    }

    let variables = &input.variables;
    ensure_non_negative(None, "markup_pct", variables.financial.markup_pct)?;
    ensure_pct_range(None, "discount_pct", variables.financial.discount_pct)?;
    ensure_non_negative(None, "agent_fee_pct", variables.financial.agent_fee_pct)?;
    match &variables.financial.dm_fee {
        DmFee::Fixed(amount) => ensure_non_negative(None, "dm_fee", *amount)?,
        DmFee::PercentOfCogs(rate) => ensure_non_negative(None, "dm_fee", *rate)?,
    }

    ensure_non_negative(None, "supplier_to_hub", variables.logistics.supplier_to_hub.amount)?;
    ensure_non_negative(None, "hub_to_border", variables.logistics.hub_to_border.amount)?;
    ensure_non_negative(None, "border_to_client", variables.logistics.border_to_client.amount)?;
    ensure_non_negative(None, "insurance_rate_pct", variables.logistics.insurance_rate_pct)?;

    ensure_pct_range(None, "advance_from_client_pct", variables.payment.advance_from_client_pct)?;
    ensure_pct_range(None, "advance_to_supplier_pct", variables.payment.advance_to_supplier_pct)?;
    for milestone in &variables.payment.client_milestones {
        ensure_pct_range(None, "client_milestones", milestone.pct)?;
    }

    for (field, cost) in variables.clearance.iter() {
        if cost.amount < Decimal::ZERO {
            return Err(CalcError::invalid_input(None, field, "must be non-negative"));
        }
    }
    ensure_non_negative(None, "import_tariff_pct", variables.taxes.import_tariff_pct)?;
    ensure_non_negative(None, "excise_rate", variables.taxes.excise.rate)?;
    ensure_non_negative(None, "utility_fee", variables.taxes.utility_fee)?;

    ensure_non_negative(None, "forex_risk_pct", variables.admin.forex_risk_pct)?;
    ensure_non_negative(
        None,
        "financing_commission_pct",
        variables.admin.financing_commission_pct,
    )?;
    ensure_non_negative(None, "annual_interest_pct", variables.admin.annual_interest_pct)?;
    if let Some(daily) = variables.admin.daily_interest_pct {
        ensure_non_negative(None, "daily_interest_pct", daily)?;
    }

    for (currency, rate) in &variables.fx.rates {
        if *rate <= Decimal::ZERO {
            return Err(CalcError::invalid_input(
                None,
                "exchange_rate",
                format!("rate for `{currency}` must be positive"),
            ));
        }
    }

    Ok(())
}

fn validate_overrides(position: usize, overrides: &LineOverrides) -> Result<(), CalcError> {
    let index = Some(position);
    if let Some(discount) = overrides.discount_pct {
        ensure_pct_range(index, "discount_pct", discount)?;
    }
    if let Some(markup) = overrides.markup_pct {
        ensure_non_negative(index, "markup_pct", markup)?;
    }
    if let Some(tariff) = overrides.import_tariff_pct {
        ensure_non_negative(index, "import_tariff_pct", tariff)?;
    }
    if let Some(excise) = overrides.excise_rate {
        ensure_non_negative(index, "excise_rate", excise)?;
    }
    if let Some(advance) = overrides.advance_to_supplier_pct {
        ensure_pct_range(index, "advance_to_supplier_pct", advance)?;
    }
    if let Some(rate) = overrides.exchange_rate {
        if rate <= Decimal::ZERO {
            return Err(CalcError::invalid_input(index, "exchange_rate", "must be positive"));
        }
    }
    Ok(())
}

fn ensure_non_negative(
    product_index: Option<usize>,
    field: &'static str,
    value: Decimal,
) -> Result<(), CalcError> {
    if value < Decimal::ZERO {
        return Err(CalcError::invalid_input(product_index, field, "must be non-negative"));
    }
    Ok(())
}

fn ensure_pct_range(
    product_index: Option<usize>,
    field: &'static str,
    value: Decimal,
) -> Result<(), CalcError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(CalcError::invalid_input(
            product_index,
            field,
            "must be between 0 and 100",
        ));
    }
    Ok(())
}
