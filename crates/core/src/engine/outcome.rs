use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money::CurrencyCode;
use crate::domain::variables::QuoteHeader;
use crate::engine::Phase;

/// Every named intermediate and final value for one product line, in the
/// quote currency. Field names replace the legacy spreadsheet coordinates;
/// the computation graph behind them is unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineBreakdown {
    pub name: String,
    pub quantity: Decimal,
    pub unit_price_net_of_vat: Decimal,
    pub unit_price_discounted: Decimal,
    pub unit_price_converted: Decimal,
    pub total_purchase_price: Decimal,
    /// This line's fraction of the quote's purchase value, unrounded.
    pub distribution_share: Decimal,
    pub logistics_allocated: Decimal,
    pub insurance_allocated: Decimal,
    pub internal_sale_price: Decimal,
    pub customs_duty: Decimal,
    pub excise_tax: Decimal,
    pub financing_allocated: Decimal,
    pub credit_interest_allocated: Decimal,
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

/// Quote-level pooled values, computed once regardless of line count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub total_purchase_value: Decimal,
    pub total_logistics: Decimal,
    pub total_insurance: Decimal,
    pub revenue_estimate: Decimal,
    pub total_financing_cost: Decimal,
    pub total_credit_interest: Decimal,
    pub total_forex_reserve: Decimal,
    pub total_cogs: Decimal,
    pub total_excl_vat: Decimal,
    pub total_incl_vat: Decimal,
    pub total_net_vat_payable: Decimal,
    pub total_profit: Decimal,
    pub profit_margin_pct: Decimal,
}

/// One audited quote-level step of the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    pub phase: Phase,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationTrace {
    pub quote_id: String,
    pub currency: CurrencyCode,
    pub steps: Vec<TraceStep>,
}

/// The engine's complete output, returned by value. No engine state
/// survives between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutcome {
    pub header: QuoteHeader,
    pub currency: CurrencyCode,
    pub lines: Vec<LineBreakdown>,
    pub totals: QuoteTotals,
    pub trace: CalculationTrace,
}
