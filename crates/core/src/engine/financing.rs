use rust_decimal::Decimal;

use crate::domain::product::ProductLine;
use crate::domain::variables::QuoteVariables;
use crate::errors::CalcError;
use crate::numeric::{accrued_interest, pct};
use crate::resolve::resolve;

/// Phases 5–9 output, all quote-level. Allocation back to lines happens by
/// distribution share in the orchestrator.
#[derive(Clone, Debug, PartialEq)]
pub struct FinancingBreakdown {
    /// Supplier balance still owed after advances (phase 5).
    pub supplier_balance: Decimal,
    /// Balance marked up by the financing commission (phase 5).
    pub financed_base: Decimal,
    /// Client-side money base for credit and forex exposure (phase 6).
    pub revenue_estimate: Decimal,
    /// Days the financed base is held before the client's money arrives.
    pub holding_days: u32,
    /// Compound interest on the financed base over the holding period
    /// (phase 7).
    pub supplier_financing_cost: Decimal,
    /// Unpaid client balance carried past delivery (phase 8).
    pub client_credit_balance: Decimal,
    /// Compound interest on the unpaid client balance (phase 9).
    pub credit_interest_cost: Decimal,
}

/// Phases 5–9: cost of capital tied up in paying the supplier before the
/// client pays, and in extending credit to the client past delivery.
///
/// A 100 % supplier advance leaves no balance and therefore no financing
/// gap: the cost is zero, not an error. Likewise a 100 % client advance
/// leaves no milestones and no credit interest.
pub fn financing(
    lines: &[ProductLine],
    purchase_totals: &[Decimal],
    total_internal_sale_value: Decimal,
    variables: &QuoteVariables,
) -> Result<FinancingBreakdown, CalcError> {
    let daily_rate = variables.daily_interest_rate();

    // Phase 5: supplier balance, per line so advance overrides apply, then
    // pooled. The financing commission marks the borrowed amount up.
    let mut supplier_balance = Decimal::ZERO;
    for (line, purchase_total) in lines.iter().zip(purchase_totals) {
        let advance_pct = resolve(
            line.overrides.advance_to_supplier_pct,
            variables.payment.advance_to_supplier_pct,
        );
        supplier_balance += purchase_total * (Decimal::ONE - pct(advance_pct));
    }
    let financed_base =
        supplier_balance * (Decimal::ONE + pct(variables.admin.financing_commission_pct));

    // Phase 6: evaluated revenue, the base the client still owes against.
    let revenue_estimate =
        total_internal_sale_value * (Decimal::ONE + pct(variables.financial.markup_pct));

    // Phase 7: the balance is due when the goods land; the client's
    // matching payment only clears once customs and logistics settlement
    // completes.
    let holding_days = variables.logistics.delivery_days
        + variables.admin.supplier_balance_due_days
        + variables.admin.customs_payment_due_days;
    let supplier_financing_cost = accrued_interest(financed_base, daily_rate, holding_days)
        .ok_or_else(|| {
            CalcError::invalid_input(
                None,
                "annual_interest_pct",
                format!("future value overflows over {holding_days} days"),
            )
        })?;

    // Phases 8–9: every milestone that lands after delivery is credit
    // extended to the client; each accrues over its own gap.
    let mut client_credit_balance = Decimal::ZERO;
    let mut credit_interest_cost = Decimal::ZERO;
    for milestone in &variables.payment.client_milestones {
        if milestone.days_after_delivery == 0 || milestone.pct.is_zero() {
            continue;
        }
        let balance = revenue_estimate * pct(milestone.pct);
        client_credit_balance += balance;
        credit_interest_cost += accrued_interest(balance, daily_rate, milestone.days_after_delivery)
            .ok_or_else(|| {
                CalcError::invalid_input(
                    None,
                    "client_milestones",
                    format!(
                        "future value overflows over {} days",
                        milestone.days_after_delivery
                    ),
                )
            })?;
    }

    Ok(FinancingBreakdown {
        supplier_balance,
        financed_base,
        revenue_estimate,
        holding_days,
        supplier_financing_cost,
        client_credit_balance,
        credit_interest_cost,
    })
}
