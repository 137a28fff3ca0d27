use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money::{CostInCurrency, CurrencyCode, ExchangeRates};
use crate::errors::CalcError;

/// Region of the selling entity. Drives duty forgiveness, agent-fee waiver
/// and the seller-side VAT lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerRegion {
    Russia,
    Turkey,
}

impl SellerRegion {
    /// Rate-book country key for the region's own VAT regime.
    pub fn country_key(self) -> &'static str {
        match self {
            Self::Russia => "russia",
            Self::Turkey => "turkey",
        }
    }
}

impl FromStr for SellerRegion {
    type Err = CalcError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "russia" => Ok(Self::Russia),
            "turkey" => Ok(Self::Turkey),
            other => Err(CalcError::unsupported(format!(
                "seller region `{other}` (expected russia|turkey)"
            ))),
        }
    }
}

/// Sale type. The legacy platform labels these in Russian; both the Russian
/// labels and the ASCII names parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SaleType {
    Supply,
    Transit,
    FinTransit,
    Export,
}

impl SaleType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Supply => "supply",
            Self::Transit => "transit",
            Self::FinTransit => "fin_transit",
            Self::Export => "export",
        }
    }
}

impl fmt::Display for SaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SaleType {
    type Err = CalcError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "supply" | "поставка" => Ok(Self::Supply),
            "transit" | "транзит" => Ok(Self::Transit),
            "fin_transit" | "fin-transit" | "фин.транзит" | "фин. транзит" => {
                Ok(Self::FinTransit)
            }
            "export" | "экспорт" => Ok(Self::Export),
            other => Err(CalcError::unsupported(format!(
                "sale type `{other}` (expected supply|transit|fin_transit|export)"
            ))),
        }
    }
}

impl TryFrom<String> for SaleType {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SaleType> for String {
    fn from(value: SaleType) -> Self {
        value.label().to_string()
    }
}

/// Delivery terms. The engine only branches on DDP, but the full set is
/// accepted so unrecognised values fail loudly instead of defaulting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Incoterms {
    Exw,
    Fca,
    Fob,
    Cif,
    Dap,
    Ddp,
}

impl Incoterms {
    pub fn label(self) -> &'static str {
        match self {
            Self::Exw => "EXW",
            Self::Fca => "FCA",
            Self::Fob => "FOB",
            Self::Cif => "CIF",
            Self::Dap => "DAP",
            Self::Ddp => "DDP",
        }
    }
}

impl fmt::Display for Incoterms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Incoterms {
    type Err = CalcError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EXW" => Ok(Self::Exw),
            "FCA" => Ok(Self::Fca),
            "FOB" => Ok(Self::Fob),
            "CIF" => Ok(Self::Cif),
            "DAP" => Ok(Self::Dap),
            "DDP" => Ok(Self::Ddp),
            other => Err(CalcError::unsupported(format!(
                "incoterms `{other}` (expected EXW|FCA|FOB|CIF|DAP|DDP)"
            ))),
        }
    }
}

impl TryFrom<String> for Incoterms {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Incoterms> for String {
    fn from(value: Incoterms) -> Self {
        value.label().to_string()
    }
}

/// Deal-maker fee: either a flat amount in quote currency (distributed
/// across lines by purchase share) or a percentage of each line's COGS.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DmFee {
    Fixed(Decimal),
    PercentOfCogs(Decimal),
}

impl Default for DmFee {
    fn default() -> Self {
        Self::Fixed(Decimal::ZERO)
    }
}

/// Excise accrual basis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExciseBasis {
    PerKilogram,
    PerUnit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExciseTerms {
    pub rate: Decimal,
    pub basis: ExciseBasis,
}

impl Default for ExciseTerms {
    fn default() -> Self {
        Self { rate: Decimal::ZERO, basis: ExciseBasis::PerKilogram }
    }
}

/// One balance payment expected from the client after delivery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentMilestone {
    /// Share of the revenue estimate, in [0, 100].
    pub pct: Decimal,
    pub days_after_delivery: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyTerms {
    pub seller_region: SellerRegion,
    pub sale_type: SaleType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialTerms {
    pub quote_currency: CurrencyCode,
    pub markup_pct: Decimal,
    #[serde(default)]
    pub discount_pct: Decimal,
    #[serde(default)]
    pub dm_fee: DmFee,
    /// Financial-agent commission on COGS. Waived for export sales and
    /// Turkish-region sellers.
    #[serde(default)]
    pub agent_fee_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticsTerms {
    pub incoterms: Incoterms,
    pub delivery_days: u32,
    pub supplier_to_hub: CostInCurrency,
    pub hub_to_border: CostInCurrency,
    pub border_to_client: CostInCurrency,
    #[serde(default)]
    pub insurance_rate_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub advance_from_client_pct: Decimal,
    pub advance_to_supplier_pct: Decimal,
    /// Balance schedule after the client advance. The engine does not check
    /// that advance + milestones sum to 100; that validation belongs to the
    /// calling layer.
    #[serde(default)]
    pub client_milestones: Vec<PaymentMilestone>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClearanceCosts {
    pub brokerage_at_hub: CostInCurrency,
    pub brokerage_at_customs: CostInCurrency,
    pub warehousing: CostInCurrency,
    pub documentation: CostInCurrency,
    pub extra: CostInCurrency,
}

impl ClearanceCosts {
    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            brokerage_at_hub: CostInCurrency::zero(currency.clone()),
            brokerage_at_customs: CostInCurrency::zero(currency.clone()),
            warehousing: CostInCurrency::zero(currency.clone()),
            documentation: CostInCurrency::zero(currency.clone()),
            extra: CostInCurrency::zero(currency),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CostInCurrency)> {
        [
            ("brokerage_at_hub", &self.brokerage_at_hub),
            ("brokerage_at_customs", &self.brokerage_at_customs),
            ("warehousing", &self.warehousing),
            ("documentation", &self.documentation),
            ("extra", &self.extra),
        ]
        .into_iter()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaxTerms {
    pub import_tariff_pct: Decimal,
    #[serde(default)]
    pub excise: ExciseTerms,
    /// Flat utility fee in quote currency, pooled with clearance costs.
    #[serde(default)]
    pub utility_fee: Decimal,
}

/// System constants editable only by administrators. Supplied as a separate
/// group so the calling layer can gate access before invoking the engine;
/// the engine itself enforces no authorization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminSettings {
    #[serde(default)]
    pub forex_risk_pct: Decimal,
    #[serde(default)]
    pub financing_commission_pct: Decimal,
    pub annual_interest_pct: Decimal,
    /// Direct override of the daily rate; when absent the annual rate is
    /// divided by 365.
    #[serde(default)]
    pub daily_interest_pct: Option<Decimal>,
    #[serde(default)]
    pub supplier_balance_due_days: u32,
    #[serde(default)]
    pub customs_payment_due_days: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteHeader {
    pub quote_id: String,
    pub prepared_on: NaiveDate,
}

/// Quote-level defaults and settings shared by all product lines unless a
/// line override says otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteVariables {
    pub company: CompanyTerms,
    pub financial: FinancialTerms,
    pub logistics: LogisticsTerms,
    pub payment: PaymentTerms,
    pub clearance: ClearanceCosts,
    pub taxes: TaxTerms,
    pub admin: AdminSettings,
    #[serde(default)]
    pub fx: ExchangeRates,
}

impl QuoteVariables {
    /// Effective daily interest rate as a fraction (not a percentage).
    pub fn daily_interest_rate(&self) -> Decimal {
        match self.admin.daily_interest_pct {
            Some(daily) => daily / Decimal::ONE_HUNDRED,
            None => {
                self.admin.annual_interest_pct / Decimal::ONE_HUNDRED / Decimal::from(365u32)
            }
        }
    }
}
