pub mod domain;
pub mod engine;
pub mod errors;
pub mod numeric;
pub mod rates;
pub mod resolve;

pub use domain::money::{CostInCurrency, CurrencyCode, ExchangeRates};
pub use domain::product::{LineOverrides, ProductLine};
pub use domain::variables::{
    AdminSettings, ClearanceCosts, CompanyTerms, DmFee, ExciseBasis, ExciseTerms,
    FinancialTerms, Incoterms, LogisticsTerms, PaymentMilestone, PaymentTerms, QuoteHeader,
    QuoteVariables, SaleType, SellerRegion, TaxTerms,
};
pub use engine::outcome::{
    CalculationOutcome, CalculationTrace, LineBreakdown, QuoteTotals, TraceStep,
};
pub use engine::{
    calculate_quote, validate_input, CalculationInput, DeterministicCalculator, Phase,
    QuoteCalculator,
};
pub use errors::CalcError;
pub use rates::{CountryProfile, RateBook};
