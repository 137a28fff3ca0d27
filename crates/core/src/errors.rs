use thiserror::Error;

use crate::engine::Phase;

/// Engine-level failure taxonomy. Every error is raised at the point of
/// detection; the engine never returns partial results and never clamps an
/// invalid value.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    #[error("invalid input in field `{field}`{}: {reason}", display_line(.product_index))]
    InvalidInput { product_index: Option<usize>, field: &'static str, reason: String },
    #[error("distribution base is undefined: total purchase value across all products is zero")]
    DistributionUndefined,
    #[error("negative `{field}` produced in {phase} for product {product_index}")]
    NegativeResult { phase: Phase, product_index: usize, field: &'static str },
    #[error("unsupported configuration: {what}")]
    UnsupportedConfiguration { what: String },
}

impl CalcError {
    pub fn invalid_input(
        product_index: Option<usize>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput { product_index, field, reason: reason.into() }
    }

    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration { what: what.into() }
    }

    /// Stable class label for machine-readable output at the calling layer.
    pub fn class(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::DistributionUndefined => "distribution_undefined",
            Self::NegativeResult { .. } => "negative_result",
            Self::UnsupportedConfiguration { .. } => "unsupported_configuration",
        }
    }
}

fn display_line(product_index: &Option<usize>) -> String {
    match product_index {
        Some(index) => format!(" of product {index}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Phase;

    use super::CalcError;

    #[test]
    fn invalid_input_names_product_and_field() {
        let error = CalcError::invalid_input(Some(2), "quantity", "must be greater than zero");
        assert_eq!(
            error.to_string(),
            "invalid input in field `quantity` of product 2: must be greater than zero"
        );
        assert_eq!(error.class(), "invalid_input");
    }

    #[test]
    fn quote_level_invalid_input_omits_product_suffix() {
        let error = CalcError::invalid_input(None, "markup_pct", "must be non-negative");
        assert_eq!(
            error.to_string(),
            "invalid input in field `markup_pct`: must be non-negative"
        );
    }

    #[test]
    fn negative_result_names_phase() {
        let error =
            CalcError::NegativeResult { phase: Phase::Cogs, product_index: 0, field: "cogs" };
        assert!(error.to_string().contains("phase 10"));
        assert_eq!(error.class(), "negative_result");
    }
}
