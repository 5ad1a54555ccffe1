//! Error taxonomy for the inference core
//!
//! Every fallible core operation returns [`InferenceError`]. Nothing is turned
//! into a NaN or a default value on the way up; callers decide how to isolate
//! a failure (see `study::run_study`).

use thiserror::Error;

/// Errors raised by the filter engine, statistics, intervals and tests
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Referenced column is absent or has the wrong logical type
    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Insufficient sample for {operation}: need at least {required} values, got {actual}")]
    InsufficientSample {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    /// A quantity that must be non-zero (usually a variance) is zero
    #[error("Degenerate sample: {0}")]
    DegenerateSample(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Formula undefined for the given inputs (zero denominator, negative radicand)
    #[error("Numeric domain error: {0}")]
    NumericDomain(String),
}

pub type Result<T> = std::result::Result<T, InferenceError>;

impl InferenceError {
    pub(crate) fn insufficient(operation: &'static str, required: usize, actual: usize) -> Self {
        Self::InsufficientSample {
            operation,
            required,
            actual,
        }
    }
}

/// Validate a probability-like parameter that must lie strictly inside (0, 1)
pub(crate) fn check_open_unit(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(InferenceError::InvalidParameter(format!("{name} must be in (0, 1), got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_sample_message() {
        let err = InferenceError::insufficient("variance", 2, 1);
        assert_eq!(
            err.to_string(),
            "Insufficient sample for variance: need at least 2 values, got 1"
        );
    }

    #[test]
    fn test_check_open_unit_bounds() {
        assert_eq!(check_open_unit("alpha", 0.05).unwrap(), 0.05);
        assert!(check_open_unit("alpha", 0.0).is_err());
        assert!(check_open_unit("alpha", 1.0).is_err());
        assert!(check_open_unit("alpha", f64::NAN).is_err());
        assert!(check_open_unit("alpha", -0.5).is_err());
    }
}
