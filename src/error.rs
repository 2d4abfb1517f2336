// src/error.rs
use thiserror::Error;

/// Error types for the quantlab engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid configuration (counts, sizes)
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// A closed-form expression hit a singular point (σ√T = 0, log of a non-positive value)
    #[error("Numerical degeneracy in {method}: {reason}")]
    NumericalDegeneracy { method: String, reason: String },

    /// A simulated aggregate came out non-finite
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },

    /// Batch aborted by the caller before every path was started
    #[error("Simulation cancelled after {completed} of {requested} paths")]
    Cancelled { completed: usize, requested: usize },
}

/// Result type alias for quantlab operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Validation utilities
pub mod validation {
    use super::{EngineError, EngineResult};

    /// Largest batch a single call may request
    pub const MAX_PATHS: usize = 10_000_000;
    /// Largest time grid a single path may request
    pub const MAX_STEPS: usize = 100_000;

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> EngineResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(EngineError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> EngineResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(EngineError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is within a closed range
    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> EngineResult<()> {
        if !(min..=max).contains(&value) {
            Err(EngineError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate correlation parameter
    pub fn validate_correlation(name: &str, rho: f64) -> EngineResult<()> {
        validate_range(name, rho, -1.0, 1.0)
    }

    /// Validate a probability
    pub fn validate_probability(name: &str, p: f64) -> EngineResult<()> {
        validate_range(name, p, 0.0, 1.0)
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> EngineResult<()> {
        if !value.is_finite() {
            Err(EngineError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate a count that must be at least one and at most `max`
    pub fn validate_count(field: &str, count: usize, max: usize) -> EngineResult<()> {
        if count == 0 {
            Err(EngineError::InvalidConfiguration {
                field: field.to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if count > max {
            Err(EngineError::InvalidConfiguration {
                field: field.to_string(),
                reason: format!("exceeds maximum allowed ({})", max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate paths count
    pub fn validate_paths(paths: usize) -> EngineResult<()> {
        validate_count("paths", paths, MAX_PATHS)
    }

    /// Validate steps count
    pub fn validate_steps(steps: usize) -> EngineResult<()> {
        validate_count("steps", steps, MAX_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("sigma", 0.2).is_ok());
        assert!(validate_positive("sigma", 0.0).is_err());
        assert!(validate_positive("sigma", -0.1).is_err());
        assert!(validate_positive("sigma", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_correlation() {
        assert!(validate_correlation("rho", 0.5).is_ok());
        assert!(validate_correlation("rho", -0.8).is_ok());
        assert!(validate_correlation("rho", 1.0).is_ok());
        assert!(validate_correlation("rho", -1.0).is_ok());
        assert!(validate_correlation("rho", 1.1).is_err());
        assert!(validate_correlation("rho", -1.1).is_err());
        assert!(validate_correlation("rho", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_probability() {
        assert!(validate_probability("p", 0.0).is_ok());
        assert!(validate_probability("p", 1.0).is_ok());
        assert!(validate_probability("p", 1.0001).is_err());
        assert!(validate_probability("p", -0.01).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("value", 1.0).is_ok());
        assert!(validate_finite("value", f64::NAN).is_err());
        assert!(validate_finite("value", f64::INFINITY).is_err());
        assert!(validate_finite("value", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_counts() {
        assert!(validate_paths(1).is_ok());
        assert!(validate_paths(0).is_err());
        assert!(validate_steps(252).is_ok());
        assert!(validate_steps(MAX_STEPS + 1).is_err());
    }

    #[test]
    fn test_error_display() {
        let error = EngineError::InvalidParameters {
            parameter: "sigma".to_string(),
            value: -0.1,
            constraint: "must be positive".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("sigma"));
        assert!(display.contains("-0.1"));
        assert!(display.contains("positive"));
    }

    #[test]
    fn test_cancelled_display() {
        let error = EngineError::Cancelled {
            completed: 3,
            requested: 10,
        };
        assert_eq!(
            error.to_string(),
            "Simulation cancelled after 3 of 10 paths"
        );
    }
}
