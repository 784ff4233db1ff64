use serde::{Deserialize, Serialize};

use crate::error::{CasError, Result};
use crate::expr::Rational;

/// Resource limits for the algebra backend. A step that would exceed them is
/// reported as undecided instead of being worked through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Largest number of terms any intermediate polynomial may carry.
    pub max_terms: usize,
    /// Largest integer exponent that is expanded.
    pub max_exponent: u32,
    /// Largest exponent any atom may reach inside a product.
    pub max_degree: u32,
    /// Largest bit length of a coefficient's numerator plus denominator.
    pub max_coefficient_bits: u64,
    /// Deepest expression tree the algebra layer will walk.
    pub max_depth: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            max_terms: 4096,
            max_exponent: 64,
            max_degree: 1024,
            max_coefficient_bits: 8192,
            max_depth: 512,
        }
    }
}

impl CheckerConfig {
    /// Reads a config from JSON. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub(crate) fn check_terms(&self, what: &'static str, count: usize) -> Result<()> {
        if count > self.max_terms {
            return Err(CasError::LimitExceeded {
                what,
                limit: self.max_terms,
            });
        }
        Ok(())
    }

    pub(crate) fn check_degree(&self, degree: i64) -> Result<i32> {
        let limit = self.max_degree.min(i32::MAX as u32);
        if degree.unsigned_abs() > u64::from(limit) {
            return Err(CasError::LimitExceeded {
                what: "degree",
                limit: limit as usize,
            });
        }
        Ok(degree as i32)
    }

    /// Rejects `c^exp` before it is computed when the result would be wider
    /// than `max_coefficient_bits`. `exp = 1` checks `c` itself.
    pub(crate) fn check_coefficient(&self, c: &Rational, exp: u64) -> Result<()> {
        let bits = c.numer().bits() + c.denom().bits();
        self.check_bits(bits.saturating_mul(exp))
    }

    pub(crate) fn check_bits(&self, bits: u64) -> Result<()> {
        if bits > self.max_coefficient_bits {
            return Err(CasError::LimitExceeded {
                what: "coefficient bits",
                limit: usize::try_from(self.max_coefficient_bits).unwrap_or(usize::MAX),
            });
        }
        Ok(())
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(CasError::LimitExceeded {
                what: "expression depth",
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    pub(crate) fn check_exponent(&self, exp: u32) -> Result<()> {
        if exp > self.max_exponent {
            return Err(CasError::LimitExceeded {
                what: "exponent",
                limit: self.max_exponent as usize,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CheckerConfig::from_json(r#"{"max_exponent": 8}"#).unwrap();
        assert_eq!(config.max_exponent, 8);
        assert_eq!(config.max_terms, CheckerConfig::default().max_terms);
        assert_eq!(config.max_depth, CheckerConfig::default().max_depth);
    }

    #[test]
    fn wide_powers_are_rejected_before_computing() {
        let config = CheckerConfig::default();
        let two_to_64 = Rational::from_integer(num_bigint::BigInt::from(1u8) << 64usize);
        assert!(config.check_coefficient(&two_to_64, 64).is_ok());
        assert!(config.check_coefficient(&two_to_64, 4096).is_err());
    }

    #[test]
    fn degrees_are_bounded() {
        let config = CheckerConfig::default();
        assert_eq!(config.check_degree(-1024).unwrap(), -1024);
        assert!(config.check_degree(1 << 36).is_err());
    }
}
