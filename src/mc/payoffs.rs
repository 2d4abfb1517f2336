//! European option payoffs
//!
//! - **Call**: max(S_T - K, 0)
//! - **Put**: max(K - S_T, 0)
//!
//! Only the terminal value of a path enters the payoff.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Intrinsic value at expiry for strike `k`
    #[inline]
    pub fn payoff(self, terminal: f64, k: f64) -> f64 {
        match self {
            OptionType::Call => (terminal - k).max(0.0),
            OptionType::Put => (k - terminal).max(0.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payoffs() {
        assert_eq!(OptionType::Call.payoff(110.0, 100.0), 10.0);
        assert_eq!(OptionType::Call.payoff(90.0, 100.0), 0.0);
        assert_eq!(OptionType::Put.payoff(90.0, 100.0), 10.0);
        assert_eq!(OptionType::Put.payoff(110.0, 100.0), 0.0);
    }
}
