//! Kelly fraction and long-run growth rate for a repeated binary bet
//!
//! A bet of fraction f wins `f·b` of capital with probability p and loses
//! `f·a` otherwise:
//! ```text
//! f* = (p·b - (1-p)·a) / (a·b)
//! g(f) = p·ln(1 + f·b) + (1-p)·ln(1 - f·a)
//! ```
//! g is undefined once `1 - f·a ≤ 0`: a single loss wipes out the bankroll.

use crate::error::{validation::*, EngineError, EngineResult};
use serde::{Deserialize, Serialize};

fn validate_bet(p: f64, b: f64, a: f64) -> EngineResult<()> {
    validate_probability("win_probability", p)?;
    validate_positive("win_ratio", b)?;
    validate_positive("loss_ratio", a)?;
    Ok(())
}

/// Unclamped Kelly fraction; negative when the bet has no edge.
pub fn raw_kelly_fraction(p: f64, b: f64, a: f64) -> EngineResult<f64> {
    validate_bet(p, b, a)?;
    Ok((p * b - (1.0 - p) * a) / (a * b))
}

/// Growth-optimal fraction clamped into [0, 1].
pub fn kelly_fraction(p: f64, b: f64, a: f64) -> EngineResult<f64> {
    Ok(raw_kelly_fraction(p, b, a)?.clamp(0.0, 1.0))
}

/// Expected log-growth per bet when staking fraction `f`.
///
/// # Errors
/// `NumericalDegeneracy` when `1 - f·a ≤ 0`.
pub fn expected_growth_rate(p: f64, b: f64, a: f64, f: f64) -> EngineResult<f64> {
    validate_bet(p, b, a)?;
    validate_non_negative("fraction", f)?;

    let loss_multiplier = 1.0 - f * a;
    if loss_multiplier <= 0.0 {
        return Err(EngineError::NumericalDegeneracy {
            method: "Kelly growth rate".to_string(),
            reason: format!(
                "fraction {} with loss ratio {} leaves 1 - f·a = {} (ruin on one loss)",
                f, a, loss_multiplier
            ),
        });
    }

    // p = 0 or p = 1 must not turn 0 · ln(..) into NaN
    let win_term = if p > 0.0 { p * (f * b).ln_1p() } else { 0.0 };
    let loss_term = if p < 1.0 {
        (1.0 - p) * loss_multiplier.ln()
    } else {
        0.0
    };
    Ok(win_term + loss_term)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub fraction: f64,
    pub growth_rate: f64,
}

/// g(f) sampled at `points` evenly spaced fractions in [0, 1].
///
/// Fractions that hit the ruin condition are left out.
pub fn growth_curve(p: f64, b: f64, a: f64, points: usize) -> EngineResult<Vec<GrowthPoint>> {
    validate_bet(p, b, a)?;
    validate_count("points", points, 100_000)?;

    let denominator = (points.max(2) - 1) as f64;
    Ok((0..points)
        .filter_map(|i| {
            let fraction = i as f64 / denominator;
            expected_growth_rate(p, b, a, fraction)
                .ok()
                .map(|growth_rate| GrowthPoint {
                    fraction,
                    growth_rate,
                })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_odds_examples() {
        let f = kelly_fraction(0.55, 1.0, 1.0).expect("valid bet");
        assert!((f - 0.10).abs() < 1e-12, "f* = {}", f);

        let f = kelly_fraction(0.5, 1.0, 1.0).expect("valid bet");
        assert!(f.abs() < 1e-15);
    }

    #[test]
    fn test_clamping() {
        // No edge: raw fraction negative, clamped to zero
        assert!(raw_kelly_fraction(0.3, 1.0, 1.0).expect("valid bet") < 0.0);
        assert_eq!(kelly_fraction(0.3, 1.0, 1.0).expect("valid bet"), 0.0);

        // Certain win with a small loss ratio: raw fraction above one
        assert!(raw_kelly_fraction(1.0, 2.0, 0.5).expect("valid bet") > 1.0);
        assert_eq!(kelly_fraction(1.0, 2.0, 0.5).expect("valid bet"), 1.0);
    }

    #[test]
    fn test_invalid_bets() {
        assert!(kelly_fraction(1.2, 1.0, 1.0).is_err());
        assert!(kelly_fraction(0.5, 0.0, 1.0).is_err());
        assert!(kelly_fraction(0.5, 1.0, -1.0).is_err());
    }

    #[test]
    fn test_growth_is_maximised_at_kelly() {
        let (p, b, a) = (0.6, 1.5, 1.0);
        let f_star = kelly_fraction(p, b, a).expect("valid bet");
        let g_star = expected_growth_rate(p, b, a, f_star).expect("defined");

        for f in [0.0, 0.1, 0.2, 0.4, 0.5, 0.8] {
            let g = expected_growth_rate(p, b, a, f).expect("defined");
            assert!(g <= g_star + 1e-12, "g({}) = {} > g(f*) = {}", f, g, g_star);
        }
        assert!(g_star > 0.0);
    }

    #[test]
    fn test_growth_zero_fraction() {
        assert_eq!(expected_growth_rate(0.55, 1.0, 1.0, 0.0), Ok(0.0));
    }

    #[test]
    fn test_ruin_is_degenerate() {
        assert!(matches!(
            expected_growth_rate(0.55, 1.0, 1.0, 1.0),
            Err(EngineError::NumericalDegeneracy { .. })
        ));
        assert!(matches!(
            expected_growth_rate(0.55, 1.0, 2.0, 0.6),
            Err(EngineError::NumericalDegeneracy { .. })
        ));
    }

    #[test]
    fn test_certain_outcomes() {
        let g = expected_growth_rate(1.0, 1.0, 1.0, 0.5).expect("defined");
        assert!((g - 1.5f64.ln()).abs() < 1e-15);
        let g = expected_growth_rate(0.0, 1.0, 1.0, 0.5).expect("defined");
        assert!((g - 0.5f64.ln()).abs() < 1e-15);
    }

    #[test]
    fn test_growth_curve_skips_ruin() {
        let curve = growth_curve(0.55, 1.0, 1.0, 11).expect("valid bet");
        // f = 1.0 ruins on a loss
        assert_eq!(curve.len(), 10);
        assert_eq!(curve[0].fraction, 0.0);
        assert!((curve[9].fraction - 0.9).abs() < 1e-12);
    }
}
