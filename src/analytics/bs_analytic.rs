// src/analytics/bs_analytic.rs
//! Closed-form reference prices for European options
//!
//! # Black-Scholes
//!
//! ```text
//! d₁ = [ln(S/K) + (r + σ²/2)T] / (σ√T),   d₂ = d₁ - σ√T
//! C = S Φ(d₁) - K e^(-rT) Φ(d₂)
//! P = K e^(-rT) Φ(-d₂) - S Φ(-d₁)
//! ```
//!
//! # Merton (1976) series
//!
//! Conditioning on n jumps gives a Black-Scholes price with adjusted rate
//! and volatility, weighted by a Poisson(λ'T) probability:
//! ```text
//! λ' = λ(1 + k̄),   σ_n² = σ² + nσ_J²/T,   r_n = r - λk̄ + n ln(1 + k̄)/T
//! V = Σ_n e^(-λ'T) (λ'T)ⁿ / n! · BS(S, K, r_n, σ_n, T)
//! ```
//! Weights are evaluated in log space and summed outward from the mode of
//! the Poisson distribution, so large λ'T neither underflows nor truncates.
//!
//! Both are reference values only and never feed back into a simulation.

use crate::error::{validation::*, EngineError, EngineResult};
use crate::math_utils::norm_cdf;
use crate::mc::payoffs::OptionType;
use crate::models::merton::MertonParams;
use statrs::function::gamma::ln_gamma;

/// Hard cap on the number of series terms
const MAX_SERIES_TERMS: usize = 20_000;
/// Poisson weight below which the tail is dropped
const SERIES_TOLERANCE: f64 = 1e-20;
/// Largest shortfall of the summed Poisson weights from 1
const SERIES_MASS_TOLERANCE: f64 = 1e-9;

fn check_inputs(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> EngineResult<()> {
    validate_positive("s", s)?;
    validate_positive("k", k)?;
    validate_finite("r", r)?;
    validate_non_negative("sigma", sigma)?;
    validate_non_negative("t", t)?;
    Ok(())
}

/// Black-Scholes European option price
///
/// # Errors
/// - `InvalidParameters` for non-positive spot/strike or non-finite inputs
/// - `NumericalDegeneracy` when σ√T = 0, where d₁ is undefined
pub fn bs_price(s: f64, k: f64, r: f64, sigma: f64, t: f64, option: OptionType) -> EngineResult<f64> {
    check_inputs(s, k, r, sigma, t)?;

    let vol_sqrt_t = sigma * t.sqrt();
    if !(vol_sqrt_t > 0.0) {
        return Err(EngineError::NumericalDegeneracy {
            method: "Black-Scholes".to_string(),
            reason: format!("σ√T = 0 (σ = {}, T = {}), d₁ is undefined", sigma, t),
        });
    }

    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;
    let discounted_k = k * (-r * t).exp();

    let price = match option {
        OptionType::Call => s * norm_cdf(d1) - discounted_k * norm_cdf(d2),
        OptionType::Put => discounted_k * norm_cdf(-d2) - s * norm_cdf(-d1),
    };
    Ok(price)
}

/// Black-Scholes European call option price
pub fn bs_call_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> EngineResult<f64> {
    bs_price(s, k, r, sigma, t, OptionType::Call)
}

/// Black-Scholes European put option price
pub fn bs_put_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> EngineResult<f64> {
    bs_price(s, k, r, sigma, t, OptionType::Put)
}

/// Merton jump-diffusion European price from the Poisson-weighted series
///
/// # Errors
/// `NumericalDegeneracy` when the summed weights fall short of 1 within the
/// term cap.
pub fn merton_price(params: &MertonParams, option: OptionType) -> EngineResult<f64> {
    params.validate()?;
    let MertonParams {
        s0,
        r,
        sigma,
        lambda,
        mu_j,
        sigma_j,
        t,
        strike,
        ..
    } = *params;

    if lambda == 0.0 {
        return bs_price(s0, strike, r, sigma, t, option);
    }

    let log_mean_jump = mu_j + 0.5 * sigma_j * sigma_j;
    let k_bar = log_mean_jump.exp() - 1.0;
    let lambda_t = lambda * (1.0 + k_bar) * t;
    let ln_lambda_t = lambda_t.ln();

    let term = |n: u64| -> EngineResult<(f64, f64)> {
        let nf = n as f64;
        let weight = (-lambda_t + nf * ln_lambda_t - ln_gamma(nf + 1.0)).exp();
        let sigma_n = (sigma * sigma + nf * sigma_j * sigma_j / t).sqrt();
        let r_n = r - lambda * k_bar + nf * log_mean_jump / t;
        Ok((weight, weight * bs_price(s0, strike, r_n, sigma_n, t, option)?))
    };

    // Sum outward from the Poisson mode; weights fall off monotonically on both sides
    let mode = lambda_t.floor() as u64;
    let mut mass = 0.0;
    let mut price = 0.0;
    let mut terms = 0;

    let mut n = mode;
    loop {
        let (weight, value) = term(n)?;
        mass += weight;
        price += value;
        terms += 1;
        if n == 0 || weight < SERIES_TOLERANCE || terms >= MAX_SERIES_TERMS {
            break;
        }
        n -= 1;
    }

    let mut n = mode + 1;
    while terms < MAX_SERIES_TERMS {
        let (weight, value) = term(n)?;
        mass += weight;
        price += value;
        terms += 1;
        if weight < SERIES_TOLERANCE {
            break;
        }
        n += 1;
    }

    if !((1.0 - mass).abs() <= SERIES_MASS_TOLERANCE) {
        return Err(EngineError::NumericalDegeneracy {
            method: format!("Merton series ({})", option.name()),
            reason: format!(
                "Poisson weights sum to {} after {} terms (λ'T = {})",
                mass, terms, lambda_t
            ),
        });
    }
    if !price.is_finite() {
        return Err(EngineError::NumericalInstability {
            method: format!("Merton series ({})", option.name()),
            reason: format!("price is not finite: {}", price),
        });
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::merton::MAX_JUMP_INTENSITY;

    #[test]
    fn test_reference_prices() {
        let call = bs_call_price(100.0, 100.0, 0.05, 0.2, 1.0).expect("valid inputs");
        let put = bs_put_price(100.0, 100.0, 0.05, 0.2, 1.0).expect("valid inputs");
        assert!((call - 10.450_583_572_185_565).abs() < 1e-9, "call = {}", call);
        assert!((put - 5.573_526_022_256_971).abs() < 1e-9, "put = {}", put);
    }

    #[test]
    fn test_put_call_parity() {
        for &(s, k, r, sigma, t) in &[
            (100.0, 90.0, 0.03, 0.25, 0.5),
            (80.0, 100.0, 0.0, 0.4, 2.0),
            (120.0, 100.0, -0.01, 0.1, 1.0),
        ] {
            let c = bs_call_price(s, k, r, sigma, t).expect("valid inputs");
            let p = bs_put_price(s, k, r, sigma, t).expect("valid inputs");
            let parity = s - k * f64::exp(-r * t);
            assert!((c - p - parity).abs() < 1e-10);
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(matches!(
            bs_call_price(100.0, 100.0, 0.05, 0.0, 1.0),
            Err(EngineError::NumericalDegeneracy { .. })
        ));
        assert!(matches!(
            bs_put_price(100.0, 100.0, 0.05, 0.2, 0.0),
            Err(EngineError::NumericalDegeneracy { .. })
        ));
        assert!(matches!(
            bs_call_price(-1.0, 100.0, 0.05, 0.2, 1.0),
            Err(EngineError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_merton_reduces_to_black_scholes() {
        let params = MertonParams {
            lambda: 0.0,
            ..Default::default()
        };
        let merton = merton_price(&params, OptionType::Call).expect("valid inputs");
        let bs = bs_call_price(100.0, 100.0, 0.05, 0.2, 1.0).expect("valid inputs");
        assert_eq!(merton, bs);
    }

    #[test]
    fn test_merton_put_call_parity() {
        let params = MertonParams::default();
        let c = merton_price(&params, OptionType::Call).expect("valid inputs");
        let p = merton_price(&params, OptionType::Put).expect("valid inputs");
        let parity = params.s0 - params.strike * (-params.r * params.t).exp();
        assert!((c - p - parity).abs() < 1e-8, "parity gap {}", c - p - parity);
    }

    #[test]
    fn test_jumps_add_value_at_the_money() {
        let params = MertonParams::default();
        let merton = merton_price(&params, OptionType::Call).expect("valid inputs");
        let bs = bs_call_price(100.0, 100.0, 0.05, 0.2, 1.0).expect("valid inputs");
        assert!(merton > bs, "extra jump variance should raise the ATM call");
    }

    #[test]
    fn test_merton_series_large_jump_mass() {
        for (lambda, t) in [(500.0, 1.0), (900.0, 1.0), (10.0, 100.0)] {
            let params = MertonParams {
                lambda,
                t,
                ..Default::default()
            };
            let c = merton_price(&params, OptionType::Call).expect("valid inputs");
            let p = merton_price(&params, OptionType::Put).expect("valid inputs");
            let bs = bs_call_price(params.s0, params.strike, params.r, params.sigma, t)
                .expect("valid inputs");
            let parity = params.s0 - params.strike * (-params.r * t).exp();

            assert!(
                (c - p - parity).abs() < 1e-7,
                "λ={} T={}: parity gap {}",
                lambda,
                t,
                c - p - parity
            );
            assert!(c > bs, "λ={} T={}: series call {} <= BS {}", lambda, t, c, bs);
            assert!(c < params.s0);
        }
    }

    #[test]
    fn test_merton_series_term_cap_is_an_error() {
        // Huge mean jump multiplier puts the Poisson mode far past the term cap
        let params = MertonParams {
            lambda: MAX_JUMP_INTENSITY,
            mu_j: 5.0,
            t: 100.0,
            ..Default::default()
        };
        assert!(matches!(
            merton_price(&params, OptionType::Call),
            Err(EngineError::NumericalDegeneracy { .. })
        ));
    }
}
