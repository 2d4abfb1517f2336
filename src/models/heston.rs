// src/models/heston.rs
//! Heston Stochastic Volatility Model Implementation
//!
//! # Mathematical Framework
//!
//! The Heston model describes asset price evolution with stochastic volatility:
//! ```text
//! dS_t = r S_t dt + √V_t S_t dW_t^(1)
//! dV_t = κ(θ - V_t) dt + ξ√V_t dW_t^(2)
//! ```
//!
//! Where:
//! - S_t: Asset price
//! - V_t: Instantaneous variance (volatility squared)
//! - κ: Mean reversion speed for variance
//! - θ: Long-term variance level
//! - ξ: Volatility of variance (vol-of-vol)
//! - ρ: Correlation between dW_t^(1) and dW_t^(2)
//!
//! # Feller Condition
//!
//! The variance stays strictly positive in continuous time when
//! ```text
//! 2κθ / ξ² ≥ 1
//! ```
//! The ratio is reported as a diagnostic only. The discrete scheme below
//! floors the variance instead of relying on it.
//!
//! # Discretization
//!
//! Euler-Maruyama on both factors with a floored square root:
//! ```text
//! √V⁺ = max(√|V_n|, ε)
//! S_{n+1} = S_n + r S_n Δt + √V⁺ S_n ΔW_s
//! V_{n+1} = max(V_n + κ(θ - V_n)Δt + ξ √V⁺ ΔW_v, ε)
//! ```
//! with ε = 0.001.

use super::model::{time_at, PathSimulator, SimulatedPath, PRICE_FLOOR, VARIANCE_FLOOR};
use crate::error::{validation::*, EngineResult};
use crate::rng::VariateSource;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HestonParams {
    pub s0: f64,     // Initial stock price
    pub v0: f64,     // Initial variance
    pub r: f64,      // Risk-free rate
    pub kappa: f64,  // Mean reversion speed
    pub theta: f64,  // Long-term variance
    pub xi: f64,     // Volatility of variance (vol-of-vol)
    pub rho: f64,    // Correlation between stock and variance
    pub t: f64,      // Horizon in years
    pub steps: usize,
    pub strike: f64, // Strike for the option estimates
}

impl Default for HestonParams {
    fn default() -> Self {
        HestonParams {
            s0: 100.0,
            v0: 0.04,
            r: 0.05,
            kappa: 2.0,
            theta: 0.04,
            xi: 0.3,
            rho: -0.7,
            t: 1.0,
            steps: 252,
            strike: 100.0,
        }
    }
}

impl HestonParams {
    /// Validate Heston parameters
    pub fn validate(&self) -> EngineResult<()> {
        validate_positive("s0", self.s0)?;
        validate_positive("v0", self.v0)?;
        validate_finite("r", self.r)?;
        validate_positive("kappa", self.kappa)?;
        validate_positive("theta", self.theta)?;
        validate_positive("xi", self.xi)?;
        validate_correlation("rho", self.rho)?;
        validate_positive("t", self.t)?;
        validate_steps(self.steps)?;
        validate_positive("strike", self.strike)?;
        Ok(())
    }

    /// 2κθ/ξ²
    pub fn feller_ratio(&self) -> f64 {
        2.0 * self.kappa * self.theta / (self.xi * self.xi)
    }
}

/// One grid point of a Heston path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HestonPoint {
    pub time: f64,
    pub price: f64,
    pub variance: f64,
}

#[derive(Debug, Clone)]
pub struct Heston {
    pub params: HestonParams,
}

impl Heston {
    pub fn new(params: HestonParams) -> EngineResult<Self> {
        params.validate()?;

        let feller = params.feller_ratio();
        if feller < 1.0 {
            warn!(
                feller,
                kappa = params.kappa,
                theta = params.theta,
                xi = params.xi,
                "Feller condition violated (2κθ/ξ² < 1), variance floor will be active"
            );
        }

        Ok(Heston { params })
    }

    pub fn dt(&self) -> f64 {
        self.params.t / self.params.steps as f64
    }

    pub fn feller_condition(&self) -> f64 {
        self.params.feller_ratio()
    }

    pub fn feller_satisfied(&self) -> bool {
        self.feller_condition() >= 1.0
    }

    /// √V₀·ξ, the initial scale of variance shocks
    pub fn vol_of_vol(&self) -> f64 {
        self.params.v0.sqrt() * self.params.xi
    }

    /// Volatility implied by the expected average variance over the horizon:
    /// ```text
    /// v̄ = θ + (V₀ - θ)(1 - e^(-κT)) / (κT)
    /// ```
    /// This is the constant volatility the model collapses to as ξ → 0.
    pub fn effective_volatility(&self) -> f64 {
        let p = &self.params;
        let kt = p.kappa * p.t;
        let mean_variance = p.theta + (p.v0 - p.theta) * (1.0 - (-kt).exp()) / kt;
        mean_variance.max(VARIANCE_FLOOR).sqrt()
    }

    /// Two-factor step: updates both stock price and variance.
    ///
    /// Returns `true` when the variance floor replaced the raw update.
    pub fn step<S: VariateSource + ?Sized>(
        &self,
        s: &mut f64,
        v: &mut f64,
        dt: f64,
        source: &mut S,
    ) -> bool {
        let (dw_s, dw_v) = source.correlated_normals(self.params.rho);
        self.step_with_dw(s, v, dt, dw_s, dw_v)
    }

    /// Same as [`Heston::step`] with the standard normal shocks supplied.
    pub fn step_with_dw(&self, s: &mut f64, v: &mut f64, dt: f64, dw_s: f64, dw_v: f64) -> bool {
        let p = &self.params;
        let sqrt_dt = dt.sqrt();
        let sqrt_v = v.abs().sqrt().max(VARIANCE_FLOOR);

        let s_next = *s + p.r * *s * dt + sqrt_v * *s * dw_s * sqrt_dt;
        let v_next = *v + p.kappa * (p.theta - *v) * dt + p.xi * sqrt_v * dw_v * sqrt_dt;

        *s = s_next.max(PRICE_FLOOR);
        if v_next < VARIANCE_FLOOR {
            *v = VARIANCE_FLOOR;
            true
        } else {
            *v = v_next;
            false
        }
    }
}

impl PathSimulator for Heston {
    type Point = HestonPoint;

    fn name(&self) -> &'static str {
        "Heston"
    }

    fn horizon(&self) -> f64 {
        self.params.t
    }

    fn steps(&self) -> usize {
        self.params.steps
    }

    fn simulate_path<S: VariateSource>(&self, source: &mut S) -> SimulatedPath<HestonPoint> {
        let steps = self.params.steps;
        let dt = self.dt();

        let mut s = self.params.s0;
        let mut v = self.params.v0.max(VARIANCE_FLOOR);
        let mut floor_hits = 0;

        let mut points = Vec::with_capacity(steps + 1);
        points.push(HestonPoint {
            time: 0.0,
            price: s,
            variance: v,
        });

        for i in 1..=steps {
            if self.step(&mut s, &mut v, dt, source) {
                floor_hits += 1;
            }
            points.push(HestonPoint {
                time: time_at(i, steps, self.params.t),
                price: s,
                variance: v,
            });
        }

        SimulatedPath {
            points,
            terminal: s,
            jumps: Vec::new(),
            jump_count: 0,
            floor_hits,
        }
    }
}
