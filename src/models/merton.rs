// src/models/merton.rs
//! Merton Jump-Diffusion Model
//!
//! ```text
//! dS_t / S_t- = (r - λk̄) dt + σ dW_t + (Y - 1) dN_t
//! ln Y ~ N(μ_J, σ_J²),   N_t ~ Poisson(λt),   k̄ = E[Y - 1] = e^(μ_J + σ_J²/2) - 1
//! ```
//!
//! Each step applies the exact log-space update
//! ```text
//! S_{n+1} = S_n · exp((r - λk̄ - σ²/2)Δt + σΔW + Σ_{j≤k} ln Y_j),   k ~ Poisson(λΔt)
//! ```
//! The compensator λk̄ keeps the risk-neutral expected return at r.

use super::model::{time_at, JumpEvent, PathSimulator, SimulatedPath, PRICE_FLOOR};
use crate::error::{validation::*, EngineError, EngineResult};
use crate::rng::VariateSource;
use serde::{Deserialize, Serialize};

/// Jump intensities above this are rejected as unrealistic for the explainer.
pub const MAX_JUMP_INTENSITY: f64 = 1_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MertonParams {
    pub s0: f64,
    pub r: f64,
    pub sigma: f64,
    pub lambda: f64,  // Jump intensity (jumps per year)
    pub mu_j: f64,    // Mean of log-jump size
    pub sigma_j: f64, // Std dev of log-jump size
    pub t: f64,
    pub steps: usize,
    pub strike: f64,
}

impl Default for MertonParams {
    fn default() -> Self {
        MertonParams {
            s0: 100.0,
            r: 0.05,
            sigma: 0.2,
            lambda: 1.0,
            mu_j: -0.1,
            sigma_j: 0.15,
            t: 1.0,
            steps: 252,
            strike: 100.0,
        }
    }
}

impl MertonParams {
    pub fn validate(&self) -> EngineResult<()> {
        validate_positive("s0", self.s0)?;
        validate_finite("r", self.r)?;
        validate_positive("sigma", self.sigma)?;
        validate_non_negative("lambda", self.lambda)?;
        if self.lambda > MAX_JUMP_INTENSITY {
            return Err(EngineError::InvalidParameters {
                parameter: "lambda".to_string(),
                value: self.lambda,
                constraint: format!("jump intensity above {} per year", MAX_JUMP_INTENSITY),
            });
        }
        validate_finite("mu_j", self.mu_j)?;
        validate_non_negative("sigma_j", self.sigma_j)?;
        validate_positive("t", self.t)?;
        validate_steps(self.steps)?;
        validate_positive("strike", self.strike)?;
        Ok(())
    }
}

/// One grid point of a Merton path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MertonPoint {
    pub time: f64,
    pub price: f64,
    pub jumped: bool,
    /// Summed log-jump size on this step, 0 when no jump fired
    pub jump_size: f64,
}

#[derive(Debug, Clone)]
pub struct Merton {
    pub params: MertonParams,
}

impl Merton {
    pub fn new(params: MertonParams) -> EngineResult<Self> {
        params.validate()?;
        Ok(Merton { params })
    }

    pub fn dt(&self) -> f64 {
        self.params.t / self.params.steps as f64
    }

    /// Expected jump multiplier: E[Y - 1] where Y = exp(μ_J + σ_J * Z)
    pub fn kappa(&self) -> f64 {
        (self.params.mu_j + 0.5 * self.params.sigma_j * self.params.sigma_j).exp() - 1.0
    }

    /// λk̄, the drift removed to offset the jumps' mean contribution
    pub fn compensator(&self) -> f64 {
        self.params.lambda * self.kappa()
    }

    /// Per-unit-time drift of ln S
    pub fn log_drift(&self) -> f64 {
        self.params.r - self.compensator() - 0.5 * self.params.sigma * self.params.sigma
    }

    /// Advance the price by one step.
    ///
    /// Returns `(jump_count, total_log_jump)` for the step.
    pub fn step<S: VariateSource + ?Sized>(&self, s: &mut f64, dt: f64, source: &mut S) -> (u64, f64) {
        let p = &self.params;
        let dw = source.standard_normal() * dt.sqrt();

        let jumps = source.poisson(p.lambda * dt);
        let mut total_jump = 0.0;
        for _ in 0..jumps {
            total_jump += p.mu_j + p.sigma_j * source.standard_normal();
        }

        *s = (*s * (self.log_drift() * dt + p.sigma * dw + total_jump).exp()).max(PRICE_FLOOR);
        (jumps, total_jump)
    }
}

impl PathSimulator for Merton {
    type Point = MertonPoint;

    fn name(&self) -> &'static str {
        "Merton"
    }

    fn horizon(&self) -> f64 {
        self.params.t
    }

    fn steps(&self) -> usize {
        self.params.steps
    }

    fn simulate_path<S: VariateSource>(&self, source: &mut S) -> SimulatedPath<MertonPoint> {
        let steps = self.params.steps;
        let dt = self.dt();

        let mut s = self.params.s0;
        let mut points = Vec::with_capacity(steps + 1);
        let mut jumps = Vec::new();
        let mut jump_count = 0;

        points.push(MertonPoint {
            time: 0.0,
            price: s,
            jumped: false,
            jump_size: 0.0,
        });

        for i in 1..=steps {
            let (k, total_jump) = self.step(&mut s, dt, source);
            let time = time_at(i, steps, self.params.t);

            if k > 0 {
                jump_count += k;
                jumps.push(JumpEvent {
                    path: 0,
                    time,
                    resulting_price: s,
                    jump_size: total_jump,
                    jump_count: k,
                });
            }

            points.push(MertonPoint {
                time,
                price: s,
                jumped: k > 0,
                jump_size: total_jump,
            });
        }

        SimulatedPath {
            points,
            terminal: s,
            jumps,
            jump_count,
            floor_hits: 0,
        }
    }
}
