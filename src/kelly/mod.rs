//! Kelly criterion sizing and strategy comparison

pub mod fraction;
pub mod simulator;

use crate::error::{validation::*, EngineResult};
use crate::rng::SourceFactory;
use fraction::{expected_growth_rate, growth_curve, kelly_fraction, raw_kelly_fraction, GrowthPoint};
use serde::{Deserialize, Serialize};
use simulator::{simulate_strategies, StrategyOutcome, StrategySet};

/// Most bets a single trajectory may run
pub const MAX_BETS: usize = 100_000;
/// Most repeated runs averaged per strategy
pub const MAX_SIMULATIONS: usize = 100_000;
/// Resolution of the growth-rate curve
pub const GROWTH_CURVE_POINTS: usize = 101;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KellyParams {
    pub win_probability: f64,
    /// Capital multiple won per unit staked
    pub win_ratio: f64,
    /// Capital multiple lost per unit staked
    pub loss_ratio: f64,
    pub num_bets: usize,
    pub num_simulations: usize,
    pub initial_capital: f64,
    #[serde(default)]
    pub strategies: StrategySet,
}

impl Default for KellyParams {
    fn default() -> Self {
        KellyParams {
            win_probability: 0.55,
            win_ratio: 1.0,
            loss_ratio: 1.0,
            num_bets: 100,
            num_simulations: 10,
            initial_capital: 1000.0,
            strategies: StrategySet::all(),
        }
    }
}

impl KellyParams {
    pub fn validate(&self) -> EngineResult<()> {
        validate_probability("win_probability", self.win_probability)?;
        validate_positive("win_ratio", self.win_ratio)?;
        validate_positive("loss_ratio", self.loss_ratio)?;
        validate_count("num_bets", self.num_bets, MAX_BETS)?;
        validate_count("num_simulations", self.num_simulations, MAX_SIMULATIONS)?;
        validate_positive("initial_capital", self.initial_capital)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KellyResult {
    /// f* clamped into [0, 1]
    pub optimal_fraction: f64,
    /// f* before clamping (negative means no edge)
    pub raw_fraction: f64,
    /// g(f*); `None` when f* itself risks ruin on one loss
    pub expected_growth: Option<f64>,
    pub strategies: Vec<StrategyOutcome>,
    pub growth_curve: Vec<GrowthPoint>,
}

/// Full Kelly analysis drawing randomness from `factory`.
pub fn analyze<F: SourceFactory>(params: &KellyParams, factory: &F) -> EngineResult<KellyResult> {
    params.validate()?;
    let (p, b, a) = (params.win_probability, params.win_ratio, params.loss_ratio);

    let raw_fraction = raw_kelly_fraction(p, b, a)?;
    let optimal_fraction = kelly_fraction(p, b, a)?;
    let expected_growth = expected_growth_rate(p, b, a, optimal_fraction).ok();

    Ok(KellyResult {
        optimal_fraction,
        raw_fraction,
        expected_growth,
        strategies: simulate_strategies(params, optimal_fraction, factory),
        growth_curve: growth_curve(p, b, a, GROWTH_CURVE_POINTS)?,
    })
}
