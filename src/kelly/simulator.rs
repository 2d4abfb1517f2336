//! Capital trajectories under fixed-fraction betting policies

use super::fraction::expected_growth_rate;
use super::KellyParams;
use crate::rng::{SourceFactory, VariateSource};
use bitflags::bitflags;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

bitflags! {
    /// Which policies a Kelly analysis simulates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct StrategySet: u32 {
        const FULL_KELLY         = 1 << 0;
        const HALF_KELLY         = 1 << 1;
        const DOUBLE_KELLY       = 1 << 2;
        const FIXED_FIVE_PERCENT = 1 << 3;
    }
}

impl Default for StrategySet {
    fn default() -> Self {
        StrategySet::all()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    FullKelly,
    HalfKelly,
    DoubleKelly,
    FixedFivePercent,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::FullKelly,
        Strategy::HalfKelly,
        Strategy::DoubleKelly,
        Strategy::FixedFivePercent,
    ];

    pub fn flag(self) -> StrategySet {
        match self {
            Strategy::FullKelly => StrategySet::FULL_KELLY,
            Strategy::HalfKelly => StrategySet::HALF_KELLY,
            Strategy::DoubleKelly => StrategySet::DOUBLE_KELLY,
            Strategy::FixedFivePercent => StrategySet::FIXED_FIVE_PERCENT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::FullKelly => "Full Kelly",
            Strategy::HalfKelly => "Half Kelly",
            Strategy::DoubleKelly => "Double Kelly",
            Strategy::FixedFivePercent => "Fixed 5%",
        }
    }

    /// Fraction the policy asks for, before clamping
    pub fn target_fraction(self, kelly: f64) -> f64 {
        match self {
            Strategy::FullKelly => kelly,
            Strategy::HalfKelly => 0.5 * kelly,
            Strategy::DoubleKelly => 2.0 * kelly,
            Strategy::FixedFivePercent => 0.05,
        }
    }

    /// Fraction actually staked, clamped into [0, 1]
    pub fn fraction(self, kelly: f64) -> f64 {
        self.target_fraction(kelly).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapitalPoint {
    pub bet: usize,
    pub capital: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    pub strategy: Strategy,
    pub name: String,
    pub target_fraction: f64,
    pub fraction: f64,
    /// `None` when the fraction can lose the whole bankroll on one bet
    pub growth_rate: Option<f64>,
    /// Point-wise mean over the repeated runs, `num_bets + 1` points
    pub trajectory: Vec<CapitalPoint>,
    pub final_capital: f64,
    /// Runs that ended with zero capital
    pub ruined_runs: usize,
}

/// One capital trajectory of `num_bets` bets at a fixed fraction.
///
/// A bet is won when the uniform draw falls below the win probability.
/// Capital never drops below zero; zero means ruin and stays absorbing.
pub fn simulate_capital<S: VariateSource + ?Sized>(
    params: &KellyParams,
    fraction: f64,
    source: &mut S,
) -> Vec<f64> {
    let mut capital = params.initial_capital;
    let mut trajectory = Vec::with_capacity(params.num_bets + 1);
    trajectory.push(capital);

    for _ in 0..params.num_bets {
        let stake = capital * fraction;
        if source.uniform() < params.win_probability {
            capital += stake * params.win_ratio;
        } else {
            capital -= stake * params.loss_ratio;
        }
        capital = capital.max(0.0);
        trajectory.push(capital);
    }

    trajectory
}

/// Simulate one policy `num_simulations` times and average the runs.
///
/// Run `i` draws from `factory.source_for_path(i)` for every strategy, so
/// policies are compared on the same sequence of wins and losses.
pub fn simulate_strategy<F: SourceFactory>(
    params: &KellyParams,
    strategy: Strategy,
    kelly: f64,
    factory: &F,
) -> StrategyOutcome {
    let fraction = strategy.fraction(kelly);
    let points = params.num_bets + 1;

    let runs: Vec<Vec<f64>> = (0..params.num_simulations)
        .into_par_iter()
        .map(|run| simulate_capital(params, fraction, &mut factory.source_for_path(run as u64)))
        .collect();

    let ruined_runs = runs
        .iter()
        .filter(|run| run.last().map_or(false, |&c| c <= 0.0))
        .count();

    let mut sums = vec![0.0; points];
    for run in &runs {
        for (slot, capital) in sums.iter_mut().zip(run) {
            *slot += capital;
        }
    }
    let n = params.num_simulations as f64;
    let trajectory: Vec<CapitalPoint> = sums
        .into_iter()
        .enumerate()
        .map(|(bet, total)| CapitalPoint {
            bet,
            capital: total / n,
        })
        .collect();

    let final_capital = trajectory.last().map_or(params.initial_capital, |p| p.capital);
    let growth_rate = expected_growth_rate(
        params.win_probability,
        params.win_ratio,
        params.loss_ratio,
        fraction,
    )
    .ok();

    debug!(
        strategy = strategy.name(),
        fraction,
        final_capital,
        ruined_runs,
        "strategy simulated"
    );

    StrategyOutcome {
        strategy,
        name: strategy.name().to_string(),
        target_fraction: strategy.target_fraction(kelly),
        fraction,
        growth_rate,
        trajectory,
        final_capital,
        ruined_runs,
    }
}

/// Every strategy selected in `params.strategies`, in [`Strategy::ALL`] order.
pub fn simulate_strategies<F: SourceFactory>(
    params: &KellyParams,
    kelly: f64,
    factory: &F,
) -> Vec<StrategyOutcome> {
    Strategy::ALL
        .iter()
        .filter(|s| params.strategies.contains(s.flag()))
        .map(|&s| simulate_strategy(params, s, kelly, factory))
        .collect()
}
