// src/explainers.rs
//! Entry points used by the explainer front ends
//!
//! Each call takes an explicit parameter record, runs a fresh batch and
//! returns plain data. Nothing is cached between calls.

use crate::analytics::bs_analytic::{bs_price, merton_price};
use crate::error::EngineResult;
use crate::kelly::{self, KellyParams, KellyResult};
use crate::mc::mc_engine::{run_batch, McConfig, TerminalStatistics};
use crate::mc::payoffs::OptionType;
use crate::mc::stats::HistogramBin;
use crate::models::heston::{Heston, HestonParams, HestonPoint};
use crate::models::merton::{Merton, MertonParams, MertonPoint};
use crate::models::model::JumpEvent;
use crate::rng::{RngFactory, SourceFactory};
use serde::{Deserialize, Serialize};

/// Closed-form call/put pair and the volatility it was priced with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticPrices {
    pub call: f64,
    pub put: f64,
    pub volatility: f64,
}

impl AnalyticPrices {
    fn black_scholes(s0: f64, strike: f64, r: f64, sigma: f64, t: f64) -> EngineResult<Self> {
        Ok(AnalyticPrices {
            call: bs_price(s0, strike, r, sigma, t, OptionType::Call)?,
            put: bs_price(s0, strike, r, sigma, t, OptionType::Put)?,
            volatility: sigma,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HestonStatistics {
    pub terminal: TerminalStatistics,
    /// Black-Scholes at the effective volatility
    pub analytic: AnalyticPrices,
    /// 2κθ/ξ²
    pub feller_condition: f64,
    pub feller_satisfied: bool,
    /// √V₀·ξ
    pub vol_of_vol: f64,
    /// Steps across the batch where the variance floor was applied
    pub floor_hits: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HestonSimulation {
    pub paths: Vec<Vec<HestonPoint>>,
    pub distribution: Vec<HistogramBin>,
    pub statistics: HestonStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MertonStatistics {
    pub terminal: TerminalStatistics,
    /// Black-Scholes with the diffusion volatility only
    pub black_scholes: AnalyticPrices,
    /// Merton series price including jumps
    pub jump_diffusion: AnalyticPrices,
    pub total_jumps: u64,
    /// Mean summed log-jump size per jump event, 0 without events
    pub average_jump_size: f64,
    /// Jumps per path-year
    pub jump_frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MertonSimulation {
    pub paths: Vec<Vec<MertonPoint>>,
    pub jumps: Vec<JumpEvent>,
    pub distribution: Vec<HistogramBin>,
    pub results: MertonStatistics,
}

pub fn simulate_heston(params: &HestonParams, mc: &McConfig) -> EngineResult<HestonSimulation> {
    simulate_heston_with(params, mc, &RngFactory::new(mc.seed))
}

/// [`simulate_heston`] drawing from an explicit source factory
pub fn simulate_heston_with<F: SourceFactory>(
    params: &HestonParams,
    mc: &McConfig,
    factory: &F,
) -> EngineResult<HestonSimulation> {
    let heston = Heston::new(*params)?;
    mc.validate()?;

    let analytic = AnalyticPrices::black_scholes(
        params.s0,
        params.strike,
        params.r,
        heston.effective_volatility(),
        params.t,
    )?;

    let batch = run_batch(&heston, factory, mc)?;
    let terminal = batch.statistics(params.strike, params.r)?;
    let distribution = batch.distribution(mc.histogram_bins);

    Ok(HestonSimulation {
        paths: batch.paths,
        distribution,
        statistics: HestonStatistics {
            terminal,
            analytic,
            feller_condition: heston.feller_condition(),
            feller_satisfied: heston.feller_satisfied(),
            vol_of_vol: heston.vol_of_vol(),
            floor_hits: batch.floor_hits,
        },
    })
}

pub fn simulate_merton(params: &MertonParams, mc: &McConfig) -> EngineResult<MertonSimulation> {
    simulate_merton_with(params, mc, &RngFactory::new(mc.seed))
}

/// [`simulate_merton`] drawing from an explicit source factory
pub fn simulate_merton_with<F: SourceFactory>(
    params: &MertonParams,
    mc: &McConfig,
    factory: &F,
) -> EngineResult<MertonSimulation> {
    let merton = Merton::new(*params)?;
    mc.validate()?;

    let black_scholes =
        AnalyticPrices::black_scholes(params.s0, params.strike, params.r, params.sigma, params.t)?;
    let jump_diffusion = AnalyticPrices {
        call: merton_price(params, OptionType::Call)?,
        put: merton_price(params, OptionType::Put)?,
        volatility: params.sigma,
    };

    let batch = run_batch(&merton, factory, mc)?;
    let terminal = batch.statistics(params.strike, params.r)?;
    let distribution = batch.distribution(mc.histogram_bins);

    let average_jump_size = if batch.jumps.is_empty() {
        0.0
    } else {
        batch.jumps.iter().map(|j| j.jump_size).sum::<f64>() / batch.jumps.len() as f64
    };
    let jump_frequency = batch.total_jumps as f64 / (batch.path_count() as f64 * params.t);

    Ok(MertonSimulation {
        paths: batch.paths,
        jumps: batch.jumps,
        distribution,
        results: MertonStatistics {
            terminal,
            black_scholes,
            jump_diffusion,
            total_jumps: batch.total_jumps,
            average_jump_size,
            jump_frequency,
        },
    })
}

pub fn kelly_analysis(params: &KellyParams, seed: u64) -> EngineResult<KellyResult> {
    kelly::analyze(params, &RngFactory::new(seed))
}
