// src/mc/mc_engine.rs
use crate::error::{validation::*, EngineError, EngineResult};
use crate::math_utils::Timer;
use crate::mc::stats::{histogram, BatchMoments, HistogramBin};
use crate::models::model::{JumpEvent, PathSimulator};
use crate::rng::SourceFactory;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

/// Largest histogram a batch will build
pub const MAX_HISTOGRAM_BINS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McConfig {
    /// Paths simulated; every one contributes to the statistics
    pub paths: usize,
    /// Leading paths kept in full for inspection
    pub display_paths: usize,
    pub histogram_bins: usize,
    pub seed: u64,
}

impl McConfig {
    /// Validate the Monte Carlo configuration
    pub fn validate(&self) -> EngineResult<()> {
        validate_paths(self.paths)?;
        validate_count("histogram_bins", self.histogram_bins, MAX_HISTOGRAM_BINS)?;
        Ok(())
    }
}

impl Default for McConfig {
    fn default() -> Self {
        McConfig {
            paths: 1_000,
            display_paths: 10,
            histogram_bins: 20,
            seed: 42,
        }
    }
}

/// Raw output of one batch run.
#[derive(Debug, Clone)]
pub struct SimulationBatch<P> {
    /// The first `display_paths` paths, in path order
    pub paths: Vec<Vec<P>>,
    /// One terminal value per simulated path, in path order
    pub terminal_values: Vec<f64>,
    /// Jump events from every path, ordered by path then time
    pub jumps: Vec<JumpEvent>,
    /// Individual jumps across the batch
    pub total_jumps: u64,
    pub floor_hits: u64,
    pub horizon: f64,
}

impl<P> SimulationBatch<P> {
    pub fn path_count(&self) -> usize {
        self.terminal_values.len()
    }

    /// Terminal-value and option statistics over the whole batch
    pub fn statistics(&self, strike: f64, r: f64) -> EngineResult<TerminalStatistics> {
        TerminalStatistics::from_terminal_values(&self.terminal_values, strike, r, self.horizon)
    }

    pub fn distribution(&self, bins: usize) -> Vec<HistogramBin> {
        histogram(&self.terminal_values, bins)
    }
}

/// Descriptive statistics of a batch's terminal values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminalStatistics {
    pub paths: usize,
    pub mean: f64,
    /// Population standard deviation (divides by N)
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// e^(-rT) · mean(max(S_T - K, 0))
    pub mc_call: f64,
    /// e^(-rT) · mean(max(K - S_T, 0))
    pub mc_put: f64,
    pub call_std_error: f64,
    pub put_std_error: f64,
}

impl TerminalStatistics {
    pub fn from_terminal_values(
        terminals: &[f64],
        strike: f64,
        r: f64,
        t: f64,
    ) -> EngineResult<Self> {
        if terminals.is_empty() {
            return Err(EngineError::InvalidConfiguration {
                field: "terminal_values".to_string(),
                reason: "no paths to aggregate".to_string(),
            });
        }

        let moments = BatchMoments::collect(terminals, strike);
        let discount = (-r * t).exp();

        let stats = TerminalStatistics {
            paths: terminals.len(),
            mean: moments.terminal.mean(),
            std_dev: moments.terminal.std_dev(),
            min: moments.min,
            max: moments.max,
            mc_call: discount * moments.call_payoff.mean(),
            mc_put: discount * moments.put_payoff.mean(),
            call_std_error: discount * moments.call_payoff.std_error(),
            put_std_error: discount * moments.put_payoff.std_error(),
        };

        for (name, value) in [
            ("mean", stats.mean),
            ("std_dev", stats.std_dev),
            ("mc_call", stats.mc_call),
            ("mc_put", stats.mc_put),
        ] {
            if !value.is_finite() {
                return Err(EngineError::NumericalInstability {
                    method: "Monte Carlo".to_string(),
                    reason: format!("{} is not finite: {}", name, value),
                });
            }
        }

        Ok(stats)
    }
}

struct PathOutcome<P> {
    points: Option<Vec<P>>,
    terminal: f64,
    jumps: Vec<JumpEvent>,
    jump_count: u64,
    floor_hits: u64,
}

/// Run `cfg.paths` independent paths of `model` in parallel.
///
/// Path `i` draws from `factory.source_for_path(i)`, so the batch is
/// reproducible for a given factory regardless of how rayon splits it.
pub fn run_batch<M, F>(model: &M, factory: &F, cfg: &McConfig) -> EngineResult<SimulationBatch<M::Point>>
where
    M: PathSimulator,
    F: SourceFactory,
{
    run_batch_with_cancel(model, factory, cfg, &AtomicBool::new(false))
}

/// [`run_batch`] with a flag checked before each path starts.
///
/// Paths already running finish; once the flag is set no new path begins and
/// the call returns [`EngineError::Cancelled`].
pub fn run_batch_with_cancel<M, F>(
    model: &M,
    factory: &F,
    cfg: &McConfig,
    cancel: &AtomicBool,
) -> EngineResult<SimulationBatch<M::Point>>
where
    M: PathSimulator,
    F: SourceFactory,
{
    cfg.validate()?;

    let timer = Timer::new();
    debug!(
        model = model.name(),
        paths = cfg.paths,
        steps = model.steps(),
        "starting batch"
    );

    let started = AtomicUsize::new(0);
    let outcomes = (0..cfg.paths)
        .into_par_iter()
        .map(|i| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            started.fetch_add(1, Ordering::Relaxed);

            let mut source = factory.source_for_path(i as u64);
            let path = model.simulate_path(&mut source);

            let jumps = path
                .jumps
                .into_iter()
                .map(|event| JumpEvent { path: i, ..event })
                .collect();

            Some(PathOutcome {
                points: (i < cfg.display_paths).then_some(path.points),
                terminal: path.terminal,
                jumps,
                jump_count: path.jump_count,
                floor_hits: path.floor_hits,
            })
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| EngineError::Cancelled {
            completed: started.load(Ordering::Relaxed),
            requested: cfg.paths,
        })?;

    let mut batch = SimulationBatch {
        paths: Vec::with_capacity(cfg.display_paths.min(cfg.paths)),
        terminal_values: Vec::with_capacity(cfg.paths),
        jumps: Vec::new(),
        total_jumps: 0,
        floor_hits: 0,
        horizon: model.horizon(),
    };

    for outcome in outcomes {
        if let Some(points) = outcome.points {
            batch.paths.push(points);
        }
        batch.terminal_values.push(outcome.terminal);
        batch.jumps.extend(outcome.jumps);
        batch.total_jumps += outcome.jump_count;
        batch.floor_hits += outcome.floor_hits;
    }

    debug!(
        model = model.name(),
        paths = cfg.paths,
        jumps = batch.total_jumps,
        floor_hits = batch.floor_hits,
        elapsed_ms = timer.elapsed_ms(),
        "batch complete"
    );

    Ok(batch)
}
