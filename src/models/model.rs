// src/models/model.rs
use crate::rng::VariateSource;
use serde::{Deserialize, Serialize};

/// Floor applied to variance (and to √variance inside the diffusion term).
pub const VARIANCE_FLOOR: f64 = 0.001;

/// Floor applied to simulated prices so a path never reaches zero.
pub const PRICE_FLOOR: f64 = 0.001;

/// A model that can produce one discretised path from a variate stream.
///
/// Implementations hold an already validated, immutable parameter record;
/// `simulate_path` must not touch any state besides `source`.
pub trait PathSimulator: Sync {
    type Point: Clone + Send;

    fn name(&self) -> &'static str;
    fn horizon(&self) -> f64;
    fn steps(&self) -> usize;
    fn simulate_path<S: VariateSource>(&self, source: &mut S) -> SimulatedPath<Self::Point>;
}

/// Everything one path run hands back to the aggregator.
#[derive(Debug, Clone)]
pub struct SimulatedPath<P> {
    /// `steps + 1` points, starting at the initial state at time 0
    pub points: Vec<P>,
    pub terminal: f64,
    pub jumps: Vec<JumpEvent>,
    /// Individual jumps, summed over every event on the path
    pub jump_count: u64,
    /// Steps where a state floor replaced the raw update
    pub floor_hits: u64,
}

/// A step on which at least one Poisson jump fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpEvent {
    /// Index of the path inside its batch
    pub path: usize,
    pub time: f64,
    pub resulting_price: f64,
    /// Sum of the log-jump sizes drawn on this step
    pub jump_size: f64,
    pub jump_count: u64,
}

/// Time of grid point `step` on an `steps`-interval grid over `[0, horizon]`.
///
/// The last point is pinned to `horizon` exactly.
#[inline]
pub fn time_at(step: usize, steps: usize, horizon: f64) -> f64 {
    if step >= steps {
        horizon
    } else {
        horizon * step as f64 / steps as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_grid_endpoints() {
        let steps = 252;
        let horizon = 0.7;
        assert_eq!(time_at(0, steps, horizon), 0.0);
        assert_eq!(time_at(steps, steps, horizon), horizon);

        let mut prev = -1.0;
        for i in 0..=steps {
            let t = time_at(i, steps, horizon);
            assert!(t > prev, "time grid must strictly increase");
            prev = t;
        }
    }
}
