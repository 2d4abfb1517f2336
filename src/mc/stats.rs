//! Associative reductions over terminal values
//!
//! Everything here combines with `merge`, so a batch can be folded per
//! worker and the partial results joined in any grouping:
//! ```text
//! merge(merge(a, b), c) == merge(a, merge(b, c))
//! ```
//! Moments use Welford's update and Chan's pairwise combination:
//! ```text
//! δ = x̄_b - x̄_a,   n = n_a + n_b
//! x̄ = x̄_a + δ n_b / n,   M₂ = M₂_a + M₂_b + δ² n_a n_b / n
//! ```

use super::payoffs::OptionType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Count, mean and sum of squared deviations of a stream of values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMoments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn merge(self, other: RunningMoments) -> RunningMoments {
        if other.count == 0 {
            return self;
        }
        if self.count == 0 {
            return other;
        }
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;
        RunningMoments {
            count: self.count + other.count,
            mean: self.mean + delta * n_b / n,
            m2: self.m2 + other.m2 + delta * delta * n_a * n_b / n,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance (divides by N)
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Standard error of the mean, using the N-1 sample variance
    pub fn std_error(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            let n = self.count as f64;
            (self.m2 / (n - 1.0) / n).sqrt()
        }
    }
}

/// Terminal-value moments, option payoff moments and range of one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchMoments {
    pub terminal: RunningMoments,
    pub call_payoff: RunningMoments,
    pub put_payoff: RunningMoments,
    pub min: f64,
    pub max: f64,
}

impl Default for BatchMoments {
    fn default() -> Self {
        BatchMoments {
            terminal: RunningMoments::default(),
            call_payoff: RunningMoments::default(),
            put_payoff: RunningMoments::default(),
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl BatchMoments {
    pub fn push(mut self, terminal: f64, strike: f64) -> Self {
        self.terminal.push(terminal);
        self.call_payoff.push(OptionType::Call.payoff(terminal, strike));
        self.put_payoff.push(OptionType::Put.payoff(terminal, strike));
        self.min = self.min.min(terminal);
        self.max = self.max.max(terminal);
        self
    }

    pub fn merge(self, other: BatchMoments) -> Self {
        BatchMoments {
            terminal: self.terminal.merge(other.terminal),
            call_payoff: self.call_payoff.merge(other.call_payoff),
            put_payoff: self.put_payoff.merge(other.put_payoff),
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Parallel fold over a slice of terminal values
    pub fn collect(terminals: &[f64], strike: f64) -> Self {
        terminals
            .par_iter()
            .fold(BatchMoments::default, |acc, &x| acc.push(x, strike))
            .reduce(BatchMoments::default, BatchMoments::merge)
    }
}

/// One equal-width bucket of the terminal distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// count / N
    pub frequency: f64,
}

/// Partition `values` into `bins` equal-width buckets spanning `[min, max]`.
///
/// The maximum lands in the last bucket. When every value is identical the
/// width would be zero, so a single bucket holding all values is returned.
/// An empty input or `bins == 0` gives an empty histogram.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (min, max) = values
        .par_iter()
        .fold(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), &x| (lo.min(x), hi.max(x)),
        )
        .reduce(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |a, b| (a.0.min(b.0), a.1.max(b.1)),
        );

    let total = values.len();
    let width = (max - min) / bins as f64;

    if !(width > 0.0) {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: total,
            frequency: 1.0,
        }];
    }

    let counts = values
        .par_iter()
        .fold(
            || vec![0usize; bins],
            |mut acc, &x| {
                let idx = (((x - min) / width).floor() as usize).min(bins - 1);
                acc[idx] += 1;
                acc
            },
        )
        .reduce(
            || vec![0usize; bins],
            |mut a, b| {
                for (slot, c) in a.iter_mut().zip(b) {
                    *slot += c;
                }
                a
            },
        );

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + i as f64 * width,
            upper: if i + 1 == bins {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count,
            frequency: count as f64 / total as f64,
        })
        .collect()
}
