// src/rng.rs
//! Random Variate Generation for Monte Carlo Simulations
//!
//! # Design
//!
//! Every simulator draws its randomness through the [`VariateSource`] trait,
//! never from a global generator:
//! 1. **Reproducibility**: same seed → same batch, whatever the thread count
//! 2. **Parallel safety**: each path owns its own stream (see [`RngFactory`])
//! 3. **Testability**: a scripted source can replace the generator entirely
//!
//! # Box-Muller Transform (cosine branch)
//!
//! ```text
//! Z = √(-2ln(U₁)) * cos(2πU₂),   U₁, U₂ ~ Uniform(0,1)
//! ```
//!
//! # Poisson by multiplication
//!
//! ```text
//! k = min { n : U₁·U₂·…·Uₙ ≤ e^(-λ) } - 1
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Open01;
use std::f64::consts::PI;

/// Source of uniform, normal and Poisson variates.
///
/// Only [`uniform`](VariateSource::uniform) is required; the other draws are
/// derived from it. Implementations may override them (test doubles do).
pub trait VariateSource {
    /// One draw from the open interval (0, 1).
    fn uniform(&mut self) -> f64;

    /// One standard normal draw via Box-Muller (cosine branch).
    fn standard_normal(&mut self) -> f64 {
        let u1 = self.uniform();
        let u2 = self.uniform();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Poisson draw with the given mean. A non-positive mean yields 0 without
    /// consuming any uniforms.
    ///
    /// Means above [`POISSON_CHUNK_MEAN`] are drawn as a sum of independent
    /// chunks so `e^(-mean)` never underflows. An infinite mean saturates.
    fn poisson(&mut self, mean: f64) -> u64 {
        if !(mean > 0.0) {
            return 0;
        }
        if mean.is_infinite() {
            return u64::MAX;
        }
        let mut remaining = mean;
        let mut count = 0;
        while remaining > POISSON_CHUNK_MEAN {
            count += multiplicative_poisson(self, POISSON_CHUNK_MEAN);
            remaining -= POISSON_CHUNK_MEAN;
        }
        count + multiplicative_poisson(self, remaining)
    }

    /// Pair of standard normals with Pearson correlation `rho`.
    fn correlated_normals(&mut self, rho: f64) -> (f64, f64) {
        let u1 = self.standard_normal();
        let u2 = self.standard_normal();
        correlate(rho, u1, u2)
    }
}

impl<S: VariateSource + ?Sized> VariateSource for &mut S {
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }

    fn standard_normal(&mut self) -> f64 {
        (**self).standard_normal()
    }

    fn poisson(&mut self, mean: f64) -> u64 {
        (**self).poisson(mean)
    }

    fn correlated_normals(&mut self, rho: f64) -> (f64, f64) {
        (**self).correlated_normals(rho)
    }
}

/// Largest mean drawn by a single multiplicative run; `e^(-500)` is still a
/// normal f64.
pub const POISSON_CHUNK_MEAN: f64 = 500.0;

fn multiplicative_poisson<S: VariateSource + ?Sized>(source: &mut S, mean: f64) -> u64 {
    let threshold = (-mean).exp();
    let mut count: u64 = 0;
    let mut product = 1.0;
    loop {
        count += 1;
        product *= source.uniform();
        if product <= threshold {
            return count - 1;
        }
    }
}

/// Couple two independent normals: `w1 = u1`, `w2 = ρ·u1 + √(1-ρ²)·u2`.
#[inline]
pub fn correlate(rho: f64, u1: f64, u2: f64) -> (f64, f64) {
    (u1, rho * u1 + (1.0 - rho * rho).max(0.0).sqrt() * u2)
}

/// [`VariateSource`] backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct SeededSource<R: Rng = StdRng> {
    rng: R,
}

impl SeededSource<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SeededSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> VariateSource for SeededSource<R> {
    #[inline]
    fn uniform(&mut self) -> f64 {
        self.rng.sample(Open01)
    }
}

/// Hands out one independent source per path (or per worker).
pub trait SourceFactory: Sync {
    type Source: VariateSource;

    fn source_for_path(&self, path_id: u64) -> Self::Source;
}

/// RNG factory for reproducible parallel simulations
#[derive(Debug, Clone, Copy)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Create a standard RNG for a specific path/thread
    pub fn create_std_rng(&self, path_id: u64) -> StdRng {
        StdRng::seed_from_u64(self.base_seed.wrapping_add(path_id))
    }
}

impl SourceFactory for RngFactory {
    type Source = SeededSource<StdRng>;

    fn source_for_path(&self, path_id: u64) -> Self::Source {
        SeededSource::new(self.create_std_rng(path_id))
    }
}
