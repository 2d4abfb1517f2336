//! # quantlab: Simulation engine for quantitative-finance explainers
//!
//! The numerical core behind three interactive explainers:
//!
//! - **Heston** stochastic volatility: correlated two-factor Euler paths with a
//!   variance floor, Feller diagnostics and a Black-Scholes reference
//! - **Merton** jump-diffusion: exact compensated log-updates with compound
//!   Poisson jumps, jump statistics and the Merton series price
//! - **Kelly** criterion: optimal fraction, growth rate and averaged capital
//!   trajectories for several betting policies
//!
//! Every call is a pure function of its parameter record and seed. Paths run
//! in parallel with Rayon, one independent random stream per path.
//!
//! ## Quick Start
//!
//! ```rust
//! use quantlab::explainers::simulate_heston;
//! use quantlab::mc::mc_engine::McConfig;
//! use quantlab::models::heston::HestonParams;
//!
//! let mc = McConfig { paths: 500, ..Default::default() };
//! let result = simulate_heston(&HestonParams::default(), &mc).expect("Valid parameters");
//!
//! let stats = &result.statistics;
//! println!(
//!     "MC call {:.4} ± {:.4} vs Black-Scholes {:.4}",
//!     stats.terminal.mc_call, stats.terminal.call_std_error, stats.analytic.call
//! );
//! ```

// Module declarations
pub mod analytics;
pub mod error;
pub mod explainers;
pub mod kelly;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod rng;

// Re-export commonly used types for convenience
pub use error::{EngineError, EngineResult};
