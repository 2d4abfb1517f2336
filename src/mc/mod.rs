pub mod mc_engine;
pub mod payoffs;
pub mod stats;
