// demos/explainers.rs
//! Runs the three explainers with their default inputs.
//!
//! `cargo run --example explainers` prints a summary; pass `--json` to dump
//! the full result records instead.
use quantlab::explainers::{kelly_analysis, simulate_heston, simulate_merton};
use quantlab::kelly::KellyParams;
use quantlab::mc::mc_engine::McConfig;
use quantlab::models::heston::HestonParams;
use quantlab::models::merton::MertonParams;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let json = std::env::args().any(|arg| arg == "--json");
    let mc = McConfig::default();

    let heston = simulate_heston(&HestonParams::default(), &mc)?;
    let merton = simulate_merton(&MertonParams::default(), &mc)?;
    let kelly = kelly_analysis(&KellyParams::default(), mc.seed)?;

    if json {
        let bundle = serde_json::json!({
            "heston": heston,
            "merton": merton,
            "kelly": kelly,
        });
        println!("{}", serde_json::to_string_pretty(&bundle)?);
        return Ok(());
    }

    let h = &heston.statistics;
    println!("--- Heston stochastic volatility ({} paths) ---", h.terminal.paths);
    println!("Mean S_T:            {:.4} ± {:.4}", h.terminal.mean, h.terminal.std_dev);
    println!("Range:               [{:.4}, {:.4}]", h.terminal.min, h.terminal.max);
    println!(
        "MC call / put:       {:.4} / {:.4}",
        h.terminal.mc_call, h.terminal.mc_put
    );
    println!(
        "Black-Scholes:       {:.4} / {:.4} (σ = {:.4})",
        h.analytic.call, h.analytic.put, h.analytic.volatility
    );
    println!(
        "Feller 2κθ/ξ²:       {:.4} ({})",
        h.feller_condition,
        if h.feller_satisfied { "satisfied" } else { "violated" }
    );
    println!("Variance floor hits: {}", h.floor_hits);

    let m = &merton.results;
    println!("\n--- Merton jump-diffusion ({} paths) ---", m.terminal.paths);
    println!("Mean S_T:            {:.4} ± {:.4}", m.terminal.mean, m.terminal.std_dev);
    println!(
        "MC call / put:       {:.4} / {:.4}",
        m.terminal.mc_call, m.terminal.mc_put
    );
    println!(
        "Merton series:       {:.4} / {:.4}",
        m.jump_diffusion.call, m.jump_diffusion.put
    );
    println!(
        "Black-Scholes:       {:.4} / {:.4}",
        m.black_scholes.call, m.black_scholes.put
    );
    println!(
        "Jumps:               {} ({:.3} per path-year, mean size {:.4})",
        m.total_jumps, m.jump_frequency, m.average_jump_size
    );

    println!("\n--- Kelly criterion ---");
    println!("Optimal fraction:    {:.4}", kelly.optimal_fraction);
    match kelly.expected_growth {
        Some(g) => println!("Growth per bet:      {:.6}", g),
        None => println!("Growth per bet:      undefined (ruin on one loss)"),
    }
    for outcome in &kelly.strategies {
        println!(
            "{:<14} f = {:.3}  final capital {:>12.2}  ruined {}",
            outcome.name, outcome.fraction, outcome.final_capital, outcome.ruined_runs
        );
    }

    Ok(())
}
