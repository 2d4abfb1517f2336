// tests/integration_test.rs
use quantlab::analytics::bs_analytic;
use quantlab::explainers::{simulate_heston, simulate_merton};
use quantlab::mc::mc_engine::McConfig;
use quantlab::mc::payoffs::OptionType;
use quantlab::models::heston::HestonParams;
use quantlab::models::merton::MertonParams;

fn convergence_config(seed: u64) -> McConfig {
    McConfig {
        paths: 10_000,
        seed,
        ..Default::default()
    }
}

#[test]
fn test_heston_mc_vs_black_scholes_low_vol_of_vol() {
    let params = HestonParams {
        xi: 0.01,
        steps: 50,
        ..Default::default()
    };

    let result = simulate_heston(&params, &convergence_config(42)).expect("Valid configuration");
    let terminal = &result.statistics.terminal;
    let analytic = &result.statistics.analytic;

    println!("\nHeston MC call: {} ± {}", terminal.mc_call, terminal.call_std_error);
    println!("Black-Scholes call: {}", analytic.call);
    println!("Heston MC put: {} ± {}", terminal.mc_put, terminal.put_std_error);
    println!("Black-Scholes put: {}", analytic.put);

    let call_error = (terminal.mc_call - analytic.call).abs();
    let put_error = (terminal.mc_put - analytic.put).abs();

    assert!(
        call_error < 3.0 * terminal.call_std_error,
        "call error {} exceeds three standard errors ({})",
        call_error,
        terminal.call_std_error
    );
    assert!(
        put_error < 3.0 * terminal.put_std_error,
        "put error {} exceeds three standard errors ({})",
        put_error,
        terminal.put_std_error
    );
}

#[test]
fn test_merton_without_jumps_matches_black_scholes() {
    let params = MertonParams {
        lambda: 0.0,
        steps: 20,
        ..Default::default()
    };

    let result = simulate_merton(&params, &convergence_config(7)).expect("Valid configuration");
    let terminal = &result.results.terminal;
    let analytic = bs_analytic::bs_call_price(100.0, 100.0, 0.05, 0.2, 1.0).expect("valid inputs");

    println!("\nMerton (λ=0) MC call: {} ± {}", terminal.mc_call, terminal.call_std_error);
    println!("Black-Scholes call: {}", analytic);

    assert!(result.jumps.is_empty());
    assert_eq!(result.results.total_jumps, 0);
    assert_eq!(result.results.average_jump_size, 0.0);
    assert!((terminal.mc_call - analytic).abs() < 3.0 * terminal.call_std_error);
    assert_eq!(result.results.black_scholes.call, analytic);
}

#[test]
fn test_merton_mc_vs_series_price() {
    let params = MertonParams {
        steps: 50,
        ..Default::default()
    };

    let result = simulate_merton(&params, &convergence_config(11)).expect("Valid configuration");
    let terminal = &result.results.terminal;
    let series_call = bs_analytic::merton_price(&params, OptionType::Call).expect("valid inputs");
    let series_put = bs_analytic::merton_price(&params, OptionType::Put).expect("valid inputs");

    println!("\nMerton MC call: {} ± {}", terminal.mc_call, terminal.call_std_error);
    println!("Merton series call: {}", series_call);
    println!("Jumps: {} ({} per path-year)", result.results.total_jumps, result.results.jump_frequency);

    assert_eq!(result.results.jump_diffusion.call, series_call);
    assert!((terminal.mc_call - series_call).abs() < 3.0 * terminal.call_std_error);
    assert!((terminal.mc_put - series_put).abs() < 3.0 * terminal.put_std_error);

    // λ = 1 jump per year over 10,000 path-years
    assert!(
        (result.results.jump_frequency - 1.0).abs() < 0.1,
        "jump frequency {}",
        result.results.jump_frequency
    );
    assert!(result.results.average_jump_size < 0.0, "μ_J = -0.1 gives downward jumps");
}

#[test]
fn test_merton_risk_neutral_mean() {
    let params = MertonParams {
        lambda: 3.0,
        mu_j: -0.05,
        sigma_j: 0.1,
        steps: 50,
        ..Default::default()
    };

    let result = simulate_merton(&params, &convergence_config(5)).expect("Valid configuration");
    let terminal = &result.results.terminal;
    let forward = params.s0 * (params.r * params.t).exp();
    let std_error = terminal.std_dev / (terminal.paths as f64).sqrt();

    println!("\nMean S_T: {} (forward {}, SE {})", terminal.mean, forward, std_error);

    assert!(
        (terminal.mean - forward).abs() < 3.0 * std_error,
        "compensated drift should keep E[S_T] at the forward"
    );
}

#[test]
fn test_histogram_counts_match_batch() {
    for (paths, bins) in [(1, 20), (37, 20), (1_000, 7), (2_500, 50)] {
        let mc = McConfig {
            paths,
            histogram_bins: bins,
            ..Default::default()
        };
        let merton = simulate_merton(&MertonParams::default(), &mc).expect("Valid configuration");
        let heston = simulate_heston(&HestonParams::default(), &mc).expect("Valid configuration");

        assert_eq!(merton.distribution.iter().map(|b| b.count).sum::<usize>(), paths);
        assert_eq!(heston.distribution.iter().map(|b| b.count).sum::<usize>(), paths);
    }
}

#[test]
fn test_heston_variance_never_below_floor() {
    // Strong Feller violation: the floor is exercised
    let params = HestonParams {
        kappa: 0.5,
        theta: 0.02,
        v0: 0.02,
        xi: 1.0,
        steps: 100,
        ..Default::default()
    };
    let mc = McConfig {
        paths: 200,
        display_paths: 200,
        ..Default::default()
    };

    let result = simulate_heston(&params, &mc).expect("Valid configuration");

    assert!(!result.statistics.feller_satisfied);
    assert!(result.statistics.floor_hits > 0);
    for path in &result.paths {
        for point in path {
            assert!(point.variance >= 0.001, "variance {} below floor", point.variance);
            assert!(point.price > 0.0);
        }
    }
}
