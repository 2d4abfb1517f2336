// tests/scenario_test.rs
//! Deterministic scenarios driven by a zero-shock variate source.
use quantlab::explainers::{simulate_heston_with, simulate_merton_with};
use quantlab::mc::mc_engine::{run_batch, McConfig};
use quantlab::models::heston::{Heston, HestonParams};
use quantlab::models::merton::{Merton, MertonParams};
use quantlab::models::model::PathSimulator;
use quantlab::rng::{SourceFactory, VariateSource};

/// Every normal draw is 0 and every uniform is 0.5.
struct ZeroShock;

impl VariateSource for ZeroShock {
    fn uniform(&mut self) -> f64 {
        0.5
    }

    fn standard_normal(&mut self) -> f64 {
        0.0
    }
}

struct ZeroShockFactory;

impl SourceFactory for ZeroShockFactory {
    type Source = ZeroShock;

    fn source_for_path(&self, _path_id: u64) -> ZeroShock {
        ZeroShock
    }
}

#[test]
fn test_heston_zero_shocks_without_drift() {
    let params = HestonParams {
        s0: 100.0,
        v0: 0.04,
        r: 0.0,
        kappa: 2.0,
        theta: 0.04,
        xi: 0.3,
        rho: -0.7,
        t: 1.0,
        steps: 252,
        strike: 100.0,
    };
    let mc = McConfig {
        paths: 1,
        ..Default::default()
    };

    let result = simulate_heston_with(&params, &mc, &ZeroShockFactory).expect("Valid parameters");

    assert_eq!(result.paths.len(), 1);
    let path = &result.paths[0];
    assert_eq!(path.len(), 253);
    for point in path {
        assert_eq!(point.price, 100.0);
        assert_eq!(point.variance, 0.04);
    }
    assert_eq!(result.statistics.terminal.std_dev, 0.0);
}

#[test]
fn test_heston_zero_shocks_compound_at_rate() {
    let params = HestonParams {
        r: 0.05,
        ..Default::default()
    };
    let heston = Heston::new(params).expect("Valid parameters");

    let path = heston.simulate_path(&mut ZeroShock);
    let dt = heston.dt();

    let mut expected = params.s0;
    assert_eq!(path.points[0].price, expected);
    for point in &path.points[1..] {
        expected += params.r * expected * dt;
        assert_eq!(point.price, expected);
        assert_eq!(point.variance, 0.04, "V0 = θ stays put without shocks");
    }
}

#[test]
fn test_merton_zero_shocks_reduce_to_deterministic_gbm() {
    let params = MertonParams {
        s0: 100.0,
        r: 0.05,
        sigma: 0.2,
        lambda: 0.0,
        mu_j: -0.1,
        sigma_j: 0.15,
        t: 1.0,
        steps: 252,
        strike: 100.0,
    };
    let mc = McConfig {
        paths: 5,
        ..Default::default()
    };

    let result = simulate_merton_with(&params, &mc, &ZeroShockFactory).expect("Valid parameters");

    let expected = params.s0 * ((params.r - 0.5 * params.sigma * params.sigma) * params.t).exp();
    let terminal = result.results.terminal.mean;

    assert!(result.jumps.is_empty());
    assert!(
        ((terminal - expected) / expected).abs() < 1e-12,
        "S_T = {}, expected {}",
        terminal,
        expected
    );
}

#[test]
fn test_deterministic_paths_have_zero_spread() {
    let merton = Merton::new(MertonParams {
        lambda: 0.0,
        steps: 30,
        ..Default::default()
    })
    .expect("Valid parameters");
    let mc = McConfig {
        paths: 500,
        ..Default::default()
    };

    let batch = run_batch(&merton, &ZeroShockFactory, &mc).expect("Valid configuration");
    let stats = batch.statistics(100.0, 0.05).expect("non-empty batch");
    let bins = batch.distribution(20);

    assert_eq!(stats.std_dev, 0.0);
    assert_eq!(stats.min, stats.max);
    assert_eq!(stats.call_std_error, 0.0);
    assert_eq!(bins.len(), 1);
    assert_eq!(bins[0].count, 500);
}

#[test]
fn test_time_grid_ends_at_horizon() {
    let params = MertonParams {
        t: 0.75,
        steps: 13,
        ..Default::default()
    };
    let merton = Merton::new(params).expect("Valid parameters");
    let path = merton.simulate_path(&mut ZeroShock);

    assert_eq!(path.points.first().map(|p| p.time), Some(0.0));
    assert_eq!(path.points.last().map(|p| p.time), Some(0.75));
    assert!(path.points.windows(2).all(|w| w[0].time < w[1].time));
}
