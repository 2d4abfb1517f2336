// scripts/benchmark.rs
use quantlab::explainers::{kelly_analysis, simulate_heston, simulate_merton};
use quantlab::kelly::KellyParams;
use quantlab::math_utils::Timer;
use quantlab::mc::mc_engine::McConfig;
use quantlab::models::heston::HestonParams;
use quantlab::models::merton::MertonParams;
use quantlab::EngineResult;
use serde::Serialize;
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    rayon_threads: usize,
    rustflags: String,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_model: Self::cpu_model(),
            cpu_cores: num_cpus::get(),
            rayon_threads: rayon::current_num_threads(),
            rustflags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
        }
    }

    #[cfg(target_os = "linux")]
    fn cpu_model() -> String {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|line| line.starts_with("model name"))
                    .and_then(|line| line.split(':').nth(1))
                    .map(|s| s.trim().to_string())
            })
            .unwrap_or_else(|| "Unknown CPU".to_string())
    }

    #[cfg(target_os = "macos")]
    fn cpu_model() -> String {
        std::process::Command::new("sysctl")
            .args(["-n", "machdep.cpu.brand_string"])
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|_| "Unknown CPU".to_string())
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn cpu_model() -> String {
        "Unknown CPU".to_string()
    }
}

#[derive(Debug, Serialize)]
struct BenchmarkResult {
    name: String,
    paths: usize,
    steps: usize,
    time_ms: f64,
    paths_per_sec: f64,
    value: f64,
    reference: Option<f64>,
    std_error: Option<f64>,
}

impl BenchmarkResult {
    fn print(&self) {
        let reference = self
            .reference
            .map(|v| format!("{:.6}", v))
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "{:<32} {:>9} {:>10.2} {:>14.0} {:>12.6} {:>12}",
            self.name, self.paths, self.time_ms, self.paths_per_sec, self.value, reference
        );
    }
}

#[derive(Debug, Serialize)]
struct BenchmarkReport {
    date: String,
    system: SystemInfo,
    results: Vec<BenchmarkResult>,
}

fn throughput(paths: usize, time_ms: f64) -> f64 {
    paths as f64 / (time_ms / 1000.0).max(f64::EPSILON)
}

fn heston_benchmarks(path_counts: &[usize]) -> EngineResult<Vec<BenchmarkResult>> {
    let params = HestonParams::default();
    let mut results = Vec::new();

    for &paths in path_counts {
        info!(paths, "benchmarking Heston");
        let mc = McConfig {
            paths,
            ..Default::default()
        };

        let timer = Timer::new();
        let sim = simulate_heston(&params, &mc)?;
        let time_ms = timer.elapsed_ms();

        results.push(BenchmarkResult {
            name: format!("Heston Euler call ({}k)", paths / 1000),
            paths,
            steps: params.steps,
            time_ms,
            paths_per_sec: throughput(paths, time_ms),
            value: sim.statistics.terminal.mc_call,
            reference: Some(sim.statistics.analytic.call),
            std_error: Some(sim.statistics.terminal.call_std_error),
        });
    }

    Ok(results)
}

fn merton_benchmarks(path_counts: &[usize]) -> EngineResult<Vec<BenchmarkResult>> {
    let params = MertonParams::default();
    let mut results = Vec::new();

    for &paths in path_counts {
        info!(paths, "benchmarking Merton");
        let mc = McConfig {
            paths,
            ..Default::default()
        };

        let timer = Timer::new();
        let sim = simulate_merton(&params, &mc)?;
        let time_ms = timer.elapsed_ms();

        results.push(BenchmarkResult {
            name: format!("Merton jump-diffusion call ({}k)", paths / 1000),
            paths,
            steps: params.steps,
            time_ms,
            paths_per_sec: throughput(paths, time_ms),
            value: sim.results.terminal.mc_call,
            reference: Some(sim.results.jump_diffusion.call),
            std_error: Some(sim.results.terminal.call_std_error),
        });
    }

    Ok(results)
}

fn kelly_benchmark() -> EngineResult<BenchmarkResult> {
    let params = KellyParams {
        num_bets: 1_000,
        num_simulations: 10_000,
        ..Default::default()
    };
    info!(runs = params.num_simulations, "benchmarking Kelly");

    let timer = Timer::new();
    let result = kelly_analysis(&params, 42)?;
    let time_ms = timer.elapsed_ms();

    let runs = params.num_simulations * result.strategies.len();
    let full_kelly = result
        .strategies
        .first()
        .map_or(params.initial_capital, |o| o.final_capital);

    Ok(BenchmarkResult {
        name: "Kelly strategies (4 x 10k runs)".to_string(),
        paths: runs,
        steps: params.num_bets,
        time_ms,
        paths_per_sec: throughput(runs, time_ms),
        value: full_kelly,
        reference: None,
        std_error: None,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("quantlab Benchmark Suite");
    println!("========================\n");

    let system = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system.os);
    println!("  CPU: {}", system.cpu_model);
    println!("  CPU Cores: {}", system.cpu_cores);
    println!("  Rayon Threads: {}", system.rayon_threads);
    println!("  RUSTFLAGS: {}", system.rustflags);
    println!();

    let path_counts = [10_000, 100_000];
    let mut results = heston_benchmarks(&path_counts)?;
    results.extend(merton_benchmarks(&path_counts)?);
    results.push(kelly_benchmark()?);

    println!(
        "\n{:<32} {:>9} {:>10} {:>14} {:>12} {:>12}",
        "Benchmark", "Paths", "Time (ms)", "Paths/sec", "Value", "Reference"
    );
    println!("{}", "-".repeat(94));
    for result in &results {
        result.print();
    }

    let filename = env::args()
        .nth(1)
        .unwrap_or_else(|| "benchmark_results.json".to_string());
    let report = BenchmarkReport {
        date: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        system,
        results,
    };
    serde_json::to_writer_pretty(BufWriter::new(File::create(&filename)?), &report)?;
    println!("\nResults written to {}", filename);

    Ok(())
}
