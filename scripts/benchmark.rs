// scripts/benchmark.rs
use gbm_mc_pricer::analytics::bs_analytic;
use gbm_mc_pricer::math_utils::Timer;
use gbm_mc_pricer::rng::seed_rng_from_u64;
use gbm_mc_pricer::{simulate, simulate_parallel, OptionType, SimulationParameters};
use std::env;
use std::fs::File;
use std::io::{self, Write};

/// Host details that explain the sequential/parallel timings
#[derive(Debug)]
struct SystemInfo {
    os: &'static str,
    cpu_cores: usize,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS,
            cpu_cores: num_cpus::get(),
            rayon_threads: rayon::current_num_threads(),
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    engine: &'static str,
    option_type: OptionType,
    paths: usize,
    time_ms: f64,
    throughput_paths_per_sec: f64,
    value: f64,
    standard_error: f64,
    analytic_value: f64,
    ci_covers_analytic: bool,
}

fn run_convergence_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    let paths_configs = [1_000, 10_000, 100_000, 1_000_000];

    for option_type in [OptionType::Call, OptionType::Put] {
        for &paths in &paths_configs {
            println!("Running {} benchmarks with {} paths...", option_type, paths);

            let params = SimulationParameters {
                num_simulations: paths,
                option_type,
                ..Default::default()
            };
            let analytic_value = bs_analytic::bs_price(
                option_type,
                params.initial_price,
                params.strike_price,
                params.risk_free_rate,
                params.volatility,
                params.time_to_maturity,
            );

            for engine in ["sequential", "parallel"] {
                let mut timer = Timer::new();
                timer.start();
                let outcome = match engine {
                    "sequential" => simulate(&params, &mut seed_rng_from_u64(42)),
                    _ => simulate_parallel(&params, 42),
                };
                let time_ms = timer.elapsed_ms();

                let result = match outcome {
                    Ok(result) => result,
                    Err(e) => {
                        eprintln!("  skipped {} run: {}", engine, e);
                        continue;
                    }
                };

                results.push(BenchmarkResult {
                    engine,
                    option_type,
                    paths,
                    time_ms,
                    throughput_paths_per_sec: paths as f64 / (time_ms / 1000.0),
                    value: result.price_estimate,
                    standard_error: result.standard_error,
                    analytic_value,
                    ci_covers_analytic: result.confidence_interval.contains(analytic_value),
                });
            }
        }
    }

    results
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> io::Result<()> {
    let mut file = File::create(filename)?;

    // Write system information as comments
    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "#")?;

    writeln!(
        file,
        "Engine,Option,Paths,Time_ms,Throughput_paths_per_sec,Value,Std_Error,Analytic_Value,CI_Covers"
    )?;
    for r in results {
        writeln!(
            file,
            "{},{},{},{:.2},{:.0},{:.6},{:.6},{:.6},{}",
            r.engine,
            r.option_type,
            r.paths,
            r.time_ms,
            r.throughput_paths_per_sec,
            r.value,
            r.standard_error,
            r.analytic_value,
            r.ci_covers_analytic
        )?;
    }

    println!("Results written to {}", filename);
    Ok(())
}

fn main() -> io::Result<()> {
    println!("gbm-mc-pricer Benchmark Suite");
    println!("=============================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let results = run_convergence_benchmarks();

    println!(
        "\n{:<11} {:<5} {:>9} {:>10} {:>10} {:>9} {:>9} {:>6}",
        "Engine", "Type", "Paths", "Time (ms)", "Price", "Std Err", "BS", "In CI"
    );
    println!("{}", "-".repeat(76));
    for r in &results {
        println!(
            "{:<11} {:<5} {:>9} {:>10.2} {:>10.4} {:>9.4} {:>9.4} {:>6}",
            r.engine,
            r.option_type,
            r.paths,
            r.time_ms,
            r.value,
            r.standard_error,
            r.analytic_value,
            r.ci_covers_analytic
        );
    }

    std::fs::create_dir_all("results")?;
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("results/benchmark_{}.csv", timestamp);
    write_results_to_csv(&results, &system_info, &filename)
}
