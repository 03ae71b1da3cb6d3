//! mc-pricer - Monte Carlo option pricing from the command line
//!
//! # Commands
//!
//! - `mc-pricer price` - Price one option type and print the estimate
//! - `mc-pricer compare` - Price call and put side by side with Black-Scholes
//!
//! Parameters come from an optional TOML file (`--config`) and are
//! overridden by flags.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gbm_mc_pricer::analytics::bs_analytic;
use gbm_mc_pricer::analytics::histogram::Histogram;
use gbm_mc_pricer::config::RunConfig;
use gbm_mc_pricer::math_utils::{two_sided_z, Timer};
use gbm_mc_pricer::output;
use gbm_mc_pricer::rng::seed_rng_from_u64;
use gbm_mc_pricer::{
    price_call_and_put, price_call_and_put_parallel, simulate, simulate_parallel, OptionType,
    SimulationParameters, SimulationResult,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Monte Carlo pricer for European options under GBM
#[derive(Parser)]
#[command(name = "mc-pricer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML run configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a single call or put
    Price {
        #[command(flatten)]
        sim: SimArgs,

        /// Option type (call or put)
        #[arg(short = 't', long)]
        option_type: Option<OptionType>,

        /// Print the result as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Write every terminal price and payoff to this CSV file
        #[arg(long)]
        terminal_csv: Option<PathBuf>,

        /// Write recorded paths (needs --steps > 1) to this CSV file
        #[arg(long)]
        paths_csv: Option<PathBuf>,

        /// Write a key/value summary to this CSV file
        #[arg(long)]
        summary_csv: Option<PathBuf>,
    },

    /// Price call and put on the same draws and check put-call parity
    Compare {
        #[command(flatten)]
        sim: SimArgs,
    },
}

#[derive(Args)]
struct SimArgs {
    /// Initial asset price S0
    #[arg(long)]
    spot: Option<f64>,

    /// Strike price K
    #[arg(long)]
    strike: Option<f64>,

    /// Annualised volatility sigma
    #[arg(long)]
    vol: Option<f64>,

    /// Annualised risk-free rate r
    #[arg(long)]
    rate: Option<f64>,

    /// Time to maturity in years
    #[arg(long)]
    maturity: Option<f64>,

    /// Number of Monte Carlo trials
    #[arg(short = 'n', long)]
    simulations: Option<usize>,

    /// Time steps per path
    #[arg(long)]
    steps: Option<usize>,

    /// Confidence level of the interval, in (0, 1)
    #[arg(long)]
    confidence: Option<f64>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Use the multi-threaded engine
    #[arg(long)]
    parallel: bool,

    /// Print a text histogram of terminal prices with this many bins
    #[arg(long)]
    histogram_bins: Option<usize>,
}

impl SimArgs {
    fn apply(&self, config: &mut RunConfig) {
        let p = &mut config.simulation;
        if let Some(v) = self.spot {
            p.initial_price = v;
        }
        if let Some(v) = self.strike {
            p.strike_price = v;
        }
        if let Some(v) = self.vol {
            p.volatility = v;
        }
        if let Some(v) = self.rate {
            p.risk_free_rate = v;
        }
        if let Some(v) = self.maturity {
            p.time_to_maturity = v;
        }
        if let Some(v) = self.simulations {
            p.num_simulations = v;
        }
        if let Some(v) = self.steps {
            p.num_steps = v;
        }
        if let Some(v) = self.confidence {
            p.confidence_level = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.histogram_bins {
            config.histogram_bins = v;
        }
        config.parallel |= self.parallel;
    }
}

fn run_engine(config: &RunConfig, params: &SimulationParameters) -> Result<SimulationResult> {
    let mut timer = Timer::new();
    timer.start();
    let result = if config.parallel {
        simulate_parallel(params, config.seed)?
    } else {
        simulate(params, &mut seed_rng_from_u64(config.seed))?
    };
    info!(
        elapsed_ms = timer.elapsed_ms(),
        parallel = config.parallel,
        "{} simulation finished",
        params.option_type
    );
    Ok(result)
}

fn print_result(params: &SimulationParameters, result: &SimulationResult) {
    let reference = bs_analytic::bs_price(
        params.option_type,
        params.initial_price,
        params.strike_price,
        params.risk_free_rate,
        params.volatility,
        params.time_to_maturity,
    );
    let ci = result.confidence_interval;
    println!("┌──────────────────────────┬────────────────────────┐");
    println!("│ Option                   │ {:>22} │", params.option_type);
    println!("│ Trials                   │ {:>22} │", result.num_simulations);
    println!("│ Price estimate           │ {:>22.4} │", result.price_estimate);
    println!("│ Standard error           │ {:>22.4} │", result.standard_error);
    println!(
        "│ {:>3.0}% confidence interval │ {:>10.4} - {:<9.4} │",
        result.confidence_level * 100.0,
        ci.low,
        ci.high
    );
    println!("│ Black-Scholes            │ {:>22.4} │", reference);
    println!(
        "│ In the money             │ {:>21.1}% │",
        result.in_the_money_ratio(params.strike_price) * 100.0
    );
    println!("└──────────────────────────┴────────────────────────┘");
    if !result.is_finite() {
        println!("warning: estimate is not finite for these parameters");
    }
}

fn print_histogram(result: &SimulationResult, bins: usize) -> Result<()> {
    let hist = Histogram::from_samples(&result.terminal_prices, bins)?;
    println!("\nTerminal price distribution (n={})", result.num_simulations);
    print!("{}", hist.render_text(40));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    match cli.command {
        Commands::Price {
            sim,
            option_type,
            json,
            terminal_csv,
            paths_csv,
            summary_csv,
        } => {
            sim.apply(&mut config);
            if let Some(t) = option_type {
                config.simulation.option_type = t;
            }
            let params = config.simulation.clone();
            let show_histogram = sim.histogram_bins.is_some();
            let result = run_engine(&config, &params)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&params, &result);
                if show_histogram {
                    print_histogram(&result, config.histogram_bins)?;
                }
            }

            if let Some(path) = terminal_csv {
                output::write_terminal_prices_csv(&path, &result, params.strike_price)
                    .with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "terminal prices written");
            }
            if let Some(path) = paths_csv {
                match &result.paths {
                    Some(paths) => {
                        output::write_paths_csv(&path, paths, params.time_to_maturity)
                            .with_context(|| format!("writing {}", path.display()))?;
                        info!(path = %path.display(), "paths written");
                    }
                    None => anyhow::bail!("--paths-csv needs --steps greater than 1"),
                }
            }
            if let Some(path) = summary_csv {
                output::write_summary_to_csv(&path, &output::summary_rows(&result))
                    .with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "summary written");
            }
        }
        Commands::Compare { sim } => {
            sim.apply(&mut config);
            let params = config.simulation.clone();
            let pair = if config.parallel {
                price_call_and_put_parallel(&params, config.seed)?
            } else {
                price_call_and_put(&params, config.seed)?
            };
            info!(parallel = config.parallel, "call/put pair priced");
            let z = two_sided_z(params.confidence_level);

            for result in [&pair.call, &pair.put] {
                print_result(&params.with_option_type(result.option_type), result);
            }
            println!(
                "\nPut-call parity: C - P - (S0 - K e^-rT) = {:.4} (tolerance ±{:.4}) {}",
                pair.parity_gap(),
                pair.parity_tolerance(z),
                if pair.satisfies_parity(z) { "ok" } else { "VIOLATED" }
            );
            if sim.histogram_bins.is_some() {
                print_histogram(&pair.call, config.histogram_bins)?;
            }
        }
    }

    Ok(())
}
