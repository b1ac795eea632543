//! Compare every counter variant on one random input.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use doublecount::{Alphabet, ConfigError, Driver, RunConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_TRACE_FILTER: &str = "doublecount=info";

/// Benchmark the adjacent-pair counters against each other.
#[derive(Debug, Parser)]
#[command(name = "compare")]
#[command(about = "Time every adjacent-pair counter on the same random input")]
struct Cli {
    /// JSON file with `input` and `measure` sections; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of characters to generate.
    #[arg(long)]
    length: Option<usize>,
    /// Characters to draw from (default: a-zA-Z).
    #[arg(long)]
    alphabet: Option<String>,
    /// Seed for reproducible input.
    #[arg(long)]
    seed: Option<u64>,
    /// Discarded calls before timing [default: 3].
    #[arg(long)]
    warmup: Option<usize>,
    /// Minimum timed calls per variant [default: 10].
    #[arg(long)]
    min_iters: Option<usize>,
    /// Minimum measured time per variant, in milliseconds [default: 1000].
    #[arg(long)]
    min_time_ms: Option<u64>,
    /// Cap on timed calls per variant [default: 10000].
    #[arg(long)]
    max_iters: Option<usize>,
    /// Fail a variant if one call exceeds this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Measure variants concurrently.
    #[arg(long)]
    parallel: bool,
    /// Only run the named variant (repeatable).
    #[arg(long = "variant")]
    variants: Vec<String>,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|expr| EnvFilter::try_new(expr).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_TRACE_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

fn run_config(cli: &Cli) -> Result<RunConfig, ConfigError> {
    let mut cfg = match &cli.config {
        Some(path) => RunConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => RunConfig::default(),
    };

    let input = &mut cfg.input;
    if let Some(length) = cli.length {
        input.length = length;
    }
    if let Some(alphabet) = &cli.alphabet {
        input.alphabet = Alphabet::from_chars(alphabet)?;
    }
    if cli.seed.is_some() {
        input.seed = cli.seed;
    }
    input.validate()?;

    let measure = &mut cfg.measure;
    if let Some(n) = cli.warmup {
        measure.warmup_iters = n;
    }
    if let Some(n) = cli.min_iters {
        measure.min_iters = n;
    }
    if let Some(ms) = cli.min_time_ms {
        measure.min_duration = Duration::from_millis(ms);
    }
    if let Some(n) = cli.max_iters {
        measure.max_iters = n;
    }
    if let Some(ms) = cli.timeout_ms {
        measure.timeout = Some(Duration::from_millis(ms));
    }
    Ok(cfg)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let RunConfig { input, measure } = match run_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(64);
        }
    };

    let mut driver = match Driver::with_default_counters(measure) {
        Ok(d) => d.parallel(cli.parallel),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    if let Err(e) = driver.retain(&cli.variants) {
        eprintln!("error: {e} (known: {})", driver.names().join(", "));
        return ExitCode::from(64);
    }

    let report = match driver.compare(&input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(64);
        }
    };

    if cli.json {
        match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(2);
            }
        }
    } else {
        print!("{report}");
    }

    if report.mismatch.is_some() {
        ExitCode::from(1)
    } else if report.has_failures() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}
