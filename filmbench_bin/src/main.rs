use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use filmbench::{BenchmarkConfig, BenchmarkHarness, RayonGrainDevice, BANNER, RULE};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

/// Film emulation blur and grain benchmark.
///
/// With no arguments, runs the default 4K suite.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 3840)]
    width: usize,

    /// Image height in pixels
    #[arg(long, default_value_t = 2160)]
    height: usize,

    /// Gaussian kernel radius (the kernel spans 2 * radius + 1 taps)
    #[arg(long, default_value_t = 3)]
    radius: usize,

    /// Gaussian standard deviation
    #[arg(long, default_value_t = 1.5)]
    sigma: f32,

    /// Measured trials per kernel
    #[arg(long, default_value_t = 5)]
    trials: usize,

    /// Discarded warm-up passes per kernel
    #[arg(long, default_value_t = 1)]
    warmup: usize,

    /// Per-trial time budget in milliseconds
    #[arg(long, default_value_t = 30_000)]
    max_trial_ms: u64,

    /// Grain intensity passed to the grain device
    #[arg(long, default_value_t = 0.3)]
    grain_intensity: f32,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(?args, "parsed arguments");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("filmbench: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = BenchmarkConfig::default()
        .with_resolution(args.width, args.height)
        .with_kernel(args.radius, args.sigma)
        .with_trials(args.trials)
        .with_warmup(args.warmup)
        .with_max_trial_duration(Duration::from_millis(args.max_trial_ms));
    let harness = BenchmarkHarness::new(config).context("setting up benchmark")?;
    let grain = RayonGrainDevice::new(args.width, args.height, args.grain_intensity);

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", BANNER)?;
    writeln!(stdout, "{}", RULE)?;
    stdout.flush()?;

    let spinner = ProgressBar::new_spinner().with_message(format!(
        "blurring {}x{}, {} trials per kernel",
        args.width, args.height, args.trials
    ));
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
            .context("building progress style")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(120));

    let report = harness.run_suite(&grain);
    spinner.finish_and_clear();
    let report = report
        .with_context(|| format!("benchmark suite at {}x{}", args.width, args.height))?;

    writeln!(stdout, "{}", report)?;
    Ok(())
}
