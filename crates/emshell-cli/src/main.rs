//! emshell verification driver
//!
//! Builds the sphere index cache for a lattice and runs the verification checks
//! against it.
//!
//! Usage:
//!   emshell all -n 10              Run every check (or those in EMSHELL_CHECKS)
//!   emshell bijection -n 10        Per-shell decode/encode audit
//!   emshell cache -n 10            Whole-sphere cache uniqueness audit
//!   emshell speed -n 10            Shell versus cube enumeration timing
//!   emshell counts -n 10           Shell count consistency
//!
//! Environment:
//!   EMSHELL_N, EMSHELL_REPORT_INTERVAL, EMSHELL_BUILD, EMSHELL_CHECKS
//!   RUST_LOG (default: emshell=info,emshell_index=info)

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use emshell_index::{
    BuildStrategy, Check, CubicShells, Progress, Silent, SuiteConfig, SuiteReport,
    TracingProgress, VerificationSuite,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "emshell")]
#[command(about = "Verify the shell-ordered lattice index and its lookup cache")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Lattice size parameter N (the lattice spans 4N+3 points per side)
    #[arg(short = 'n', long, global = true, allow_negative_numbers = true)]
    lattice_size: Option<i64>,

    /// Iterations between progress reports
    #[arg(long, global = true)]
    interval: Option<u64>,

    /// How the index cache is built
    #[arg(long, global = true, value_enum)]
    build: Option<Build>,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Suppress progress messages
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run every check
    All,
    /// Shell count consistency
    Counts,
    /// Per-shell bijection audit
    Bijection,
    /// Whole-sphere cache audit
    Cache,
    /// Shell versus cube enumeration timing
    Speed,
}

impl Command {
    /// Checks this subcommand pins. `all` keeps the configured selection.
    fn checks(self) -> Option<Vec<Check>> {
        match self {
            Command::All => None,
            Command::Counts => Some(vec![Check::ShellCounts]),
            Command::Bijection => Some(vec![Check::ShellBijection]),
            Command::Cache => Some(vec![Check::SphereCache]),
            Command::Speed => Some(vec![Check::Enumeration]),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Build {
    Direct,
    Reflected,
}

impl From<Build> for BuildStrategy {
    fn from(build: Build) -> Self {
        match build {
            Build::Direct => BuildStrategy::Direct,
            Build::Reflected => BuildStrategy::Reflected,
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emshell=info,emshell_index=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = apply_args(SuiteConfig::from_env()?, &args);

    tracing::info!(
        lattice_size = config.lattice_size,
        build = %config.build_strategy,
        "starting verification"
    );

    let mut progress: Box<dyn Progress> = if args.quiet {
        Box::new(Silent)
    } else {
        Box::new(TracingProgress)
    };
    let report = VerificationSuite::new(&CubicShells, config).run(progress.as_mut())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Command-line options override the environment.
fn apply_args(mut config: SuiteConfig, args: &Args) -> SuiteConfig {
    if let Some(n) = args.lattice_size {
        config.lattice_size = n;
    }
    if let Some(interval) = args.interval {
        config.report_interval = interval;
    }
    if let Some(build) = args.build {
        config.build_strategy = build.into();
    }
    if let Some(checks) = args.command.checks() {
        config.checks = checks;
    }
    config
}

fn print_report(report: &SuiteReport) {
    let g = &report.geometry;
    println!();
    println!(
        "Lattice N={} ({}³ points, max radius {})",
        g.lattice_size, g.grid_points, g.max_radius
    );
    println!(
        "Index cache: {} build, {} bytes, {:.3}s",
        report.build_strategy,
        report.cache_bytes,
        report.build_elapsed.as_secs_f64()
    );
    println!();

    for outcome in &report.outcomes {
        println!(
            "  OK      {:<16} {:>12} points  {:>9.3}s",
            outcome.check.name(),
            outcome.points,
            outcome.elapsed.as_secs_f64()
        );
    }

    if let Some(bench) = &report.benchmark {
        println!();
        println!(
            "  Shell traversal: {} points in {:.3}ms",
            bench.shell_points,
            bench.shell_elapsed.as_secs_f64() * 1e3
        );
        println!(
            "  Cube traversal:  {} points in {:.3}ms",
            bench.cube_points,
            bench.cube_elapsed.as_secs_f64() * 1e3
        );
        println!(
            "  Time difference (cube) - (shell) = {:.3}ms, diff percent: {:.2}%",
            bench.difference_secs() * 1e3,
            bench.difference_percent()
        );
    }

    if let Some(failure) = &report.failure {
        println!();
        println!("  FAILED  {:<16} {}: {}", failure.check.name(), failure.kind, failure.error);
    }
}
