//! Verification suite: configuration and the end-to-end runner.
//!
//! The runner derives the geometry from the lattice size, builds one cache and
//! runs the selected checks against it in order, stopping at the first failure.

use std::time::{Duration, Instant};

use crate::cache::{BuildStrategy, SphereIndexCache};
use crate::enumeration::EnumerationBenchmark;
use crate::error::{Error, Result};
use crate::geometry::{GridGeometry, ShellGeometry};
use crate::progress::{Progress, DEFAULT_REPORT_INTERVAL};
use crate::shell::ShellBijection;
use crate::verify::{Check, CheckOutcome, IndexVerifier};

/// Configuration for a verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Lattice size parameter N
    pub lattice_size: i64,

    /// Iterations between progress reports
    pub report_interval: u64,

    /// How the cache is filled
    pub build_strategy: BuildStrategy,

    /// Checks to run; always executed in [`Check::ALL`] order
    pub checks: Vec<Check>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            lattice_size: 2,
            report_interval: DEFAULT_REPORT_INTERVAL,
            build_strategy: BuildStrategy::Direct,
            checks: Check::ALL.to_vec(),
        }
    }
}

impl SuiteConfig {
    /// Read the configuration from the environment, falling back to defaults.
    ///
    /// - `EMSHELL_N`: lattice size
    /// - `EMSHELL_REPORT_INTERVAL`: iterations between progress reports
    /// - `EMSHELL_BUILD`: `direct` or `reflected`
    /// - `EMSHELL_CHECKS`: comma-separated check names
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(n) = lookup("EMSHELL_N") {
            config.lattice_size = n.trim().parse().map_err(|_| {
                Error::InvalidParameter(format!("EMSHELL_N is not an integer: '{n}'"))
            })?;
        }

        if let Some(interval) = lookup("EMSHELL_REPORT_INTERVAL") {
            config.report_interval = interval.trim().parse().map_err(|_| {
                Error::InvalidParameter(format!(
                    "EMSHELL_REPORT_INTERVAL is not a positive integer: '{interval}'"
                ))
            })?;
        }

        if let Some(build) = lookup("EMSHELL_BUILD") {
            config.build_strategy = build.trim().parse()?;
        }

        if let Some(checks) = lookup("EMSHELL_CHECKS") {
            config.checks = checks
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect::<Result<_>>()?;
        }

        Ok(config)
    }

    /// Geometry for the configured lattice size.
    pub fn geometry(&self) -> Result<GridGeometry> {
        GridGeometry::from_lattice_size(self.lattice_size)
    }
}

/// The check that stopped a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CheckFailure {
    pub check: Check,
    pub kind: &'static str,
    pub error: Error,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SuiteReport {
    pub geometry: GridGeometry,
    pub build_strategy: BuildStrategy,
    pub cache_bytes: usize,
    pub build_elapsed: Duration,
    /// Checks that passed, in run order
    pub outcomes: Vec<CheckOutcome>,
    pub benchmark: Option<EnumerationBenchmark>,
    pub failure: Option<CheckFailure>,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Runs the configured checks.
pub struct VerificationSuite<'a, S: ?Sized> {
    shells: &'a S,
    config: SuiteConfig,
}

impl<'a, S> VerificationSuite<'a, S>
where
    S: ShellGeometry + ShellBijection + ?Sized,
{
    pub fn new(shells: &'a S, config: SuiteConfig) -> Self {
        Self { shells, config }
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Build the cache and run the selected checks.
    ///
    /// Errors in setup (bad lattice size, failed allocation) are returned as
    /// `Err`. A failing check is recorded in [`SuiteReport::failure`].
    pub fn run(&self, progress: &mut dyn Progress) -> Result<SuiteReport> {
        let geometry = self.config.geometry()?;
        tracing::info!(
            lattice_size = geometry.lattice_size,
            max_radius = geometry.max_radius,
            points = geometry.total_points(),
            "loading index cache"
        );

        let started = Instant::now();
        let cache = SphereIndexCache::build(
            self.shells,
            geometry.max_radius,
            self.config.build_strategy,
            progress,
            self.config.report_interval,
        )?;
        let build_elapsed = started.elapsed();

        let mut report = SuiteReport {
            geometry,
            build_strategy: self.config.build_strategy,
            cache_bytes: cache.memory_bytes(),
            build_elapsed,
            outcomes: Vec::new(),
            benchmark: None,
            failure: None,
        };

        let verifier = IndexVerifier::new(self.shells, &cache)
            .with_report_interval(self.config.report_interval);

        for check in Check::ALL {
            if !self.config.checks.contains(&check) {
                continue;
            }
            tracing::info!(%check, "running check");

            let result = if check == Check::Enumeration {
                let started = Instant::now();
                verifier.benchmark_enumeration(progress).map(|bench| {
                    let outcome = CheckOutcome {
                        check,
                        points: bench.shell_points + bench.cube_points,
                        elapsed: started.elapsed(),
                    };
                    report.benchmark = Some(bench);
                    outcome
                })
            } else {
                verifier.run(check, progress)
            };

            match result {
                Ok(outcome) => {
                    tracing::info!(
                        %check,
                        points = outcome.points,
                        elapsed_ms = outcome.elapsed.as_millis() as u64,
                        "check passed"
                    );
                    report.outcomes.push(outcome);
                }
                Err(error) => {
                    tracing::warn!(%check, %error, "check failed");
                    report.failure = Some(CheckFailure {
                        check,
                        kind: error.kind(),
                        error,
                    });
                    break;
                }
            }
        }

        Ok(report)
    }
}
