//! Shell traversal against cube traversal.
//!
//! Walks every point of the sphere twice: once shell by shell through the
//! bijection, once with a plain triple loop over the bounding cube. Both walks do
//! the same per-point work (a counter and a progress report every
//! `report_interval` points), so the timing difference is the cost of the
//! traversal itself. The heavier the per-point work, the smaller the relative
//! difference becomes.
//!
//! The comparison is diagnostic. It only fails when a walk misses points.

use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::cache::SphereIndexCache;
use crate::error::{Error, Result};
use crate::geometry::ShellGeometry;
use crate::progress::{Cadence, Progress};
use crate::shell::ShellBijection;

/// Timings of both traversals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumerationBenchmark {
    pub max_radius: u64,
    pub expected_points: u64,
    pub report_interval: u64,
    pub shell_points: u64,
    pub shell_elapsed: Duration,
    pub cube_points: u64,
    pub cube_elapsed: Duration,
}

impl EnumerationBenchmark {
    /// Cube time minus shell time, in seconds. Positive when the shell walk was
    /// faster.
    pub fn difference_secs(&self) -> f64 {
        self.cube_elapsed.as_secs_f64() - self.shell_elapsed.as_secs_f64()
    }

    /// [`difference_secs`](Self::difference_secs) as a percentage of the shell
    /// time.
    pub fn difference_percent(&self) -> f64 {
        let shell = self.shell_elapsed.as_secs_f64();
        if shell == 0.0 {
            0.0
        } else {
            100.0 * self.difference_secs() / shell
        }
    }

    pub fn shell_is_faster(&self) -> bool {
        self.shell_elapsed < self.cube_elapsed
    }
}

/// Per-point work shared by both traversals.
struct PointCounter<'p> {
    visited: u64,
    total: u64,
    cadence: Cadence,
    progress: &'p mut dyn Progress,
}

impl<'p> PointCounter<'p> {
    fn new(total: u64, report_interval: u64, progress: &'p mut dyn Progress) -> Self {
        Self {
            visited: 0,
            total,
            cadence: Cadence::new(report_interval),
            progress,
        }
    }

    #[inline]
    fn visit(&mut self) {
        if self.cadence.tick() {
            self.progress.report(
                format_args!("Sphere index: {} / {}", self.visited, self.total),
                true,
            );
        }
        self.visited += 1;
    }
}

/// Walk the sphere both ways and time each walk.
pub fn compare<S>(
    shells: &S,
    cache: &SphereIndexCache,
    progress: &mut dyn Progress,
    report_interval: u64,
) -> Result<EnumerationBenchmark>
where
    S: ShellGeometry + ShellBijection + ?Sized,
{
    let max_radius = cache.max_radius();
    let expected = shells.total_points_in_sphere(max_radius);

    let side = cache.side();
    let cube = side * side * side;
    if cube != expected {
        return Err(Error::ShellCountMismatch {
            radius: max_radius,
            expected,
            actual: cube,
        });
    }

    let (shell_points, shell_elapsed) = {
        let mut counter = PointCounter::new(expected, report_interval, progress);
        let started = Instant::now();
        for r in 0..=max_radius {
            for a in 0..shells.points_at(r) {
                black_box(shells.decode(r, a)?);
                counter.visit();
            }
        }
        (counter.visited, started.elapsed())
    };
    progress.report(
        format_args!("Went through sphere indexes {shell_points} in {shell_elapsed:?}"),
        true,
    );
    if shell_points != expected {
        return Err(Error::EnumerationIncomplete {
            traversal: "shell",
            visited: shell_points,
            expected,
        });
    }

    let (cube_points, cube_elapsed) = {
        let mut counter = PointCounter::new(expected, report_interval, progress);
        let started = Instant::now();
        for i in 0..side {
            for j in 0..side {
                for k in 0..side {
                    black_box((i, j, k));
                    counter.visit();
                }
            }
        }
        (counter.visited, started.elapsed())
    };
    progress.report(
        format_args!("Went through 3D array indexes {cube_points} in {cube_elapsed:?}"),
        true,
    );
    if cube_points != expected {
        return Err(Error::EnumerationIncomplete {
            traversal: "cube",
            visited: cube_points,
            expected,
        });
    }

    let bench = EnumerationBenchmark {
        max_radius,
        expected_points: expected,
        report_interval,
        shell_points,
        shell_elapsed,
        cube_points,
        cube_elapsed,
    };
    tracing::info!(
        max_radius,
        points = expected,
        shell_ms = shell_elapsed.as_secs_f64() * 1e3,
        cube_ms = cube_elapsed.as_secs_f64() * 1e3,
        diff_percent = bench.difference_percent(),
        "enumeration benchmark finished"
    );
    Ok(bench)
}
