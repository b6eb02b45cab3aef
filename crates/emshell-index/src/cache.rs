//! Sphere index cache.
//!
//! A dense table over the cube `[-R, R]³` holding the global series index of
//! every coordinate, so field code can turn `(m, n, p)` into a buffer position
//! with one load instead of a shell computation.
//!
//! The table is built once and is read-only afterwards. Consumers borrow it.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::geometry::{CubicShells, ShellGeometry};
use crate::progress::{Cadence, Progress, Silent, DEFAULT_REPORT_INTERVAL};
use crate::shell::{SeriesIndex, ShellBijection};
use crate::visited::dense_buffer;
use crate::LatticeCoord;

/// Marks a slot no build step has written.
const UNSET: u64 = u64::MAX;

/// How the cache table is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BuildStrategy {
    /// Decode every `(r, a)` pair and store its global index.
    #[default]
    Direct,
    /// Walk the non-negative octant and encode each sign reflection.
    Reflected,
}

impl fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStrategy::Direct => f.write_str("direct"),
            BuildStrategy::Reflected => f.write_str("reflected"),
        }
    }
}

impl FromStr for BuildStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(BuildStrategy::Direct),
            "reflected" | "reflection" => Ok(BuildStrategy::Reflected),
            other => Err(Error::InvalidParameter(format!(
                "unknown build strategy '{other}'"
            ))),
        }
    }
}

/// Coordinate → global series index lookup for a whole sphere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SphereIndexCache {
    max_radius: u64,
    side: u64,
    indices: Vec<u64>,
}

impl SphereIndexCache {
    /// Build the cache for the cubic shell layout with a direct build.
    pub fn initialize(max_radius: u64) -> Result<Self> {
        Self::build(
            &CubicShells,
            max_radius,
            BuildStrategy::Direct,
            &mut Silent,
            DEFAULT_REPORT_INTERVAL,
        )
    }

    /// Build the cache from any shell layout.
    pub fn build<S>(
        shells: &S,
        max_radius: u64,
        strategy: BuildStrategy,
        progress: &mut dyn Progress,
        report_interval: u64,
    ) -> Result<Self>
    where
        S: ShellGeometry + ShellBijection + ?Sized,
    {
        let (side, len) = dimensions(max_radius)?;
        let started = Instant::now();
        tracing::info!(max_radius, points = len, %strategy, "building sphere index cache");

        let mut cache = Self {
            max_radius,
            side,
            indices: dense_buffer(len, UNSET)?,
        };
        let mut cadence = Cadence::new(report_interval);
        match strategy {
            BuildStrategy::Direct => cache.fill_direct(shells, progress, &mut cadence)?,
            BuildStrategy::Reflected => cache.fill_reflected(shells, progress, &mut cadence)?,
        }

        tracing::info!(
            max_radius,
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = cache.memory_bytes(),
            "sphere index cache ready"
        );
        Ok(cache)
    }

    fn fill_direct<S>(
        &mut self,
        shells: &S,
        progress: &mut dyn Progress,
        cadence: &mut Cadence,
    ) -> Result<()>
    where
        S: ShellGeometry + ShellBijection + ?Sized,
    {
        for r in 0..=self.max_radius {
            let base = shells.total_points_before(r);
            let points = shells.points_at(r);
            for a in 0..points {
                let coord = shells.decode(r, a)?;
                let slot = self.offset_of(coord)?;
                self.indices[slot] = base + a;

                if cadence.tick() {
                    progress.report(format_args!("caching r={r}: {a} / {points}"), true);
                }
            }
        }
        Ok(())
    }

    fn fill_reflected<S>(
        &mut self,
        shells: &S,
        progress: &mut dyn Progress,
        cadence: &mut Cadence,
    ) -> Result<()>
    where
        S: ShellGeometry + ShellBijection + ?Sized,
    {
        let max = self.max_radius as i64;
        for m in 0..=max {
            for n in 0..=max {
                for p in 0..=max {
                    let octant = LatticeCoord::new(m, n, p);
                    let r = octant.radius();
                    let base = shells.total_points_before(r);

                    for coord in octant.reflections() {
                        let a = shells.encode(r, coord)?;
                        let slot = self.offset_of(coord)?;
                        self.indices[slot] = base + a;
                    }

                    if cadence.tick() {
                        progress.report(format_args!("caching octant m={m} n={n} p={p}"), true);
                    }
                }
            }
        }
        Ok(())
    }

    /// Global series index of `(m, n, p)`.
    #[inline]
    pub fn index(&self, m: i64, n: i64, p: i64) -> Result<u64> {
        self.lookup(LatticeCoord::new(m, n, p))
    }

    /// Global series index of `coord`.
    #[inline]
    pub fn lookup(&self, coord: LatticeCoord) -> Result<u64> {
        Ok(self.indices[self.offset_of(coord)?])
    }

    /// Global series index of `coord`, as a [`SeriesIndex`].
    pub fn series_index(&self, coord: LatticeCoord) -> Result<SeriesIndex> {
        self.lookup(coord).map(SeriesIndex)
    }

    /// Position of `coord` in the dense table: each axis shifted by `R` into
    /// `[0, 2R]`, then laid out with `m` as the slowest axis.
    #[inline]
    pub fn offset_of(&self, coord: LatticeCoord) -> Result<usize> {
        let r = self.max_radius;
        let out_of_range = || Error::CoordinateOutOfRange {
            coord,
            max_radius: r,
        };

        let shift = |v: i64| -> Option<u64> {
            (v.unsigned_abs() <= r).then(|| (v + r as i64) as u64)
        };
        let m = shift(coord.m).ok_or_else(out_of_range)?;
        let n = shift(coord.n).ok_or_else(out_of_range)?;
        let p = shift(coord.p).ok_or_else(out_of_range)?;

        Ok(((m * self.side + n) * self.side + p) as usize)
    }

    /// Largest cached shell radius.
    pub fn max_radius(&self) -> u64 {
        self.max_radius
    }

    /// Points per side of the cached cube.
    pub fn side(&self) -> u64 {
        self.side
    }

    /// Number of cached coordinates.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The table in dense offset order; see [`offset_of`](Self::offset_of).
    pub fn as_slice(&self) -> &[u64] {
        &self.indices
    }

    /// Bytes held by the table.
    pub fn memory_bytes(&self) -> usize {
        self.indices.len() * std::mem::size_of::<u64>()
    }
}

/// Side length and slot count of the cube of radius `max_radius`.
fn dimensions(max_radius: u64) -> Result<(u64, u64)> {
    let overflow = || Error::OutOfMemory {
        requested: u64::MAX,
    };
    let side = max_radius
        .checked_mul(2)
        .and_then(|d| d.checked_add(1))
        .ok_or_else(overflow)?;
    let len = side
        .checked_mul(side)
        .and_then(|square| square.checked_mul(side))
        .ok_or_else(overflow)?;
    Ok((side, len))
}
