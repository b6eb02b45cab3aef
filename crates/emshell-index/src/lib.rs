//! emshell Lattice Indexing
//!
//! Shell-ordered storage for field samples on a cubic lattice, with an O(1)
//! coordinate lookup cache and an exhaustive self-verification harness.
//!
//! # Shell Structure
//!
//! A lattice of size parameter N spans `[-R, R]³` with `R = 2N + 1`. Coordinates
//! are grouped into concentric shells by their Chebyshev radius
//! `max(|m|, |n|, |p|)`:
//!
//! - Shell 0: the origin (1 point)
//! - Shell r > 0: 24r² + 2 points
//!
//! Field samples are stored shell after shell, so the series index of a
//! coordinate is the number of points on all inner shells plus its local index
//! within its own shell.
//!
//! # Components
//!
//! - [`geometry`]: shell sizes and cumulative counts
//! - [`shell`]: the per-shell bijection between local index and coordinate
//! - [`SphereIndexCache`]: dense coordinate → series index table
//! - [`IndexVerifier`] / [`VerificationSuite`]: fail-fast checks and the
//!   shell-versus-cube enumeration benchmark
//!
//! # Example
//!
//! ```
//! use emshell_index::{decode, encode, LatticeCoord, SphereIndexCache};
//!
//! let cache = SphereIndexCache::initialize(3).unwrap();
//! let coord = decode(2, 10).unwrap();
//! assert_eq!(encode(2, coord).unwrap(), 10);
//! assert_eq!(cache.lookup(coord).unwrap(), 27 + 10);
//! assert_eq!(cache.index(0, 0, 0).unwrap(), 0);
//! # let _ = LatticeCoord::ORIGIN;
//! ```

mod cache;
mod coord;
mod enumeration;
mod error;
pub mod geometry;
mod progress;
pub mod shell;
mod suite;
mod verify;
mod visited;

pub use cache::{BuildStrategy, SphereIndexCache};
pub use coord::{LatticeCoord, Reflections};
pub use enumeration::EnumerationBenchmark;
pub use error::{Error, Result};
pub use geometry::{
    max_radius, points_at, total_points_before, total_points_in_sphere, CubicShells,
    GridGeometry, ShellGeometry,
};
pub use progress::{Cadence, Progress, Silent, TracingProgress, DEFAULT_REPORT_INTERVAL};
pub use shell::{
    coord_to_series, decode, encode, series_to_coord, SeriesIndex, ShellBijection, ShellWalk,
};
pub use suite::{CheckFailure, SuiteConfig, SuiteReport, VerificationSuite};
pub use verify::{Check, CheckOutcome, IndexVerifier};
pub use visited::VisitedSet;
