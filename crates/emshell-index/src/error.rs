//! Error types for emshell-index.

use crate::LatticeCoord;
use thiserror::Error;

/// Result type for emshell-index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the geometry, the shell bijection, the sphere cache and the
/// verification checks.
///
/// Every variant carries enough context to reproduce the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Error {
    /// Lattice size or configuration value is malformed.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A dense buffer could not be allocated.
    #[error("out of memory: could not allocate {requested} entries")]
    OutOfMemory { requested: u64 },

    /// Cumulative point count disagrees with the running sum of shell sizes.
    #[error("shell count mismatch at r={radius}: total {expected}, running sum {actual}")]
    ShellCountMismatch {
        radius: u64,
        expected: u64,
        actual: u64,
    },

    /// Local index outside `[0, points_at(radius))`.
    #[error("local index {index} out of range for shell {radius} ({points} points)")]
    IndexOutOfRange { radius: u64, index: u64, points: u64 },

    /// Coordinate does not belong to the requested shell.
    #[error("coordinate {coord} is not on shell {radius}")]
    InvalidCoordinate { radius: u64, coord: LatticeCoord },

    /// Coordinate lies outside the cached cube.
    #[error("coordinate {coord} outside cache of radius {max_radius}")]
    CoordinateOutOfRange {
        coord: LatticeCoord,
        max_radius: u64,
    },

    /// Decoded coordinate has every axis strictly inside the shell.
    #[error("shell {radius} index {index} decoded to {coord}, which lies inside the shell")]
    CoordinateBelowShell {
        radius: u64,
        index: u64,
        coord: LatticeCoord,
    },

    /// Decoded coordinate has an axis beyond the shell.
    #[error("shell {radius} index {index} decoded to {coord}, which lies outside the shell")]
    CoordinateAboveShell {
        radius: u64,
        index: u64,
        coord: LatticeCoord,
    },

    /// Encoding a decoded coordinate did not give back the original index.
    #[error("round trip failed on shell {radius}: index {expected} -> {coord} -> {actual}")]
    RoundTripMismatch {
        radius: u64,
        coord: LatticeCoord,
        expected: u64,
        actual: u64,
    },

    /// Two local indices of one shell decoded to the same coordinate.
    #[error("shell {radius} index {index} decoded to {coord}, already produced in this shell")]
    DuplicateLocalIndex {
        radius: u64,
        index: u64,
        coord: LatticeCoord,
    },

    /// Two coordinates share one global series index.
    #[error("coordinate {coord} maps to global index {index}, already taken")]
    DuplicateGlobalIndex { coord: LatticeCoord, index: u64 },

    /// Cache returned a global index beyond the sphere.
    #[error("coordinate {coord} maps to global index {index}, sphere has {total} points")]
    GlobalIndexOutOfRange {
        coord: LatticeCoord,
        index: u64,
        total: u64,
    },

    /// Cache disagrees with the index derived from the bijection.
    #[error("cache maps {coord} (shell {radius}) to {actual}, expected {expected}")]
    CacheIndexMismatch {
        radius: u64,
        coord: LatticeCoord,
        expected: u64,
        actual: u64,
    },

    /// A traversal visited a different number of points than the sphere holds.
    #[error("{traversal} traversal visited {visited} points, expected {expected}")]
    EnumerationIncomplete {
        traversal: &'static str,
        visited: u64,
        expected: u64,
    },
}

impl Error {
    /// Short stable name of the error kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidParameter(_) => "InvalidParameter",
            Error::OutOfMemory { .. } => "OutOfMemory",
            Error::ShellCountMismatch { .. } => "ShellCountMismatch",
            Error::IndexOutOfRange { .. } => "IndexOutOfRange",
            Error::InvalidCoordinate { .. } => "InvalidCoordinate",
            Error::CoordinateOutOfRange { .. } => "CoordinateOutOfRange",
            Error::CoordinateBelowShell { .. } => "CoordinateBelowShell",
            Error::CoordinateAboveShell { .. } => "CoordinateAboveShell",
            Error::RoundTripMismatch { .. } => "RoundTripMismatch",
            Error::DuplicateLocalIndex { .. } => "DuplicateLocalIndex",
            Error::DuplicateGlobalIndex { .. } => "DuplicateGlobalIndex",
            Error::GlobalIndexOutOfRange { .. } => "GlobalIndexOutOfRange",
            Error::CacheIndexMismatch { .. } => "CacheIndexMismatch",
            Error::EnumerationIncomplete { .. } => "EnumerationIncomplete",
        }
    }
}
