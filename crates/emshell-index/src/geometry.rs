//! Grid geometry: shell sizes and cumulative counts.
//!
//! A lattice of size parameter `N` is a cube of `4N + 3` points per side centred
//! on the origin, so its outermost shell has radius `2N + 1`.
//!
//! Shell sizes:
//! - Shell 0: 1 (origin only)
//! - Shell r > 0: (2r+1)³ − (2r−1)³ = 24r² + 2
//!
//! Total through shell r: (2r+1)³

use crate::error::{Error, Result};

/// Largest lattice size parameter whose point count still fits in a `u64`.
pub const MAX_LATTICE_SIZE: u64 = 524_287;

/// Number of lattice points in shell `r`.
#[inline]
pub const fn points_at(r: u64) -> u64 {
    if r == 0 {
        1
    } else {
        24 * r * r + 2
    }
}

/// Total lattice points through shell `r` (inclusive).
#[inline]
pub const fn total_points_in_sphere(r: u64) -> u64 {
    let side = 2 * r + 1;
    side * side * side
}

/// Total lattice points in every shell below `r`; the global index of the first
/// point of shell `r`.
#[inline]
pub const fn total_points_before(r: u64) -> u64 {
    if r == 0 {
        0
    } else {
        total_points_in_sphere(r - 1)
    }
}

/// Points per side of the lattice for size parameter `n`.
pub fn grid_points(n: i64) -> Result<u64> {
    Ok(4 * lattice_size(n)? + 3)
}

/// Largest shell radius for size parameter `n`.
pub fn max_radius(n: i64) -> Result<u64> {
    Ok(2 * lattice_size(n)? + 1)
}

fn lattice_size(n: i64) -> Result<u64> {
    if n < 0 {
        return Err(Error::InvalidParameter(format!(
            "lattice size must be non-negative, got {n}"
        )));
    }
    let n = n as u64;
    if n > MAX_LATTICE_SIZE {
        return Err(Error::InvalidParameter(format!(
            "lattice size {n} exceeds maximum {MAX_LATTICE_SIZE}"
        )));
    }
    Ok(n)
}

/// Source of shell sizes for the cache and the verification checks.
///
/// Every downstream index computation assumes
/// `total_points_in_sphere(r) == total_points_before(r) + points_at(r)`.
pub trait ShellGeometry {
    /// Number of coordinates on shell `r`.
    fn points_at(&self, r: u64) -> u64;

    /// Number of coordinates on shells `0..=r`.
    fn total_points_in_sphere(&self, r: u64) -> u64;

    /// Number of coordinates on shells `0..r`.
    fn total_points_before(&self, r: u64) -> u64 {
        if r == 0 {
            0
        } else {
            self.total_points_in_sphere(r - 1)
        }
    }
}

/// The closed-form cubic shell geometry and bijection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CubicShells;

impl ShellGeometry for CubicShells {
    #[inline]
    fn points_at(&self, r: u64) -> u64 {
        points_at(r)
    }

    #[inline]
    fn total_points_in_sphere(&self, r: u64) -> u64 {
        total_points_in_sphere(r)
    }

    #[inline]
    fn total_points_before(&self, r: u64) -> u64 {
        total_points_before(r)
    }
}

/// Geometry derived once from the lattice size parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridGeometry {
    /// Lattice size parameter N
    pub lattice_size: u64,
    /// Points per side of the lattice cube (4N + 3)
    pub grid_points: u64,
    /// Outermost shell radius (2N + 1)
    pub max_radius: u64,
}

impl GridGeometry {
    /// Derive the geometry for size parameter `n`.
    pub fn from_lattice_size(n: i64) -> Result<Self> {
        Ok(Self {
            lattice_size: lattice_size(n)?,
            grid_points: grid_points(n)?,
            max_radius: max_radius(n)?,
        })
    }

    /// Total number of lattice points.
    pub fn total_points(&self) -> u64 {
        total_points_in_sphere(self.max_radius)
    }
}
