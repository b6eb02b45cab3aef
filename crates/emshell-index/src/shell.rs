//! Shell index bijection.
//!
//! Maps a local index `a` in `[0, points_at(r))` to the unique coordinate of shell
//! `r` and back. Field samples are stored shell by shell, so the global series
//! index of a coordinate is `total_points_before(r) + a`.
//!
//! # Enumeration Order Within Shells
//!
//! Shell r > 0 splits into the side band (|p| < r, where max(|m|, |n|) = r) and the
//! two caps (|p| = r, where m and n range freely over [-r, r]):
//!
//! 1. Side levels p = 0, +1, -1, +2, -2, ..., ±(r-1). Each level holds the square
//!    ring max(|m|, |n|) = r, 8r points, walked counter-clockwise from (r, -r).
//! 2. Cap p = +r, (2r+1)² points in row-major (m, n) order.
//! 3. Cap p = -r, same order.
//!
//! Check: (2r-1)·8r + 2(2r+1)² = 24r² + 2 ✓
//!
//! Both directions are O(1).

use crate::error::{Error, Result};
use crate::geometry::{points_at, total_points_before, total_points_in_sphere, CubicShells};
use crate::LatticeCoord;

/// A global series index: position of a coordinate in the shell-ordered buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesIndex(pub u64);

impl SeriesIndex {
    /// Index of the origin.
    pub const ORIGIN: Self = Self(0);

    #[inline]
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Determine which shell this index falls in.
    pub fn shell(&self) -> u64 {
        if self.0 == 0 {
            return 0;
        }
        // Binary search: smallest r with total_points_in_sphere(r) > index
        let mut low = 1u64;
        let mut high = ((self.0 as f64).cbrt() as u64) / 2 + 2;

        while low < high {
            let mid = (low + high) / 2;
            // A sphere too large for u64 holds every index.
            let fits = (2 * mid + 1)
                .checked_pow(3)
                .is_some_and(|total| total <= self.0);
            if fits {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        low
    }

    /// Local index within the shell.
    pub fn offset_in_shell(&self) -> u64 {
        self.0 - total_points_before(self.shell())
    }
}

impl From<u64> for SeriesIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SeriesIndex> for u64 {
    fn from(value: SeriesIndex) -> Self {
        value.0
    }
}

/// Converts between local shell indices and coordinates.
pub trait ShellBijection {
    /// Coordinate at local index `a` of shell `r`.
    fn decode(&self, r: u64, a: u64) -> Result<LatticeCoord>;

    /// Local index of `coord` within shell `r`.
    fn encode(&self, r: u64, coord: LatticeCoord) -> Result<u64>;
}

impl ShellBijection for CubicShells {
    #[inline]
    fn decode(&self, r: u64, a: u64) -> Result<LatticeCoord> {
        decode(r, a)
    }

    #[inline]
    fn encode(&self, r: u64, coord: LatticeCoord) -> Result<u64> {
        encode(r, coord)
    }
}

/// Coordinate at local index `a` of shell `r`.
///
/// Fails with [`Error::IndexOutOfRange`] when `a >= points_at(r)`.
pub fn decode(r: u64, a: u64) -> Result<LatticeCoord> {
    let points = points_at(r);
    if a >= points {
        return Err(Error::IndexOutOfRange {
            radius: r,
            index: a,
            points,
        });
    }
    Ok(locate(r, a))
}

/// Local index of `coord` within shell `r`.
///
/// Fails with [`Error::InvalidCoordinate`] when `coord` is not on shell `r`.
pub fn encode(r: u64, coord: LatticeCoord) -> Result<u64> {
    if !coord.on_shell(r) {
        return Err(Error::InvalidCoordinate { radius: r, coord });
    }
    Ok(local_offset(r, coord))
}

/// Convert a global series index to coordinates.
pub fn series_to_coord(index: SeriesIndex) -> LatticeCoord {
    let shell = index.shell();
    locate(shell, index.0 - total_points_before(shell))
}

/// Convert coordinates to a global series index.
pub fn coord_to_series(coord: LatticeCoord) -> SeriesIndex {
    let shell = coord.radius();
    SeriesIndex(total_points_before(shell) + local_offset(shell, coord))
}

// ============ Shell layout ============

/// Points on one side level: the square ring of radius r.
#[inline]
const fn ring_size(r: u64) -> u64 {
    8 * r
}

/// Points on one cap: the full (2r+1)² square.
#[inline]
const fn cap_size(r: u64) -> u64 {
    let side = 2 * r + 1;
    side * side
}

/// Points on all side levels of shell r.
#[inline]
const fn band_size(r: u64) -> u64 {
    (2 * r - 1) * ring_size(r)
}

/// Caller guarantees `a < points_at(r)`.
fn locate(r: u64, a: u64) -> LatticeCoord {
    if r == 0 {
        return LatticeCoord::ORIGIN;
    }

    let ring = ring_size(r);
    let band = band_size(r);

    if a < band {
        let (m, n) = ring_coord(r, a % ring);
        LatticeCoord::new(m, n, level_height(a / ring))
    } else {
        let rest = a - band;
        let cap = cap_size(r);
        let (p, offset) = if rest < cap {
            (r as i64, rest)
        } else {
            (-(r as i64), rest - cap)
        };
        let (m, n) = cap_coord(r, offset);
        LatticeCoord::new(m, n, p)
    }
}

/// Caller guarantees `coord.radius() == r`.
fn local_offset(r: u64, coord: LatticeCoord) -> u64 {
    if r == 0 {
        return 0;
    }

    if coord.p.unsigned_abs() < r {
        // Side band: max(|m|, |n|) = r
        level_index(coord.p) * ring_size(r) + ring_offset(r, coord.m, coord.n)
    } else {
        let cap_base = if coord.p > 0 {
            band_size(r)
        } else {
            band_size(r) + cap_size(r)
        };
        cap_base + cap_offset(r, coord.m, coord.n)
    }
}

/// Level index 0 → p=0, 1 → p=1, 2 → p=-1, 3 → p=2, 4 → p=-2, ...
#[inline]
fn level_height(level: u64) -> i64 {
    let half = ((level + 1) / 2) as i64;
    if level % 2 == 1 {
        half
    } else {
        -half
    }
}

#[inline]
fn level_index(p: i64) -> u64 {
    match p {
        0 => 0,
        p if p > 0 => 2 * p as u64 - 1,
        p => 2 * p.unsigned_abs(),
    }
}

/// Ring corners, walked counter-clockwise starting at (r, -r).
const RING_CORNERS: [(i64, i64); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

/// Direction along each ring edge.
const RING_DIRECTIONS: [(i64, i64); 4] = [(0, 1), (-1, 0), (0, -1), (1, 0)];

/// Planar coordinate at a given offset within the square ring of radius r.
fn ring_coord(r: u64, offset: u64) -> (i64, i64) {
    let edge_len = 2 * r;
    let edge = (offset / edge_len) as usize;
    let pos = (offset % edge_len) as i64;
    let r = r as i64;

    let (cm, cn) = RING_CORNERS[edge];
    let (dm, dn) = RING_DIRECTIONS[edge];
    (cm * r + dm * pos, cn * r + dn * pos)
}

/// Offset of (m, n) within the square ring of radius r.
fn ring_offset(r: u64, m: i64, n: i64) -> u64 {
    let edge_len = 2 * r;
    let r = r as i64;

    // Each edge owns its starting corner but not its end corner.
    let (edge, pos) = if m == r && n < r {
        (0, n + r)
    } else if n == r && m > -r {
        (1, r - m)
    } else if m == -r && n > -r {
        (2, r - n)
    } else {
        (3, m + r)
    };
    edge * edge_len + pos as u64
}

#[inline]
fn cap_coord(r: u64, offset: u64) -> (i64, i64) {
    let side = 2 * r + 1;
    ((offset / side) as i64 - r as i64, (offset % side) as i64 - r as i64)
}

#[inline]
fn cap_offset(r: u64, m: i64, n: i64) -> u64 {
    let side = 2 * r + 1;
    let r = r as i64;
    (m + r) as u64 * side + (n + r) as u64
}

/// Iterator over coordinates in series order.
#[derive(Debug, Clone)]
pub struct ShellWalk {
    radius: u64,
    offset: u64,
    remaining: Option<u64>,
}

impl ShellWalk {
    /// Walk every shell from the origin outward, without end.
    pub fn new() -> Self {
        Self {
            radius: 0,
            offset: 0,
            remaining: None,
        }
    }

    /// Walk the first `count` coordinates.
    pub fn take_points(count: u64) -> Self {
        Self {
            radius: 0,
            offset: 0,
            remaining: Some(count),
        }
    }

    /// Walk shells `start..=end`.
    pub fn shells(start: u64, end: u64) -> Self {
        let count = if end < start {
            0
        } else {
            total_points_in_sphere(end) - total_points_before(start)
        };
        Self {
            radius: start,
            offset: 0,
            remaining: Some(count),
        }
    }
}

impl Default for ShellWalk {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for ShellWalk {
    type Item = LatticeCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }

        let coord = locate(self.radius, self.offset);
        self.offset += 1;
        if self.offset == points_at(self.radius) {
            self.radius += 1;
            self.offset = 0;
        }
        Some(coord)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(remaining) => (remaining as usize, Some(remaining as usize)),
            None => (usize::MAX, None),
        }
    }
}
