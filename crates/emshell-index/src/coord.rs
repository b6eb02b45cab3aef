//! Cubic lattice coordinates.
//!
//! A coordinate `(m, n, p)` is a signed offset from the lattice origin along three
//! orthogonal axes. Its shell is the Chebyshev radius `max(|m|, |n|, |p|)`, so the
//! shells are the surfaces of nested cubes around the origin.

use std::ops::{Add, Neg, Sub};

/// A point on the cubic lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatticeCoord {
    /// First axis (x)
    pub m: i64,
    /// Second axis (y)
    pub n: i64,
    /// Third axis (z)
    pub p: i64,
}

impl LatticeCoord {
    /// Origin of the lattice, the only point of shell 0.
    pub const ORIGIN: Self = Self { m: 0, n: 0, p: 0 };

    /// Create a new coordinate.
    pub const fn new(m: i64, n: i64, p: i64) -> Self {
        Self { m, n, p }
    }

    /// Shell radius: the largest axis magnitude.
    #[inline]
    pub fn radius(&self) -> u64 {
        self.m
            .unsigned_abs()
            .max(self.n.unsigned_abs())
            .max(self.p.unsigned_abs())
    }

    /// True when the coordinate lies on shell `radius`.
    #[inline]
    pub fn on_shell(&self, radius: u64) -> bool {
        self.radius() == radius
    }

    /// Number of axes with a nonzero component.
    pub fn nonzero_axes(&self) -> u32 {
        (self.m != 0) as u32 + (self.n != 0) as u32 + (self.p != 0) as u32
    }

    /// Number of distinct sign reflections, `2^k` for `k` nonzero axes.
    pub fn reflection_count(&self) -> usize {
        1 << self.nonzero_axes()
    }

    /// Iterate over the distinct sign reflections of this coordinate.
    ///
    /// The coordinate itself comes first. Axes that are zero are never flipped,
    /// so every yielded coordinate is distinct.
    pub fn reflections(&self) -> Reflections {
        Reflections {
            base: *self,
            mask: 0,
        }
    }

    /// Flip the sign of the axes selected by the low three bits of `mask`.
    #[inline]
    fn reflect(&self, mask: u8) -> Self {
        let flip = |v: i64, bit: u8| if mask & bit != 0 { -v } else { v };
        Self::new(flip(self.m, 1), flip(self.n, 2), flip(self.p, 4))
    }
}

/// Iterator over the sign reflections of a coordinate.
#[derive(Debug, Clone)]
pub struct Reflections {
    base: LatticeCoord,
    mask: u8,
}

impl Iterator for Reflections {
    type Item = LatticeCoord;

    fn next(&mut self) -> Option<Self::Item> {
        while self.mask < 8 {
            let mask = self.mask;
            self.mask += 1;

            let flips_zero = (mask & 1 != 0 && self.base.m == 0)
                || (mask & 2 != 0 && self.base.n == 0)
                || (mask & 4 != 0 && self.base.p == 0);
            if !flips_zero {
                return Some(self.base.reflect(mask));
            }
        }
        None
    }
}

impl Add for LatticeCoord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            m: self.m + other.m,
            n: self.n + other.n,
            p: self.p + other.p,
        }
    }
}

impl Sub for LatticeCoord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            m: self.m - other.m,
            n: self.n - other.n,
            p: self.p - other.p,
        }
    }
}

impl Neg for LatticeCoord {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            m: -self.m,
            n: -self.n,
            p: -self.p,
        }
    }
}

impl From<(i64, i64, i64)> for LatticeCoord {
    fn from((m, n, p): (i64, i64, i64)) -> Self {
        Self::new(m, n, p)
    }
}

impl std::fmt::Display for LatticeCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.m, self.n, self.p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn origin_is_shell_zero() {
        assert_eq!(LatticeCoord::ORIGIN.radius(), 0);
        assert!(LatticeCoord::ORIGIN.on_shell(0));
        assert_eq!(LatticeCoord::ORIGIN.reflection_count(), 1);
    }

    #[test]
    fn radius_is_largest_magnitude() {
        assert_eq!(LatticeCoord::new(1, 0, 0).radius(), 1);
        assert_eq!(LatticeCoord::new(-3, 2, 1).radius(), 3);
        assert_eq!(LatticeCoord::new(0, -4, 4).radius(), 4);
        assert_eq!(LatticeCoord::new(2, 2, -7).radius(), 7);
    }

    #[test]
    fn reflections_skip_zero_axes() {
        let single: Vec<_> = LatticeCoord::new(2, 0, 0).reflections().collect();
        assert_eq!(single, vec![LatticeCoord::new(2, 0, 0), LatticeCoord::new(-2, 0, 0)]);

        assert_eq!(LatticeCoord::new(1, 1, 0).reflections().count(), 4);
        assert_eq!(LatticeCoord::new(1, 2, 3).reflections().count(), 8);
        assert_eq!(LatticeCoord::ORIGIN.reflections().count(), 1);
    }

    #[test]
    fn reflections_are_distinct_and_same_shell() {
        let base = LatticeCoord::new(3, 0, 5);
        let all: HashSet<_> = base.reflections().collect();
        assert_eq!(all.len(), base.reflection_count());
        for c in &all {
            assert_eq!(c.radius(), base.radius());
            assert_eq!(c.m.abs(), 3);
            assert_eq!(c.n, 0);
            assert_eq!(c.p.abs(), 5);
        }
    }

    #[test]
    fn addition_subtraction() {
        let a = LatticeCoord::new(1, 2, 3);
        let b = LatticeCoord::new(4, -1, 2);

        assert_eq!(a + b, LatticeCoord::new(5, 1, 5));
        assert_eq!(a - b, LatticeCoord::new(-3, 3, 1));
        assert_eq!(a + (-b), a - b);
    }

    #[test]
    fn display_format() {
        assert_eq!(LatticeCoord::new(-1, 0, 2).to_string(), "(-1, 0, 2)");
    }
}
