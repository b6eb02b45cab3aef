//! Exhaustive verification of the shell layout and the sphere index cache.
//!
//! Each check walks the whole sphere and stops at the first violation, returning
//! an [`Error`] that names the radius, index and coordinate involved.
//!
//! The per-shell audit resets its seen-set at every radius, so it only catches
//! duplicates within one shell. Collisions between different shells are caught by
//! the sphere audit, which tracks global indices across the whole cache.

use std::time::{Duration, Instant};

use crate::cache::SphereIndexCache;
use crate::enumeration::{self, EnumerationBenchmark};
use crate::error::{Error, Result};
use crate::geometry::ShellGeometry;
use crate::progress::{Cadence, Progress, DEFAULT_REPORT_INTERVAL};
use crate::shell::ShellBijection;
use crate::visited::VisitedSet;
use crate::LatticeCoord;

/// The four verification passes, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Check {
    /// Running sum of shell sizes against cumulative counts.
    ShellCounts,
    /// Decode, membership, uniqueness, round trip and cache agreement per shell.
    ShellBijection,
    /// Global uniqueness of every cached index.
    SphereCache,
    /// Shell traversal timed against cube traversal.
    Enumeration,
}

impl Check {
    pub const ALL: [Check; 4] = [
        Check::ShellCounts,
        Check::ShellBijection,
        Check::SphereCache,
        Check::Enumeration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Check::ShellCounts => "shell-counts",
            Check::ShellBijection => "shell-bijection",
            Check::SphereCache => "sphere-cache",
            Check::Enumeration => "enumeration",
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Check {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shell-counts" | "counts" => Ok(Check::ShellCounts),
            "shell-bijection" | "bijection" => Ok(Check::ShellBijection),
            "sphere-cache" | "cache" => Ok(Check::SphereCache),
            "enumeration" | "speed" => Ok(Check::Enumeration),
            other => Err(Error::InvalidParameter(format!("unknown check '{other}'"))),
        }
    }
}

/// Result of one passing check.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CheckOutcome {
    pub check: Check,
    /// Shells, coordinates or traversal steps examined
    pub points: u64,
    pub elapsed: Duration,
}

/// Runs the verification checks against one cache.
///
/// The verifier only reads from the shell layout and the cache.
pub struct IndexVerifier<'a, S: ?Sized> {
    shells: &'a S,
    cache: &'a SphereIndexCache,
    report_interval: u64,
}

impl<'a, S> IndexVerifier<'a, S>
where
    S: ShellGeometry + ShellBijection + ?Sized,
{
    pub fn new(shells: &'a S, cache: &'a SphereIndexCache) -> Self {
        Self {
            shells,
            cache,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    /// Iterations between progress reports.
    pub fn with_report_interval(mut self, interval: u64) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn max_radius(&self) -> u64 {
        self.cache.max_radius()
    }

    /// Run one check.
    pub fn run(&self, check: Check, progress: &mut dyn Progress) -> Result<CheckOutcome> {
        match check {
            Check::ShellCounts => self.check_shell_counts(progress),
            Check::ShellBijection => self.audit_shells(progress),
            Check::SphereCache => self.audit_sphere(progress),
            Check::Enumeration => {
                let started = Instant::now();
                let bench = self.benchmark_enumeration(progress)?;
                Ok(CheckOutcome {
                    check,
                    points: bench.shell_points + bench.cube_points,
                    elapsed: started.elapsed(),
                })
            }
        }
    }

    /// Check that `total_points_in_sphere(r)` equals the running sum of
    /// `points_at(0..=r)` for every shell.
    pub fn check_shell_counts(&self, progress: &mut dyn Progress) -> Result<CheckOutcome> {
        let started = Instant::now();
        let mut running = 0u64;

        for r in 0..=self.max_radius() {
            running += self.shells.points_at(r);
            let total = self.shells.total_points_in_sphere(r);
            if running != total {
                return Err(Error::ShellCountMismatch {
                    radius: r,
                    expected: total,
                    actual: running,
                });
            }
        }

        progress.report(
            format_args!("shell counts consistent through r={}", self.max_radius()),
            true,
        );
        Ok(CheckOutcome {
            check: Check::ShellCounts,
            points: self.max_radius() + 1,
            elapsed: started.elapsed(),
        })
    }

    /// Decode every local index of every shell and check membership,
    /// within-shell uniqueness, the round trip and the cached index.
    pub fn audit_shells(&self, progress: &mut dyn Progress) -> Result<CheckOutcome> {
        let started = Instant::now();
        let mut seen = VisitedSet::with_len(self.cache.len() as u64)?;
        let mut cadence = Cadence::new(self.report_interval);
        let mut examined = 0u64;

        for r in 0..=self.max_radius() {
            seen.clear();
            let base = self.shells.total_points_before(r);
            let points = self.shells.points_at(r);

            for a in 0..points {
                let coord = self.shells.decode(r, a)?;
                check_membership(r, a, coord)?;

                if !seen.insert(self.cache.offset_of(coord)?) {
                    return Err(Error::DuplicateLocalIndex {
                        radius: r,
                        index: a,
                        coord,
                    });
                }

                let back = self.shells.encode(r, coord)?;
                if back != a {
                    return Err(Error::RoundTripMismatch {
                        radius: r,
                        coord,
                        expected: a,
                        actual: back,
                    });
                }

                let cached = self.cache.lookup(coord)?;
                if cached != base + a {
                    return Err(Error::CacheIndexMismatch {
                        radius: r,
                        coord,
                        expected: base + a,
                        actual: cached,
                    });
                }

                if cadence.tick() {
                    progress.report(format_args!("verified {a} / {points}"), true);
                }
            }

            examined += points;
            tracing::debug!(radius = r, points, "shell verified");
            progress.report(
                format_args!(
                    "OK: r={r}, points at radius={points}, points in sphere={}",
                    base + points
                ),
                true,
            );
        }

        Ok(CheckOutcome {
            check: Check::ShellBijection,
            points: examined,
            elapsed: started.elapsed(),
        })
    }

    /// Look up every coordinate of the cube, reached as sign reflections of the
    /// non-negative octant, and check each cached index is in range and used
    /// exactly once across the whole sphere.
    pub fn audit_sphere(&self, progress: &mut dyn Progress) -> Result<CheckOutcome> {
        let started = Instant::now();
        let total = self.shells.total_points_in_sphere(self.max_radius());
        let mut seen = VisitedSet::with_len(total)?;
        let mut cadence = Cadence::new(self.report_interval);
        let mut count = 0u64;

        let max = self.max_radius() as i64;
        for m in 0..=max {
            for n in 0..=max {
                for p in 0..=max {
                    let octant = LatticeCoord::new(m, n, p);
                    if octant == LatticeCoord::ORIGIN {
                        let index = self.cache.lookup(octant)?;
                        if index != 0 {
                            return Err(Error::CacheIndexMismatch {
                                radius: 0,
                                coord: octant,
                                expected: 0,
                                actual: index,
                            });
                        }
                        seen.insert(0);
                        count += 1;
                    } else {
                        for coord in octant.reflections() {
                            let index = self.cache.lookup(coord)?;
                            if index >= total {
                                return Err(Error::GlobalIndexOutOfRange {
                                    coord,
                                    index,
                                    total,
                                });
                            }
                            if !seen.insert(index as usize) {
                                return Err(Error::DuplicateGlobalIndex { coord, index });
                            }
                            count += 1;
                        }
                    }

                    if cadence.tick() {
                        progress.report(format_args!("Verified: {count} / {total}"), true);
                    }
                }
            }
        }

        if count != total {
            return Err(Error::EnumerationIncomplete {
                traversal: "octant reflection",
                visited: count,
                expected: total,
            });
        }
        progress.report(format_args!("Verified: {count} / {total}"), true);

        Ok(CheckOutcome {
            check: Check::SphereCache,
            points: count,
            elapsed: started.elapsed(),
        })
    }

    /// Time shell traversal against cube traversal.
    pub fn benchmark_enumeration(
        &self,
        progress: &mut dyn Progress,
    ) -> Result<EnumerationBenchmark> {
        enumeration::compare(self.shells, self.cache, progress, self.report_interval)
    }
}

/// No axis beyond `r`, at least one axis exactly `r`.
fn check_membership(r: u64, a: u64, coord: LatticeCoord) -> Result<()> {
    let axes = [coord.m, coord.n, coord.p].map(i64::unsigned_abs);

    if axes.iter().any(|&v| v > r) {
        return Err(Error::CoordinateAboveShell {
            radius: r,
            index: a,
            coord,
        });
    }
    if axes.iter().all(|&v| v < r) {
        return Err(Error::CoordinateBelowShell {
            radius: r,
            index: a,
            coord,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::BuildStrategy;
    use crate::geometry::{total_points_in_sphere, CubicShells};
    use crate::progress::Silent;

    /// Cubic shells with one deliberate defect.
    #[derive(Default)]
    struct Faulty {
        /// Added to `total_points_in_sphere` from this radius on
        total_skew_from: Option<u64>,
        /// Swap decode results for these local indices of shell 2
        swap: Option<(u64, u64)>,
        /// Decode this local index of shell 2 to the same coordinate as index 0
        alias: Option<u64>,
        /// Decode index 0 of shell 2 to an inner coordinate
        shrink: bool,
        /// Decode index 0 of shell 2 to an outer coordinate
        grow: bool,
        /// Start this shell one index early, overlapping the previous shell
        overlap_at: Option<u64>,
    }

    impl ShellGeometry for Faulty {
        fn points_at(&self, r: u64) -> u64 {
            CubicShells.points_at(r)
        }

        fn total_points_in_sphere(&self, r: u64) -> u64 {
            let skew = match self.total_skew_from {
                Some(from) if r >= from => 1,
                _ => 0,
            };
            CubicShells.total_points_in_sphere(r) + skew
        }

        fn total_points_before(&self, r: u64) -> u64 {
            let before = match r {
                0 => 0,
                _ => self.total_points_in_sphere(r - 1),
            };
            before - u64::from(self.overlap_at == Some(r))
        }
    }

    impl ShellBijection for Faulty {
        fn decode(&self, r: u64, a: u64) -> Result<LatticeCoord> {
            if r == 2 {
                if let Some((x, y)) = self.swap {
                    if a == x {
                        return CubicShells.decode(r, y);
                    }
                    if a == y {
                        return CubicShells.decode(r, x);
                    }
                }
                if self.alias == Some(a) {
                    return CubicShells.decode(r, 0);
                }
                if a == 0 && self.shrink {
                    return Ok(LatticeCoord::new(1, 1, 1));
                }
                if a == 0 && self.grow {
                    return Ok(LatticeCoord::new(3, 0, 0));
                }
            }
            CubicShells.decode(r, a)
        }

        fn encode(&self, r: u64, coord: LatticeCoord) -> Result<u64> {
            CubicShells.encode(r, coord)
        }
    }

    fn cache(r: u64) -> SphereIndexCache {
        SphereIndexCache::initialize(r).unwrap()
    }

    #[test]
    fn all_checks_pass_on_cubic_shells() {
        let cache = cache(5);
        let verifier = IndexVerifier::new(&CubicShells, &cache).with_report_interval(100);

        let counts = verifier.check_shell_counts(&mut Silent).unwrap();
        assert_eq!(counts.points, 6);

        let shells = verifier.audit_shells(&mut Silent).unwrap();
        assert_eq!(shells.points, total_points_in_sphere(5));

        let sphere = verifier.audit_sphere(&mut Silent).unwrap();
        assert_eq!(sphere.points, total_points_in_sphere(5));
    }

    #[test]
    fn checks_pass_on_reflected_cache() {
        let cache = SphereIndexCache::build(
            &CubicShells,
            4,
            BuildStrategy::Reflected,
            &mut Silent,
            DEFAULT_REPORT_INTERVAL,
        )
        .unwrap();
        let verifier = IndexVerifier::new(&CubicShells, &cache);
        for check in Check::ALL {
            verifier.run(check, &mut Silent).unwrap();
        }
    }

    #[test]
    fn radius_zero_passes() {
        let cache = cache(0);
        let verifier = IndexVerifier::new(&CubicShells, &cache);
        for check in Check::ALL {
            let outcome = verifier.run(check, &mut Silent).unwrap();
            assert_eq!(outcome.check, check);
        }
    }

    #[test]
    fn skewed_totals_are_shell_count_mismatch() {
        let shells = Faulty {
            total_skew_from: Some(3),
            ..Default::default()
        };
        let cache = cache(4);
        let err = IndexVerifier::new(&shells, &cache)
            .check_shell_counts(&mut Silent)
            .unwrap_err();
        assert_eq!(
            err,
            Error::ShellCountMismatch {
                radius: 3,
                expected: total_points_in_sphere(3) + 1,
                actual: total_points_in_sphere(3),
            }
        );
    }

    #[test]
    fn inner_coordinate_is_below_shell() {
        let shells = Faulty {
            shrink: true,
            ..Default::default()
        };
        let cache = cache(3);
        let err = IndexVerifier::new(&shells, &cache)
            .audit_shells(&mut Silent)
            .unwrap_err();
        assert_eq!(
            err,
            Error::CoordinateBelowShell {
                radius: 2,
                index: 0,
                coord: LatticeCoord::new(1, 1, 1)
            }
        );
    }

    #[test]
    fn outer_coordinate_is_above_shell() {
        let shells = Faulty {
            grow: true,
            ..Default::default()
        };
        let cache = cache(3);
        let err = IndexVerifier::new(&shells, &cache)
            .audit_shells(&mut Silent)
            .unwrap_err();
        assert_eq!(err.kind(), "CoordinateAboveShell");
    }

    #[test]
    fn aliased_decode_is_duplicate_local_index() {
        let shells = Faulty {
            alias: Some(7),
            ..Default::default()
        };
        let cache = cache(3);
        let err = IndexVerifier::new(&shells, &cache)
            .audit_shells(&mut Silent)
            .unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateLocalIndex {
                radius: 2,
                index: 7,
                coord: CubicShells.decode(2, 0).unwrap()
            }
        );
    }

    #[test]
    fn swapped_decode_is_round_trip_mismatch() {
        let shells = Faulty {
            swap: Some((3, 9)),
            ..Default::default()
        };
        let cache = cache(3);
        let err = IndexVerifier::new(&shells, &cache)
            .audit_shells(&mut Silent)
            .unwrap_err();
        assert_eq!(
            err,
            Error::RoundTripMismatch {
                radius: 2,
                coord: CubicShells.decode(2, 9).unwrap(),
                expected: 3,
                actual: 9,
            }
        );
    }

    #[test]
    fn cache_built_from_swapped_decode_is_cache_mismatch() {
        // The faulty layout builds a cache that disagrees with the true layout.
        let faulty = Faulty {
            swap: Some((3, 9)),
            ..Default::default()
        };
        let cache = SphereIndexCache::build(
            &faulty,
            3,
            BuildStrategy::Direct,
            &mut Silent,
            DEFAULT_REPORT_INTERVAL,
        )
        .unwrap();

        let err = IndexVerifier::new(&CubicShells, &cache)
            .audit_shells(&mut Silent)
            .unwrap_err();
        let base = CubicShells.total_points_before(2);
        assert_eq!(
            err,
            Error::CacheIndexMismatch {
                radius: 2,
                coord: CubicShells.decode(2, 3).unwrap(),
                expected: base + 3,
                actual: base + 9,
            }
        );

        // Still a permutation of the series range, so the sphere audit passes.
        IndexVerifier::new(&CubicShells, &cache)
            .audit_sphere(&mut Silent)
            .unwrap();
    }

    #[test]
    fn aliased_cache_is_caught_by_sphere_audit() {
        // Index 7 of shell 2 overwrites the slot of index 0, leaving one slot unset.
        let faulty = Faulty {
            alias: Some(7),
            ..Default::default()
        };
        let cache = SphereIndexCache::build(
            &faulty,
            2,
            BuildStrategy::Direct,
            &mut Silent,
            DEFAULT_REPORT_INTERVAL,
        )
        .unwrap();

        let err = IndexVerifier::new(&CubicShells, &cache)
            .audit_sphere(&mut Silent)
            .unwrap_err();
        assert_eq!(err.kind(), "GlobalIndexOutOfRange");
    }

    #[test]
    fn overlapping_shells_are_duplicate_global_indices() {
        // Shell 2 starts at the last index of shell 1.
        let faulty = Faulty {
            overlap_at: Some(2),
            ..Default::default()
        };
        let cache = SphereIndexCache::build(
            &faulty,
            3,
            BuildStrategy::Direct,
            &mut Silent,
            DEFAULT_REPORT_INTERVAL,
        )
        .unwrap();
        let verifier = IndexVerifier::new(&CubicShells, &cache);
        let first_of_shell_2 = CubicShells.decode(2, 0).unwrap();

        assert_eq!(
            verifier.audit_sphere(&mut Silent).unwrap_err(),
            Error::DuplicateGlobalIndex {
                coord: first_of_shell_2,
                index: total_points_in_sphere(1) - 1,
            }
        );
        assert_eq!(
            verifier.audit_shells(&mut Silent).unwrap_err(),
            Error::CacheIndexMismatch {
                radius: 2,
                coord: first_of_shell_2,
                expected: total_points_in_sphere(1),
                actual: total_points_in_sphere(1) - 1,
            }
        );
    }

    #[test]
    fn audits_report_progress() {
        let cache = cache(3);
        let mut messages = Vec::new();
        let mut sink = |message: &str, _: bool| messages.push(message.to_owned());
        IndexVerifier::new(&CubicShells, &cache)
            .with_report_interval(10)
            .audit_shells(&mut sink)
            .unwrap();
        assert!(messages.iter().any(|m| m.starts_with("verified")));
        assert!(messages
            .iter()
            .any(|m| m == "OK: r=3, points at radius=218, points in sphere=343"));
    }

    #[test]
    fn check_names_parse() {
        for check in Check::ALL {
            assert_eq!(check.name().parse::<Check>(), Ok(check));
        }
        assert_eq!("speed".parse::<Check>(), Ok(Check::Enumeration));
        assert!("everything".parse::<Check>().is_err());
    }
}
