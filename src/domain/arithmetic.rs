//! Interval arithmetic on domains.
//!
//! All operations clamp their results into `[0, SUP]`; the solver never
//! produces values outside that band. `plus` and `minus` are exact on the
//! represented sets. `times` and `divby` reason on bounds only, which keeps
//! them cheap at the cost of weaker pruning.

use super::Domain;
use super::Interval;
use super::SUP;

impl Domain {
    /// The set of clamped sums `x + y` with `x` from `self` and `y` from
    /// `other`.
    pub fn plus(&self, other: &Domain) -> Domain {
        if self.is_empty() || other.is_empty() {
            return Domain::empty();
        }
        let (a, b) = close_gaps2(self, other);
        let mut out = Vec::with_capacity(a.segments.len() * b.segments.len());
        for x in a.segments.iter() {
            for y in b.segments.iter() {
                out.push(Interval::new(
                    clamp(u64::from(x.lo) + u64::from(y.lo)),
                    clamp(u64::from(x.hi) + u64::from(y.hi)),
                ));
            }
        }
        Domain::from_vec(out)
    }

    /// The set of differences `x - y`, clamped to be non-negative.
    pub fn minus(&self, other: &Domain) -> Domain {
        if self.is_empty() || other.is_empty() {
            return Domain::empty();
        }
        let (a, b) = close_gaps2(self, other);
        let mut out = Vec::new();
        for x in a.segments.iter() {
            for y in b.segments.iter() {
                // A pair contributes only when some difference is
                // non-negative.
                if x.hi >= y.lo {
                    out.push(Interval::new(x.lo.saturating_sub(y.hi), x.hi - y.lo));
                }
            }
        }
        Domain::from_vec(out)
    }

    /// Bounds-consistent products: every product lands in the result, but the
    /// result may contain non-products.
    pub fn times(&self, other: &Domain) -> Domain {
        let mut out = Vec::with_capacity(self.segments.len() * other.segments.len());
        for x in self.segments.iter() {
            for y in other.segments.iter() {
                out.push(Interval::new(
                    clamp(u64::from(x.lo) * u64::from(y.lo)),
                    clamp(u64::from(x.hi) * u64::from(y.hi)),
                ));
            }
        }
        Domain::from_vec(out)
    }

    /// Bounds-consistent quotients. Divisor intervals that are exactly zero
    /// are skipped; an interval whose lower bound is zero contributes an
    /// upper bound of `SUP`.
    pub fn divby(&self, other: &Domain) -> Domain {
        let mut out = Vec::new();
        for x in self.segments.iter() {
            for y in other.segments.iter() {
                if y.hi == 0 {
                    continue;
                }
                let lo = x.lo / y.hi;
                let hi = if y.lo == 0 { SUP } else { x.hi / y.lo };
                out.push(Interval::new(lo, hi));
            }
        }
        Domain::from_vec(out)
    }

    /// The products `k * x` for every `x` in the domain, clamped to `SUP`.
    pub(crate) fn scale_up(&self, k: u32) -> Domain {
        let mut out = Vec::with_capacity(self.segments.len());
        for seg in self.segments.iter() {
            out.push(Interval::new(
                clamp(u64::from(seg.lo) * u64::from(k)),
                clamp(u64::from(seg.hi) * u64::from(k)),
            ));
        }
        Domain::from_vec(out)
    }

    /// The floored quotients `x / k` for every `x` in the domain.
    pub(crate) fn scale_down(&self, k: u32) -> Domain {
        let mut out = Vec::with_capacity(self.segments.len());
        for seg in self.segments.iter() {
            out.push(Interval::new(seg.lo / k, seg.hi / k));
        }
        Domain::from_vec(out)
    }
}

fn clamp(value: u64) -> u32 {
    value.min(u64::from(SUP)) as u32
}

/// Merges, in `domain`, every gap narrower than `width` values.
///
/// When adding some other domain whose narrowest interval spans `width`
/// values, each interval of `domain` widens by at least `width - 1`, so gaps
/// of fewer than `width` missing values disappear from the sum anyway.
/// Closing them first caps how fragmented the cross-product result can get
/// without changing the represented sum set.
pub(crate) fn close_gaps(domain: &Domain, width: u64) -> Domain {
    if domain.segments.len() <= 1 || width <= 1 {
        return domain.clone();
    }
    let mut out: Vec<Interval> = Vec::with_capacity(domain.segments.len());
    for seg in domain.segments.iter() {
        match out.last_mut() {
            Some(last) if u64::from(seg.lo) - u64::from(last.hi) - 1 < width => {
                last.hi = seg.hi;
            }
            _ => out.push(*seg),
        }
    }
    Domain::from_vec(out)
}

/// Runs [`close_gaps`] on both operands against each other's narrowest
/// interval width until neither shrinks any further.
pub fn close_gaps2(a: &Domain, b: &Domain) -> (Domain, Domain) {
    let mut a = a.clone();
    let mut b = b.clone();
    loop {
        let next_a = close_gaps(&a, b.smallest_width());
        let next_b = close_gaps(&b, next_a.smallest_width());
        let stable = next_a.segments.len() == a.segments.len()
            && next_b.segments.len() == b.segments.len();
        a = next_a;
        b = next_b;
        if stable {
            return (a, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::super::tests_support::domain_strategy;
    use super::*;

    #[test]
    fn plus_of_single_intervals() {
        let a = Domain::interval(3, 3);
        let b = Domain::interval(0, SUP);
        assert_eq!(a.plus(&b), Domain::interval(3, SUP));
    }

    #[test]
    fn plus_clamps_at_sup() {
        let a = Domain::singleton(SUP);
        let b = Domain::interval(5, 10);
        assert_eq!(a.plus(&b), Domain::singleton(SUP));
    }

    #[test]
    fn minus_clamps_at_zero() {
        let a = Domain::interval(2, 5);
        let b = Domain::interval(4, 9);
        // Differences range over [2-9, 5-4], clamped to [0, 1].
        assert_eq!(a.minus(&b), Domain::interval(0, 1));
    }

    #[test]
    fn minus_skips_strictly_negative_pairs() {
        let a = Domain::interval(0, 3);
        let b = Domain::interval(10, 12);
        assert!(a.minus(&b).is_empty());
    }

    #[test]
    fn times_reasons_on_bounds() {
        let a = Domain::interval(2, 3);
        let b = Domain::interval(4, 5);
        assert_eq!(a.times(&b), Domain::interval(8, 15));
    }

    #[test]
    fn divby_skips_zero_divisors() {
        let a = Domain::interval(10, 20);
        assert!(a.divby(&Domain::singleton(0)).is_empty());
        // A divisor touching zero caps the quotient at SUP.
        assert_eq!(a.divby(&Domain::interval(0, 5)), Domain::interval(2, SUP));
        assert_eq!(a.divby(&Domain::interval(2, 5)), Domain::interval(2, 10));
    }

    #[test]
    fn close_gaps_merges_only_narrow_gaps() {
        // Gaps of 1 and 3 missing values; a width of 2 closes only the first.
        let domain = Domain::from_intervals([(0, 1), (3, 4), (8, 9)]);
        let closed = close_gaps(&domain, 2);
        assert_eq!(closed, Domain::from_intervals([(0, 4), (8, 9)]));
    }

    proptest! {
        #[test]
        fn plus_is_exactly_the_clamped_sums(a in domain_strategy(), b in domain_strategy()) {
            let result = a.plus(&b);
            let mut expected: Vec<u32> = a
                .values()
                .flat_map(|x| b.values().map(move |y| (x + y).min(SUP)))
                .collect();
            expected.sort_unstable();
            expected.dedup();
            let actual: Vec<u32> = result.values().collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn minus_is_exactly_the_nonnegative_differences(
            a in domain_strategy(),
            b in domain_strategy(),
        ) {
            let result = a.minus(&b);
            let mut expected: Vec<u32> = a
                .values()
                .flat_map(|x| {
                    b.values().filter(move |&y| y <= x).map(move |y| x - y)
                })
                .collect();
            expected.sort_unstable();
            expected.dedup();
            let actual: Vec<u32> = result.values().collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn close_gaps2_returns_supersets(a in domain_strategy(), b in domain_strategy()) {
            if a.is_empty() || b.is_empty() {
                return Ok(());
            }
            let (wide_a, wide_b) = close_gaps2(&a, &b);
            prop_assert!(a.values().all(|v| wide_a.contains(v)));
            prop_assert!(b.values().all(|v| wide_b.contains(v)));
        }

        #[test]
        fn close_gaps2_is_irreducible(a in domain_strategy(), b in domain_strategy()) {
            if a.is_empty() || b.is_empty() {
                return Ok(());
            }
            let (wide_a, wide_b) = close_gaps2(&a, &b);
            let again_a = close_gaps(&wide_a, wide_b.smallest_width());
            let again_b = close_gaps(&wide_b, wide_a.smallest_width());
            prop_assert_eq!(again_a, wide_a);
            prop_assert_eq!(again_b, wide_b);
        }

        #[test]
        fn times_contains_every_product(a in domain_strategy(), b in domain_strategy()) {
            let result = a.times(&b);
            for x in a.values().step_by(3) {
                for y in b.values().step_by(3) {
                    let product = (u64::from(x) * u64::from(y)).min(u64::from(SUP)) as u32;
                    prop_assert!(result.contains(product));
                }
            }
        }
    }
}
