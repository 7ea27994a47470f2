//! Finite domains as canonical sorted interval sequences.
//!
//! A [`Domain`] is a set of integers in `[0, SUP]`, stored as an ordered
//! sequence of closed intervals. The canonical form keeps the sequence
//! sorted by lower bound with every interval non-empty and no two adjacent
//! intervals overlapping or touching, so structural equality coincides with
//! set equality and every query is a short walk over the segments.
//!
//! Domains are immutable value objects behind a reference-counted slice:
//! cloning one is cheap, which is what makes cloning a whole computation
//! space cheap.

use std::fmt::Display;
use std::fmt::Formatter;
use std::rc::Rc;

use crate::ozkin_assert_moderate;
use crate::ozkin_assert_simple;

mod arithmetic;

pub use arithmetic::close_gaps2;

/// The smallest value a variable can take.
pub const INF: u32 = 0;

/// The largest value a variable can take.
pub const SUP: u32 = 100_000_000;

/// A closed interval `[lo, hi]` of integers.
///
/// An interval with `lo > hi` denotes the empty set; such intervals are
/// accepted by [`Domain::from_intervals`] and dropped during
/// canonicalisation, but never stored in a [`Domain`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval {
    /// Lower bound, inclusive.
    pub lo: u32,
    /// Upper bound, inclusive.
    pub hi: u32,
}

impl Interval {
    /// Creates the interval `[lo, hi]`.
    pub fn new(lo: u32, hi: u32) -> Self {
        Interval { lo, hi }
    }

    /// The number of integers in the interval.
    pub(crate) fn width(self) -> u64 {
        if self.lo > self.hi {
            0
        } else {
            u64::from(self.hi - self.lo) + 1
        }
    }
}

/// A set of integers in `[0, SUP]` in canonical sorted interval form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    segments: Rc<[Interval]>,
}

impl Domain {
    /// The empty set.
    pub fn empty() -> Self {
        Domain {
            segments: Rc::from([]),
        }
    }

    /// The full domain `[0, SUP]`.
    pub fn full() -> Self {
        Domain::interval(INF, SUP)
    }

    /// The set containing exactly `value`.
    pub fn singleton(value: u32) -> Self {
        Domain::interval(value, value)
    }

    /// The set `[lo, hi]`.
    ///
    /// # Panics
    ///
    /// Panics when `lo > hi` or `hi > SUP`.
    pub fn interval(lo: u32, hi: u32) -> Self {
        ozkin_assert_simple!(lo <= hi, "domain interval [{lo}, {hi}] is empty");
        ozkin_assert_simple!(hi <= SUP, "domain interval [{lo}, {hi}] exceeds SUP");
        Domain {
            segments: Rc::from([Interval::new(lo, hi)]),
        }
    }

    /// Builds a domain from `(lo, hi)` pairs in any order.
    ///
    /// Empty pairs (`lo > hi`) are dropped; overlapping or touching pairs are
    /// merged.
    ///
    /// # Panics
    ///
    /// Panics when any bound exceeds `SUP`.
    pub fn from_intervals(intervals: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let raw: Vec<Interval> = intervals
            .into_iter()
            .map(|(lo, hi)| Interval::new(lo, hi))
            .collect();
        for interval in &raw {
            ozkin_assert_simple!(
                interval.lo > interval.hi || interval.hi <= SUP,
                "domain interval exceeds SUP"
            );
        }
        Domain::from_vec(raw)
    }

    /// Wraps a possibly non-canonical interval vector, canonicalising it
    /// first. A vector that is already canonical is used unchanged.
    pub(crate) fn from_vec(intervals: Vec<Interval>) -> Self {
        Domain {
            segments: Rc::from(canonicalize(intervals)),
        }
    }

    /// The canonical interval sequence.
    pub fn segments(&self) -> &[Interval] {
        &self.segments
    }

    /// True when the domain contains no values.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The number of integers in the domain.
    pub fn size(&self) -> u64 {
        self.segments.iter().map(|seg| seg.width()).sum()
    }

    /// The single value of a determined domain, or `None` when the domain is
    /// empty or still holds more than one value.
    pub fn value(&self) -> Option<u32> {
        match &*self.segments {
            [seg] if seg.lo == seg.hi => Some(seg.lo),
            _ => None,
        }
    }

    /// The extreme bounds `(min, max)`, or `None` on the empty domain.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;
        Some((first.lo, last.hi))
    }

    /// The smallest value, or `None` on the empty domain.
    pub fn min(&self) -> Option<u32> {
        self.segments.first().map(|seg| seg.lo)
    }

    /// The largest value, or `None` on the empty domain.
    pub fn max(&self) -> Option<u32> {
        self.segments.last().map(|seg| seg.hi)
    }

    /// The exact middle value across all intervals (the median, rounded
    /// down), or `None` on the empty domain.
    pub fn mid(&self) -> Option<u32> {
        if self.is_empty() {
            return None;
        }
        self.nth_value((self.size() - 1) / 2)
    }

    /// The midpoint of the middle interval. Cheaper than [`Domain::mid`] and
    /// good enough for branching heuristics.
    pub fn rough_mid(&self) -> Option<u32> {
        let seg = self.segments.get(self.segments.len() / 2)?;
        Some((seg.lo + seg.hi) / 2)
    }

    /// True when `value` is in the domain.
    pub fn contains(&self, value: u32) -> bool {
        self.segments
            .iter()
            .take_while(|seg| seg.lo <= value)
            .any(|seg| value <= seg.hi)
    }

    /// The `index`-th smallest value, or `None` when the domain holds fewer
    /// than `index + 1` values.
    pub fn nth_value(&self, index: u64) -> Option<u32> {
        let mut remaining = index;
        for seg in self.segments.iter() {
            let width = seg.width();
            if remaining < width {
                return Some(seg.lo + u32::try_from(remaining).expect("widths fit in u32"));
            }
            remaining -= width;
        }
        None
    }

    /// Iterates over all values in ascending order.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.segments.iter().flat_map(|seg| seg.lo..=seg.hi)
    }

    /// The set of integers present in both domains.
    pub fn intersection(&self, other: &Domain) -> Domain {
        let a = &self.segments;
        let b = &other.segments;
        let mut out = Vec::with_capacity(a.len().max(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let lo = a[i].lo.max(b[j].lo);
            let hi = a[i].hi.min(b[j].hi);
            if lo <= hi {
                out.push(Interval::new(lo, hi));
            }
            // Advance whichever interval ends first; it cannot overlap
            // anything further in the other sequence.
            if a[i].hi <= b[j].hi {
                i += 1;
            } else {
                j += 1;
            }
        }
        ozkin_assert_moderate!(is_canonical(&out), "intersection must stay canonical");
        Domain {
            segments: Rc::from(out),
        }
    }

    /// The set of integers present in either domain.
    pub fn union(&self, other: &Domain) -> Domain {
        let mut raw = Vec::with_capacity(self.segments.len() + other.segments.len());
        raw.extend_from_slice(&self.segments);
        raw.extend_from_slice(&other.segments);
        Domain::from_vec(raw)
    }

    /// The set of integers in `[0, SUP]` that are not in this domain.
    pub fn complement(&self) -> Domain {
        let mut out = Vec::with_capacity(self.segments.len() + 1);
        let mut next = INF;
        for seg in self.segments.iter() {
            if seg.lo > next {
                out.push(Interval::new(next, seg.lo - 1));
            }
            next = seg.hi + 1;
        }
        if next <= SUP {
            out.push(Interval::new(next, SUP));
        }
        Domain {
            segments: Rc::from(out),
        }
    }

    /// The width of the narrowest interval, or zero on the empty domain.
    pub(crate) fn smallest_width(&self) -> u64 {
        self.segments.iter().map(|seg| seg.width()).min().unwrap_or(0)
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "∅");
        }
        write!(f, "{{")?;
        for (index, seg) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            if seg.lo == seg.hi {
                write!(f, "{}", seg.lo)?;
            } else {
                write!(f, "{}..={}", seg.lo, seg.hi)?;
            }
        }
        write!(f, "}}")
    }
}

/// True when the sequence is sorted, gap-separated, and free of empty
/// intervals.
pub(crate) fn is_canonical(intervals: &[Interval]) -> bool {
    intervals.iter().all(|seg| seg.lo <= seg.hi)
        && intervals
            .windows(2)
            .all(|pair| u64::from(pair[0].hi) + 1 < u64::from(pair[1].lo))
}

/// Sorts, drops empty intervals, and merges touching or overlapping
/// neighbours. Already-canonical input is returned unchanged.
pub(crate) fn canonicalize(mut intervals: Vec<Interval>) -> Vec<Interval> {
    if is_canonical(&intervals) {
        return intervals;
    }
    intervals.retain(|seg| seg.lo <= seg.hi);
    intervals.sort_unstable_by_key(|seg| seg.lo);
    let mut out: Vec<Interval> = Vec::with_capacity(intervals.len());
    for seg in intervals {
        match out.last_mut() {
            Some(last) if u64::from(seg.lo) <= u64::from(last.hi) + 1 => {
                last.hi = last.hi.max(seg.hi);
            }
            _ => out.push(seg),
        }
    }
    out
}
