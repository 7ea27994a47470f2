//! Shared primitive types: the failure condition, propagation status, and
//! solution containers.

use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Index;
use std::sync::Arc;

use crate::domain::Domain;

/// The hash map used throughout the crate.
pub(crate) type HashMap<K, V> = fnv::FnvHashMap<K, V>;

/// The single infeasibility condition.
///
/// `Fail` is raised whenever a narrowing operation would empty a domain. It
/// is threaded through propagators with `?`, converted into a failed-space
/// marker by [`crate::Space::propagate`], and caught at the space boundary by
/// the search drivers. It never carries a payload; a failed space is simply
/// not part of any solution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("constraint narrowing produced an empty domain")]
pub struct Fail;

/// The result of one propagator step.
///
/// `Ok(n)` reports the number of revision-counter increments the step
/// produced; a full fixpoint pass that sums to zero means the space is
/// stable.
pub(crate) type PropagationStatus = Result<u64, Fail>;

/// The value a solution assigns to one user variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolutionValue {
    /// The variable was determined to this integer.
    Assigned(u32),
    /// The space was not solved for this variable; the remaining domain is
    /// reported as-is.
    Unsolved(Domain),
    /// The space failed; no assignment exists.
    Failed,
}

impl SolutionValue {
    /// The assigned integer, if the variable was determined.
    pub fn int(&self) -> Option<u32> {
        match self {
            SolutionValue::Assigned(value) => Some(*value),
            SolutionValue::Unsolved(_) | SolutionValue::Failed => None,
        }
    }
}

impl Display for SolutionValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionValue::Assigned(value) => write!(f, "{value}"),
            SolutionValue::Unsolved(domain) => write!(f, "{domain}"),
            SolutionValue::Failed => write!(f, "failed"),
        }
    }
}

/// A mapping from user-supplied variable names to their solution values.
///
/// Engine-generated temporaries are omitted; they exist only to wire
/// decomposed constraints together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Solution {
    assignments: HashMap<Arc<str>, SolutionValue>,
}

impl Solution {
    pub(crate) fn new(assignments: HashMap<Arc<str>, SolutionValue>) -> Self {
        Solution { assignments }
    }

    /// The value recorded for `name`, or `None` if no such user variable
    /// exists.
    pub fn value(&self, name: &str) -> Option<&SolutionValue> {
        self.assignments.get(name)
    }

    /// The integer assigned to `name`, if that variable was determined.
    pub fn int(&self, name: &str) -> Option<u32> {
        self.value(name).and_then(SolutionValue::int)
    }

    /// True when every user variable was determined.
    pub fn is_total(&self) -> bool {
        self.assignments
            .values()
            .all(|value| matches!(value, SolutionValue::Assigned(_)))
    }

    /// The number of user variables in the solution.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// True when the solution contains no user variables at all.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Iterates over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SolutionValue)> {
        self.assignments
            .iter()
            .map(|(name, value)| (name.as_ref(), value))
    }
}

impl Index<&str> for Solution {
    type Output = SolutionValue;

    fn index(&self, name: &str) -> &SolutionValue {
        self.value(name)
            .unwrap_or_else(|| panic!("no user variable named {name:?} in the solution"))
    }
}
