//! Constraint propagators and the context they narrow domains through.
//!
//! Every propagator follows the same protocol: its `step` begins with a
//! change-detection gate (comparing the revision sum of its dependency
//! variables against the value cached the last time it ran), narrows domains
//! through the [`PropagationContext`], and reports how many revision
//! increments it produced. The fixpoint loop in
//! [`crate::Space::propagate`] repeats whole passes until one produces zero
//! increments.

use std::fmt::Debug;

use crate::basic_types::Fail;
use crate::basic_types::HashMap;
use crate::basic_types::PropagationStatus;
use crate::domain::Domain;
use crate::ozkin_assert_simple;
use crate::variables::VarName;
use crate::variables::Variable;

pub(crate) mod comparison;
pub(crate) mod reified;
pub(crate) mod ring;
pub(crate) mod scale;

/// A constraint-specific narrowing operator over the variables of one space.
pub(crate) trait Propagator: Debug {
    /// A short name for logging.
    fn name(&self) -> &str;

    /// Every variable the propagator references; used to decide when it is
    /// permanently solved.
    fn all_vars(&self) -> &[VarName];

    /// The variables whose change retriggers the step.
    fn dep_vars(&self) -> &[VarName];

    /// True once the constraint is entailed and the propagator never needs
    /// to run again. The flag is monotonic.
    fn is_solved(&self) -> bool;

    /// Marks the propagator as permanently solved.
    fn mark_solved(&mut self);

    /// Runs the change-detection gate and, when something moved, narrows
    /// domains. Returns the revision increments produced.
    fn step(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus;

    /// A fresh instance for a cloned space: same constraint, cleared
    /// change-detection cache.
    fn rebuilt(&self) -> Box<dyn Propagator>;
}

/// Mutable access to a space's variable store for the duration of one step.
#[derive(Debug)]
pub(crate) struct PropagationContext<'a> {
    variables: &'a mut HashMap<VarName, Variable>,
}

impl<'a> PropagationContext<'a> {
    pub(crate) fn new(variables: &'a mut HashMap<VarName, Variable>) -> Self {
        PropagationContext { variables }
    }

    fn variable(&self, name: &VarName) -> &Variable {
        self.variables
            .get(name)
            .unwrap_or_else(|| panic!("propagator references unknown variable {name}"))
    }

    pub(crate) fn domain(&self, name: &VarName) -> &Domain {
        self.variable(name).domain()
    }

    /// The extreme bounds of a variable, failing on an empty domain.
    pub(crate) fn bounds(&self, name: &VarName) -> Result<(u32, u32), Fail> {
        self.domain(name).bounds().ok_or(Fail)
    }

    pub(crate) fn is_determined(&self, name: &VarName) -> bool {
        self.variable(name).is_determined()
    }

    /// The sum of the revision counters of `names`; the quantity cached by
    /// the change-detection gate.
    pub(crate) fn revision_sum(&self, names: &[VarName]) -> u64 {
        names.iter().map(|name| self.variable(name).revision()).sum()
    }

    /// Intersects a variable's domain with `bound`, failing when the result
    /// is empty. Returns the revision increments (zero or one).
    pub(crate) fn constrain(&mut self, name: &VarName, bound: &Domain) -> PropagationStatus {
        let variable = self
            .variables
            .get_mut(name)
            .unwrap_or_else(|| panic!("propagator references unknown variable {name}"));
        variable.constrain(bound)
    }

    /// Constrains a variable into `[lo, hi]`, failing when `lo > hi` or the
    /// intersection is empty.
    pub(crate) fn constrain_range(&mut self, name: &VarName, lo: u32, hi: u32) -> PropagationStatus {
        if lo > hi {
            return Err(Fail);
        }
        self.constrain(name, &Domain::interval(lo, hi))
    }

    /// Captures `(domain, revision)` for each of `names`, for speculative
    /// stepping.
    pub(crate) fn snapshot(&self, names: &[VarName]) -> Snapshot {
        Snapshot {
            saved: names
                .iter()
                .map(|name| {
                    let variable = self.variable(name);
                    (name.clone(), variable.domain().clone(), variable.revision())
                })
                .collect(),
        }
    }

    /// Rewinds every variable captured in `snapshot`, whatever happened in
    /// between.
    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        for (name, domain, revision) in snapshot.saved {
            let variable = self
                .variables
                .get_mut(&name)
                .unwrap_or_else(|| panic!("snapshot references unknown variable {name}"));
            variable.restore(domain, revision);
        }
    }
}

/// Saved `(name, domain, revision)` triples from before a speculative step.
#[derive(Debug)]
pub(crate) struct Snapshot {
    saved: Vec<(VarName, Domain, u64)>,
}

/// Validates a weighted-sum coefficient list against its variable list.
pub(crate) fn check_weights(weights: &[u32], variables: usize) {
    ozkin_assert_simple!(
        weights.len() == variables,
        "wsum requires one coefficient per variable ({} coefficients, {variables} variables)",
        weights.len()
    );
}
