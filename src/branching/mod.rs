//! Branch strategies: how a stable-but-unsolved space is split into a finite
//! sequence of child spaces.
//!
//! A [`BranchStrategy`] combines a filter over candidate variables, a
//! variable ordering, and a value selection. Strategies live in a queue that
//! is shared by reference among a space and all of its descendants; each
//! space keeps its own cursor into the queue so a child can skip strategies
//! whose variables it has already determined. The [`distribute`] module
//! offers the preset combinations.

use std::cell::RefCell;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::rc::Rc;

use crate::basic_types::Fail;
use crate::domain::Domain;
use crate::ozkin_assert_simple;
use crate::space::Space;
use crate::variables::VarName;

pub mod value_selection;
pub mod variable_selection;

pub use value_selection::CustomValue;
pub use value_selection::ValueSelection;
pub use variable_selection::VariableOrdering;

use value_selection::ChoiceSelection;

/// Picks the candidate variables a strategy may branch on.
#[derive(Clone)]
pub enum Filter {
    /// Variables whose domain still holds more than one value. The default.
    Undetermined,
    /// A caller-supplied filter over the strategy's variable list.
    Custom(Rc<dyn Fn(&Space, &[VarName]) -> Vec<VarName>>),
}

impl Filter {
    /// A custom filter from a plain function.
    pub fn custom(filter: impl Fn(&Space, &[VarName]) -> Vec<VarName> + 'static) -> Self {
        Filter::Custom(Rc::new(filter))
    }

    pub(crate) fn apply(&self, space: &Space, names: &[VarName]) -> Vec<VarName> {
        match self {
            Filter::Undetermined => names
                .iter()
                .filter(|name| space.var_domain(name).value().is_none())
                .cloned()
                .collect(),
            Filter::Custom(filter) => filter(space, names),
        }
    }
}

impl Debug for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::Undetermined => write!(f, "Undetermined"),
            Filter::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// One queued branch strategy: filter, ordering, and value selection over a
/// fixed list of variables.
#[derive(Clone, Debug)]
pub struct BranchStrategy {
    names: Rc<[VarName]>,
    filter: Filter,
    ordering: VariableOrdering,
    value: ValueSelection,
}

impl BranchStrategy {
    pub fn new(
        names: impl IntoIterator<Item = VarName>,
        filter: Filter,
        ordering: VariableOrdering,
        value: ValueSelection,
    ) -> Self {
        BranchStrategy {
            names: names.into_iter().collect(),
            filter,
            ordering,
            value,
        }
    }

    /// The next branch point for `space`, or `None` when every candidate is
    /// already determined and the brancher should fall through to the next
    /// queued strategy.
    pub(crate) fn branch(&self, space: &Space) -> Option<Choice> {
        let candidates = self.filter.apply(space, &self.names);
        if candidates.is_empty() {
            return None;
        }
        let var = self.ordering.pick(space, candidates);
        let selection = self.value.select(space.var_domain(&var));
        Some(Choice { var, selection })
    }
}

/// A branch point: a variable plus the rule that turns a choice index into a
/// domain restriction.
#[derive(Clone, Debug)]
pub struct Choice {
    var: VarName,
    selection: ChoiceSelection,
}

impl Choice {
    /// The variable being branched on.
    pub fn var(&self) -> &VarName {
        &self.var
    }

    /// How many child spaces this choice produces.
    pub fn num_choices(&self) -> usize {
        self.selection.num_choices()
    }

    /// Applies choice `index` to `space` by constraining the branch
    /// variable. Failing is normal here: the search driver treats a failed
    /// commit as a failed child.
    ///
    /// # Panics
    ///
    /// Panics when `index` is not below [`Choice::num_choices`].
    pub fn commit(&self, space: &mut Space, index: usize) -> Result<(), Fail> {
        ozkin_assert_simple!(
            index < self.num_choices(),
            "choice index {index} out of range for a {}-way branch",
            self.num_choices()
        );
        let domain = space.var_domain(&self.var).clone();
        let (lo, hi) = domain.bounds().ok_or(Fail)?;
        let mid = lo + (hi - lo) / 2;
        // An empty half or a removed last value is a failed child, not a
        // usage error.
        let range = |from: u32, to: u32| {
            if from > to {
                Err(Fail)
            } else {
                Ok(Domain::interval(from, to))
            }
        };
        let bound = match (&self.selection, index) {
            (ChoiceSelection::Min, 0) => Domain::singleton(lo),
            (ChoiceSelection::Min, _) => range(lo + 1, hi)?,
            (ChoiceSelection::Max, 0) => Domain::singleton(hi),
            (ChoiceSelection::Max, _) => range(lo, hi.checked_sub(1).ok_or(Fail)?)?,
            (ChoiceSelection::Mid, index) => {
                let value = domain.mid().ok_or(Fail)?;
                if index == 0 {
                    Domain::singleton(value)
                } else {
                    Domain::singleton(value).complement()
                }
            }
            (ChoiceSelection::SplitMin, 0) | (ChoiceSelection::SplitMax, 1) => range(lo, mid)?,
            (ChoiceSelection::SplitMin, _) | (ChoiceSelection::SplitMax, _) => {
                range(mid + 1, hi)?
            }
            (ChoiceSelection::Pin(value), 0) => Domain::singleton(*value),
            (ChoiceSelection::Pin(value), _) => Domain::singleton(*value).complement(),
            (ChoiceSelection::Custom(custom), index) => {
                return (custom.commit)(space, &self.var, index);
            }
        };
        space.constrain_var(&self.var, &bound).map(|_| ())
    }
}

/// The brancher of one space: the shared strategy queue plus this space's
/// cursor into it.
#[derive(Debug)]
pub(crate) struct Brancher {
    queue: Rc<RefCell<Vec<BranchStrategy>>>,
    cursor: usize,
}

impl Brancher {
    pub(crate) fn new() -> Self {
        Brancher {
            queue: Rc::new(RefCell::new(Vec::new())),
            cursor: 0,
        }
    }

    /// A brancher for a cloned space: same queue, independent cursor
    /// starting at the parent's position.
    pub(crate) fn child(&self) -> Self {
        Brancher {
            queue: Rc::clone(&self.queue),
            cursor: self.cursor,
        }
    }

    pub(crate) fn push(&self, strategy: BranchStrategy) {
        self.queue.borrow_mut().push(strategy);
    }

    pub(crate) fn current_strategy(&self) -> Option<BranchStrategy> {
        self.queue.borrow().get(self.cursor).cloned()
    }

    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }
}

/// Preset distribution strategies.
pub mod distribute {
    use super::BranchStrategy;
    use super::Filter;
    use super::Space;
    use super::ValueSelection;
    use super::VarName;
    use super::VariableOrdering;

    /// First undetermined variable in the given order, smallest value first.
    pub fn naive(space: &mut Space, names: impl IntoIterator<Item = impl Into<VarName>>) {
        generic(
            space,
            names,
            Filter::Undetermined,
            VariableOrdering::Naive,
            ValueSelection::Min,
        );
    }

    /// Smallest domain first (first-fail), smallest value first.
    pub fn fail_first(space: &mut Space, names: impl IntoIterator<Item = impl Into<VarName>>) {
        generic(
            space,
            names,
            Filter::Undetermined,
            VariableOrdering::Size,
            ValueSelection::Min,
        );
    }

    /// Smallest domain first, branching on the lower half of the domain.
    pub fn split(space: &mut Space, names: impl IntoIterator<Item = impl Into<VarName>>) {
        generic(
            space,
            names,
            Filter::Undetermined,
            VariableOrdering::Size,
            ValueSelection::SplitMin,
        );
    }

    /// Queues a strategy from explicit filter, ordering, and value parts.
    ///
    /// # Panics
    ///
    /// Panics when a name does not refer to a declared variable.
    pub fn generic(
        space: &mut Space,
        names: impl IntoIterator<Item = impl Into<VarName>>,
        filter: Filter,
        ordering: VariableOrdering,
        value: ValueSelection,
    ) {
        let names: Vec<VarName> = names
            .into_iter()
            .map(|name| space.checked_name(name.into()))
            .collect();
        space.push_strategy(BranchStrategy::new(names, filter, ordering, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_first_prefers_the_smallest_domain() {
        let mut space = Space::new();
        let _ = space.decl("wide", Domain::interval(0, 9));
        let narrow = space.decl("narrow", Domain::interval(0, 1));
        distribute::fail_first(&mut space, ["wide", "narrow"]);
        let choice = space.next_branch().expect("two undetermined variables");
        assert_eq!(choice.var(), &narrow);
        assert_eq!(choice.num_choices(), 2);
    }

    #[test]
    fn min_selection_assigns_then_excludes() {
        let mut space = Space::new();
        let v = space.decl("v", Domain::interval(3, 7));
        distribute::naive(&mut space, ["v"]);
        let choice = space.next_branch().expect("v is undetermined");

        let mut first = space.clone();
        choice.commit(&mut first, 0).expect("assigning the minimum");
        assert_eq!(first.var_domain(&v).value(), Some(3));

        let mut second = space.clone();
        choice.commit(&mut second, 1).expect("removing the minimum");
        assert_eq!(second.var_domain(&v), &Domain::interval(4, 7));
    }

    #[test]
    fn split_selection_halves_the_bounds() {
        let mut space = Space::new();
        let v = space.decl("v", Domain::interval(0, 9));
        distribute::split(&mut space, ["v"]);
        let choice = space.next_branch().expect("v is undetermined");

        let mut lower = space.clone();
        choice.commit(&mut lower, 0).expect("lower half");
        assert_eq!(lower.var_domain(&v), &Domain::interval(0, 4));

        let mut upper = space.clone();
        choice.commit(&mut upper, 1).expect("upper half");
        assert_eq!(upper.var_domain(&v), &Domain::interval(5, 9));
    }

    #[test]
    fn exhausted_strategies_fall_through_the_queue() {
        let mut space = Space::new();
        let _ = space.num("done", 4);
        let open = space.decl("open", Domain::interval(0, 5));
        distribute::naive(&mut space, ["done"]);
        distribute::naive(&mut space, ["open"]);
        let choice = space.next_branch().expect("the second strategy applies");
        assert_eq!(choice.var(), &open);
        // Once everything is determined there is nothing left to branch on.
        let mut solved = space.clone();
        choice.commit(&mut solved, 0).expect("assigning the minimum");
        let _ = solved.decl("open", Domain::singleton(0));
        assert!(solved.next_branch().is_none());
    }

    #[test]
    fn random_selection_pins_one_value_for_both_choices() {
        let mut space = Space::new();
        let v = space.decl("v", Domain::from_intervals([(2, 4), (8, 9)]));
        distribute::generic(
            &mut space,
            ["v"],
            Filter::Undetermined,
            VariableOrdering::Naive,
            ValueSelection::random(7),
        );
        let choice = space.next_branch().expect("v is undetermined");

        let mut assigned = space.clone();
        choice.commit(&mut assigned, 0).expect("assigning the draw");
        let value = assigned.var_domain(&v).value().expect("pinned to one value");
        assert!(space.var_domain(&v).contains(value));

        let mut excluded = space.clone();
        choice.commit(&mut excluded, 1).expect("excluding the draw");
        assert!(!excluded.var_domain(&v).contains(value));
        assert_eq!(excluded.var_domain(&v).size(), 4);
    }
}
