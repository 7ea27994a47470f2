//! Value selections: how a branch point splits the chosen variable's domain.
//!
//! Every built-in selection produces exactly two choices; choice `0` is the
//! preferred one. The random selection pins its value when the branch point
//! is created, so both choices of the same branch point agree on which value
//! they assign or exclude.

use std::cell::RefCell;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use crate::basic_types::Fail;
use crate::domain::Domain;
use crate::space::Space;
use crate::variables::VarName;

/// How the branch variable's domain is split into two choices.
#[derive(Clone)]
pub enum ValueSelection {
    /// Choice 0 assigns the minimum; choice 1 removes it.
    Min,
    /// Choice 0 assigns the maximum; choice 1 removes it.
    Max,
    /// Choice 0 assigns the median value; choice 1 removes it.
    Mid,
    /// Choice 0 keeps the lower half of the bounds, choice 1 the upper half.
    SplitMin,
    /// Choice 0 keeps the upper half of the bounds, choice 1 the lower half.
    SplitMax,
    /// Choice 0 assigns a randomly drawn value; choice 1 removes it.
    Random(Rc<RefCell<SmallRng>>),
    /// A caller-supplied choice function with its own choice count.
    Custom(CustomValue),
}

impl ValueSelection {
    /// A seeded random value selection. The same seed replays the same
    /// search tree.
    pub fn random(seed: u64) -> Self {
        ValueSelection::Random(Rc::new(RefCell::new(SmallRng::seed_from_u64(seed))))
    }

    /// A custom choice function over `(space, variable, choice_index)`.
    pub fn custom(
        num_choices: usize,
        commit: impl Fn(&mut Space, &VarName, usize) -> Result<(), Fail> + 'static,
    ) -> Self {
        ValueSelection::Custom(CustomValue {
            num_choices,
            commit: Rc::new(commit),
        })
    }

    /// Resolves the selection against the branch variable's current domain.
    pub(crate) fn select(&self, domain: &Domain) -> ChoiceSelection {
        match self {
            ValueSelection::Min => ChoiceSelection::Min,
            ValueSelection::Max => ChoiceSelection::Max,
            ValueSelection::Mid => ChoiceSelection::Mid,
            ValueSelection::SplitMin => ChoiceSelection::SplitMin,
            ValueSelection::SplitMax => ChoiceSelection::SplitMax,
            ValueSelection::Random(rng) => {
                let index = rng.borrow_mut().gen_range(0..domain.size());
                let value = domain
                    .nth_value(index)
                    .expect("drawn index is below the domain size");
                ChoiceSelection::Pin(value)
            }
            ValueSelection::Custom(custom) => ChoiceSelection::Custom(custom.clone()),
        }
    }
}

impl Debug for ValueSelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSelection::Min => write!(f, "Min"),
            ValueSelection::Max => write!(f, "Max"),
            ValueSelection::Mid => write!(f, "Mid"),
            ValueSelection::SplitMin => write!(f, "SplitMin"),
            ValueSelection::SplitMax => write!(f, "SplitMax"),
            ValueSelection::Random(_) => write!(f, "Random(..)"),
            ValueSelection::Custom(custom) => {
                write!(f, "Custom({} choices)", custom.num_choices)
            }
        }
    }
}

/// A caller-supplied choice function plus its choice count.
#[derive(Clone)]
pub struct CustomValue {
    pub(crate) num_choices: usize,
    pub(crate) commit: Rc<dyn Fn(&mut Space, &VarName, usize) -> Result<(), Fail>>,
}

impl Debug for CustomValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CustomValue({} choices)", self.num_choices)
    }
}

/// A selection resolved at branch time; what [`super::Choice::commit`]
/// interprets.
#[derive(Clone, Debug)]
pub(crate) enum ChoiceSelection {
    Min,
    Max,
    Mid,
    SplitMin,
    SplitMax,
    Pin(u32),
    Custom(CustomValue),
}

impl ChoiceSelection {
    pub(crate) fn num_choices(&self) -> usize {
        match self {
            ChoiceSelection::Custom(custom) => custom.num_choices,
            _ => 2,
        }
    }
}
