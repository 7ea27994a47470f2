//! Variable orderings: which candidate a strategy branches on first.

use std::cmp::Reverse;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::rc::Rc;

use crate::space::Space;
use crate::variables::VarName;

/// Picks one variable from a non-empty candidate list.
#[derive(Clone)]
pub enum VariableOrdering {
    /// The first candidate, in the order the strategy was given.
    Naive,
    /// The candidate with the smallest domain (first-fail).
    Size,
    /// The candidate with the smallest minimum.
    Min,
    /// The candidate with the largest maximum.
    Max,
    /// A caller-supplied strict "a before b" predicate; the incumbent is
    /// replaced whenever a later candidate comes before it.
    Custom(Rc<dyn Fn(&Space, &VarName, &VarName) -> bool>),
}

impl VariableOrdering {
    /// A custom ordering from a plain "a before b" function.
    pub fn custom(before: impl Fn(&Space, &VarName, &VarName) -> bool + 'static) -> Self {
        VariableOrdering::Custom(Rc::new(before))
    }

    pub(crate) fn pick(&self, space: &Space, candidates: Vec<VarName>) -> VarName {
        let picked = match self {
            VariableOrdering::Naive => candidates.into_iter().next(),
            VariableOrdering::Size => candidates
                .into_iter()
                .min_by_key(|name| space.var_domain(name).size()),
            VariableOrdering::Min => candidates
                .into_iter()
                .min_by_key(|name| space.var_domain(name).min().unwrap_or(u32::MAX)),
            VariableOrdering::Max => candidates
                .into_iter()
                .min_by_key(|name| Reverse(space.var_domain(name).max().unwrap_or(0))),
            VariableOrdering::Custom(before) => candidates.into_iter().reduce(|incumbent, candidate| {
                if before(space, &candidate, &incumbent) {
                    candidate
                } else {
                    incumbent
                }
            }),
        };
        picked.expect("ordering picks from a non-empty candidate list")
    }
}

impl Debug for VariableOrdering {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableOrdering::Naive => write!(f, "Naive"),
            VariableOrdering::Size => write!(f, "Size"),
            VariableOrdering::Min => write!(f, "Min"),
            VariableOrdering::Max => write!(f, "Max"),
            VariableOrdering::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
