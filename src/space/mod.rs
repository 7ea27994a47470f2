//! The computation space: variables, propagators, and a brancher, with cheap
//! cloning semantics.
//!
//! A space is the unit of search. The root space is populated by the problem
//! script through the declaration and constraint-posting API below; search
//! then clones stable spaces and commits each clone to one branch of a
//! choice. Cloning copies every variable (domains are immutable values, so
//! the copy shares them), rebuilds every not-yet-solved propagator with a
//! fresh change-detection cache, and shares the branch-strategy queue with an
//! independent cursor.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use crate::basic_types::Fail;
use crate::basic_types::HashMap;
use crate::basic_types::Solution;
use crate::basic_types::SolutionValue;
use crate::branching::BranchStrategy;
use crate::branching::Brancher;
use crate::branching::Choice;
use crate::domain::Domain;
use crate::domain::SUP;
use crate::ozkin_assert_simple;
use crate::propagators::comparison::CmpOp;
use crate::propagators::comparison::ComparisonPropagator;
use crate::propagators::reified::ReifiedPropagator;
use crate::propagators::ring::RingOp;
use crate::propagators::ring::RingPropagator;
use crate::propagators::scale::ScaleDownPropagator;
use crate::propagators::scale::ScaleUpPropagator;
use crate::propagators::PropagationContext;
use crate::propagators::Propagator;
use crate::variables::VarName;
use crate::variables::Variable;

/// A self-contained state of variables, propagators, and branching choices
/// that can be cloned and committed independently.
#[derive(Debug)]
pub struct Space {
    variables: HashMap<VarName, Variable>,
    propagators: Vec<Box<dyn Propagator>>,
    brancher: Brancher,
    next_temp: u64,
    constants: HashMap<u32, VarName>,
    pub(crate) failed: bool,
    pub(crate) succeeded_children: u64,
    pub(crate) failed_children: u64,
    pub(crate) stable_children: u64,
}

impl Default for Space {
    fn default() -> Self {
        Space::new()
    }
}

/// Creating variables.
impl Space {
    /// An empty root space.
    pub fn new() -> Self {
        Space {
            variables: HashMap::default(),
            propagators: Vec::new(),
            brancher: Brancher::new(),
            next_temp: 0,
            constants: HashMap::default(),
            failed: false,
            succeeded_children: 0,
            failed_children: 0,
            stable_children: 0,
        }
    }

    /// Declares `name` with the given domain (default `[0, SUP]`). Declaring
    /// an existing variable with a domain narrows it instead; narrowing to
    /// nothing marks the space failed.
    pub fn decl(&mut self, name: impl Into<VarName>, dom: impl Into<Option<Domain>>) -> VarName {
        let name = name.into();
        let dom = dom.into();
        match self.variables.entry(name.clone()) {
            Entry::Occupied(mut existing) => {
                if let Some(dom) = dom {
                    if existing.get_mut().constrain(&dom).is_err() {
                        self.failed = true;
                    }
                }
            }
            Entry::Vacant(slot) => {
                let _ = slot.insert(Variable::new(dom.unwrap_or_else(Domain::full)));
            }
        }
        name
    }

    /// Declares every name in `names` with the same domain.
    pub fn decl_all(
        &mut self,
        names: impl IntoIterator<Item = impl Into<VarName>>,
        dom: impl Into<Option<Domain>>,
    ) -> Vec<VarName> {
        let dom = dom.into();
        names
            .into_iter()
            .map(|name| self.decl(name, dom.clone()))
            .collect()
    }

    /// Allocates a fresh temporary. Temporaries take part in propagation and
    /// search like any other variable but are omitted from solutions.
    pub fn temp(&mut self, dom: impl Into<Option<Domain>>) -> VarName {
        let name = VarName::Temp(self.next_temp);
        self.next_temp += 1;
        let domain = dom.into().unwrap_or_else(Domain::full);
        let _ = self.variables.insert(name.clone(), Variable::new(domain));
        name
    }

    /// Allocates `n` temporaries with the same domain.
    pub fn temps(&mut self, n: usize, dom: impl Into<Option<Domain>>) -> Vec<VarName> {
        let dom = dom.into();
        (0..n).map(|_| self.temp(dom.clone())).collect()
    }

    /// Declares `name` as the constant `value`.
    ///
    /// # Panics
    ///
    /// Panics when `value` exceeds `SUP`.
    pub fn num(&mut self, name: impl Into<VarName>, value: u32) -> VarName {
        ozkin_assert_simple!(value <= SUP, "constant {value} is outside [0, SUP]");
        self.decl(name, Domain::singleton(value))
    }

    /// A temporary fixed to `value`. Constants are cached, so asking for the
    /// same value twice yields the same variable.
    ///
    /// # Panics
    ///
    /// Panics when `value` exceeds `SUP`.
    pub fn konst(&mut self, value: u32) -> VarName {
        ozkin_assert_simple!(value <= SUP, "constant {value} is outside [0, SUP]");
        if let Some(name) = self.constants.get(&value) {
            return name.clone();
        }
        let name = self.temp(Domain::singleton(value));
        let _ = self.constants.insert(value, name.clone());
        name
    }

    /// Runs a problem script against this space.
    pub fn inject<R>(&mut self, script: impl FnOnce(&mut Space) -> R) -> R {
        script(self)
    }
}

/// Inspecting the space.
impl Space {
    /// True once a narrowing emptied some domain; a failed space is not part
    /// of any solution.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// True when every variable, temporaries included, is determined.
    pub fn is_solved(&self) -> bool {
        self.variables.values().all(Variable::is_determined)
    }

    /// The current domain of a variable.
    ///
    /// # Panics
    ///
    /// Panics when no such variable exists.
    pub fn var_domain(&self, name: &VarName) -> &Domain {
        self.variables
            .get(name)
            .unwrap_or_else(|| panic!("unknown variable {name}"))
            .domain()
    }

    /// The number of variables, temporaries included.
    pub fn var_count(&self) -> usize {
        self.variables.len()
    }

    /// The number of posted propagators still carried by this space.
    pub fn propagator_count(&self) -> usize {
        self.propagators.len()
    }

    /// The assignments of all user variables: the integer where determined,
    /// the remaining domain where not, and a failure marker throughout when
    /// the space failed.
    pub fn solution(&self) -> Solution {
        let mut assignments = HashMap::default();
        for (name, variable) in &self.variables {
            if let VarName::User(user) = name {
                let value = if self.failed {
                    SolutionValue::Failed
                } else if let Some(value) = variable.domain().value() {
                    SolutionValue::Assigned(value)
                } else {
                    SolutionValue::Unsolved(variable.domain().clone())
                };
                let _ = assignments.insert(Arc::clone(user), value);
            }
        }
        Solution::new(assignments)
    }

    pub(crate) fn all_propagators_solved(&self) -> bool {
        self.propagators.iter().all(|prop| prop.is_solved())
    }

    pub(crate) fn checked_name(&self, name: VarName) -> VarName {
        ozkin_assert_simple!(
            self.variables.contains_key(&name),
            "unknown variable {name}; declare it before constraining it"
        );
        name
    }

    pub(crate) fn constrain_var(&mut self, name: &VarName, bound: &Domain) -> Result<u64, Fail> {
        self.variables
            .get_mut(name)
            .unwrap_or_else(|| panic!("unknown variable {name}"))
            .constrain(bound)
    }
}

/// Propagation.
impl Space {
    /// Runs every propagator, in posting order, until a whole pass produces
    /// zero revision increments. A failing propagator marks the space failed
    /// and aborts the loop.
    pub fn propagate(&mut self) -> Result<(), Fail> {
        if self.failed {
            return Err(Fail);
        }
        match self.fixpoint() {
            Ok(()) => Ok(()),
            Err(fail) => {
                self.failed = true;
                Err(fail)
            }
        }
    }

    fn fixpoint(&mut self) -> Result<(), Fail> {
        let Space {
            variables,
            propagators,
            ..
        } = self;
        loop {
            let mut delta = 0;
            for propagator in propagators.iter_mut() {
                if propagator.is_solved() {
                    continue;
                }
                let mut context = PropagationContext::new(variables);
                let increments = propagator.step(&mut context)?;
                if increments > 0 {
                    log::trace!("{} produced {increments} revisions", propagator.name());
                }
                delta += increments;
                // A propagator over determined variables that did not fail is
                // entailed and never needs to run again.
                if propagator.all_vars().iter().all(|var| context.is_determined(var)) {
                    propagator.mark_solved();
                }
            }
            log::trace!("propagation pass produced {delta} revisions");
            if delta == 0 {
                return Ok(());
            }
        }
    }
}

/// Posting constraints.
///
/// Relational constraints return the space for chaining. Composite
/// constraints return the name of their result variable; passing `()` as the
/// output allocates a fresh temporary, which is what makes the functional
/// composition style work.
impl Space {
    fn operand(&self, name: impl Into<VarName>) -> VarName {
        self.checked_name(name.into())
    }

    fn post(&mut self, propagator: impl Propagator + 'static) {
        self.propagators.push(Box::new(propagator));
    }

    /// Posts `x op y` for any comparison operator.
    pub fn cmp(&mut self, op: CmpOp, x: impl Into<VarName>, y: impl Into<VarName>) -> &mut Self {
        let x = self.operand(x);
        let y = self.operand(y);
        self.post(ComparisonPropagator::new(op, x, y));
        self
    }

    /// Posts `x == y`.
    pub fn eq(&mut self, x: impl Into<VarName>, y: impl Into<VarName>) -> &mut Self {
        self.cmp(CmpOp::Eq, x, y)
    }

    /// Posts `x != y`.
    pub fn neq(&mut self, x: impl Into<VarName>, y: impl Into<VarName>) -> &mut Self {
        self.cmp(CmpOp::Neq, x, y)
    }

    /// Posts `x < y`.
    pub fn lt(&mut self, x: impl Into<VarName>, y: impl Into<VarName>) -> &mut Self {
        self.cmp(CmpOp::Lt, x, y)
    }

    /// Posts `x <= y`.
    pub fn lte(&mut self, x: impl Into<VarName>, y: impl Into<VarName>) -> &mut Self {
        self.cmp(CmpOp::Lte, x, y)
    }

    /// Posts `x > y`.
    pub fn gt(&mut self, x: impl Into<VarName>, y: impl Into<VarName>) -> &mut Self {
        self.cmp(CmpOp::Gt, x, y)
    }

    /// Posts `x >= y`.
    pub fn gte(&mut self, x: impl Into<VarName>, y: impl Into<VarName>) -> &mut Self {
        self.cmp(CmpOp::Gte, x, y)
    }

    /// Posts pairwise disequality over all the given variables.
    pub fn distinct(&mut self, vars: impl IntoIterator<Item = impl Into<VarName>>) -> &mut Self {
        let vars: Vec<VarName> = vars.into_iter().map(|var| self.operand(var)).collect();
        for i in 0..vars.len() {
            for j in (i + 1)..vars.len() {
                let _ = self.neq(vars[i].clone(), vars[j].clone());
            }
        }
        self
    }

    /// Posts `out = x + y` and returns the output's name.
    pub fn plus(
        &mut self,
        x: impl Into<VarName>,
        y: impl Into<VarName>,
        out: impl OutVar,
    ) -> VarName {
        let x = self.operand(x);
        let y = self.operand(y);
        let out = out.resolve(self);
        self.post_ring(RingOp::Plus, RingOp::Minus, x, y, out.clone());
        out
    }

    /// Posts `out = x * y` and returns the output's name.
    pub fn times(
        &mut self,
        x: impl Into<VarName>,
        y: impl Into<VarName>,
        out: impl OutVar,
    ) -> VarName {
        let x = self.operand(x);
        let y = self.operand(y);
        let out = out.resolve(self);
        self.post_ring(RingOp::Times, RingOp::DivBy, x, y, out.clone());
        out
    }

    /// One propagator per direction of `out = x (forward) y`.
    fn post_ring(&mut self, forward: RingOp, backward: RingOp, x: VarName, y: VarName, out: VarName) {
        self.post(RingPropagator::new(
            forward,
            out.clone(),
            x.clone(),
            y.clone(),
        ));
        self.post(RingPropagator::new(
            backward,
            x.clone(),
            out.clone(),
            y.clone(),
        ));
        self.post(RingPropagator::new(backward, y, out, x));
    }

    /// Posts `out = k * v` and returns the output's name. A factor of zero
    /// fixes the output to zero; a factor of one equates the two variables.
    pub fn scale(&mut self, k: u32, v: impl Into<VarName>, out: impl OutVar) -> VarName {
        let v = self.operand(v);
        let out = out.resolve(self);
        match k {
            0 => {
                let zero = self.temp(Domain::singleton(0));
                self.post(ComparisonPropagator::new(CmpOp::Eq, zero, out.clone()));
            }
            1 => {
                self.post(ComparisonPropagator::new(CmpOp::Eq, v, out.clone()));
            }
            _ => {
                self.post(ScaleUpPropagator::new(k, out.clone(), v.clone()));
                self.post(ScaleDownPropagator::new(k, v, out.clone()));
            }
        }
        out
    }

    /// Posts `out = Σ vars` by balanced binary decomposition and returns the
    /// output's name.
    ///
    /// # Panics
    ///
    /// Panics on an empty variable list.
    pub fn sum(
        &mut self,
        vars: impl IntoIterator<Item = impl Into<VarName>>,
        out: impl OutVar,
    ) -> VarName {
        let vars: Vec<VarName> = vars.into_iter().map(|var| self.operand(var)).collect();
        ozkin_assert_simple!(!vars.is_empty(), "sum requires at least one variable");
        let out = out.resolve(self);
        self.fold_balanced(&vars, out.clone(), RingOp::Plus, RingOp::Minus);
        out
    }

    /// Posts `out = Π vars` by balanced binary decomposition and returns the
    /// output's name.
    ///
    /// # Panics
    ///
    /// Panics on an empty variable list.
    pub fn product(
        &mut self,
        vars: impl IntoIterator<Item = impl Into<VarName>>,
        out: impl OutVar,
    ) -> VarName {
        let vars: Vec<VarName> = vars.into_iter().map(|var| self.operand(var)).collect();
        ozkin_assert_simple!(!vars.is_empty(), "product requires at least one variable");
        let out = out.resolve(self);
        self.fold_balanced(&vars, out.clone(), RingOp::Times, RingOp::DivBy);
        out
    }

    fn fold_balanced(&mut self, vars: &[VarName], out: VarName, forward: RingOp, backward: RingOp) {
        match vars {
            [] => unreachable!("callers reject empty variable lists"),
            [only] => {
                self.post(ComparisonPropagator::new(CmpOp::Eq, only.clone(), out));
            }
            [a, b] => {
                self.post_ring(forward, backward, a.clone(), b.clone(), out);
            }
            _ => {
                let mid = vars.len() / 2;
                let left = self.temp(None);
                let right = self.temp(None);
                self.fold_balanced(&vars[..mid], left.clone(), forward, backward);
                self.fold_balanced(&vars[mid..], right.clone(), forward, backward);
                self.post_ring(forward, backward, left, right, out);
            }
        }
    }

    /// Posts `out = Σ ks[i] * vars[i]` and returns the output's name.
    ///
    /// # Panics
    ///
    /// Panics when the coefficient and variable counts differ or both are
    /// empty.
    pub fn wsum(
        &mut self,
        ks: &[u32],
        vars: impl IntoIterator<Item = impl Into<VarName>>,
        out: impl OutVar,
    ) -> VarName {
        let vars: Vec<VarName> = vars.into_iter().map(|var| self.operand(var)).collect();
        crate::propagators::check_weights(ks, vars.len());
        ozkin_assert_simple!(!vars.is_empty(), "wsum requires at least one variable");
        let terms: Vec<VarName> = ks
            .iter()
            .zip(vars)
            .map(|(&k, var)| self.scale(k, var, ()))
            .collect();
        self.sum(terms, out)
    }

    /// Posts `out = k1 * v1 + k2 * v2` and returns the output's name.
    pub fn times_plus(
        &mut self,
        k1: u32,
        v1: impl Into<VarName>,
        k2: u32,
        v2: impl Into<VarName>,
        out: impl OutVar,
    ) -> VarName {
        let t1 = self.scale(k1, v1, ());
        let t2 = self.scale(k2, v2, ());
        self.plus(t1, t2, out)
    }

    /// Posts `b ⇔ (x op y)` for a 0/1 variable `b` and returns `b`'s name.
    pub fn reified(
        &mut self,
        op: CmpOp,
        x: impl Into<VarName>,
        y: impl Into<VarName>,
        b: impl OutVar,
    ) -> VarName {
        let x = self.operand(x);
        let y = self.operand(y);
        let b = b.resolve(self);
        if self.constrain_var(&b, &Domain::interval(0, 1)).is_err() {
            self.failed = true;
        }
        self.post(ReifiedPropagator::new(op, x, y, b.clone()));
        b
    }
}

/// Branching.
impl Space {
    pub(crate) fn push_strategy(&mut self, strategy: BranchStrategy) {
        self.brancher.push(strategy);
    }

    /// The next branch point, walking the shared strategy queue from this
    /// space's cursor. `None` means no strategy can split this space.
    pub(crate) fn next_branch(&mut self) -> Option<Choice> {
        loop {
            let strategy = self.brancher.current_strategy()?;
            if let Some(choice) = strategy.branch(self) {
                return Some(choice);
            }
            self.brancher.advance();
        }
    }
}

impl Clone for Space {
    /// An independent copy for search: fresh variables over the same
    /// domains, every unsolved propagator rebuilt with a clear
    /// change-detection cache, and the brancher queue shared with an
    /// independent cursor.
    fn clone(&self) -> Self {
        let variables = self
            .variables
            .iter()
            .map(|(name, variable)| (name.clone(), Variable::new(variable.domain().clone())))
            .collect();
        let propagators = self
            .propagators
            .iter()
            .filter(|prop| !prop.is_solved())
            .map(|prop| prop.rebuilt())
            .collect();
        Space {
            variables,
            propagators,
            brancher: self.brancher.child(),
            next_temp: self.next_temp,
            constants: self.constants.clone(),
            failed: self.failed,
            succeeded_children: 0,
            failed_children: 0,
            stable_children: 0,
        }
    }
}

/// An output-variable argument: an explicit name, or `()` to allocate a
/// fresh temporary. Explicit names that are not yet declared are declared
/// with the full domain.
pub trait OutVar {
    fn resolve(self, space: &mut Space) -> VarName;
}

impl OutVar for () {
    fn resolve(self, space: &mut Space) -> VarName {
        space.temp(None)
    }
}

impl OutVar for VarName {
    fn resolve(self, space: &mut Space) -> VarName {
        space.declare_if_absent(self)
    }
}

impl OutVar for &VarName {
    fn resolve(self, space: &mut Space) -> VarName {
        space.declare_if_absent(self.clone())
    }
}

impl OutVar for &str {
    fn resolve(self, space: &mut Space) -> VarName {
        space.declare_if_absent(VarName::from(self))
    }
}

impl OutVar for String {
    fn resolve(self, space: &mut Space) -> VarName {
        space.declare_if_absent(VarName::from(self))
    }
}

impl Space {
    fn declare_if_absent(&mut self, name: VarName) -> VarName {
        if !self.variables.contains_key(&name) {
            let _ = self
                .variables
                .insert(name.clone(), Variable::new(Domain::full()));
        }
        name
    }
}
