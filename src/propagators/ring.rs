//! Directed arithmetic propagators.
//!
//! `plus(x, y, s)` and `times(x, y, p)` are posted as three directed
//! propagators, one per direction of the ring equation: the output narrows
//! against the operation applied to its two inputs. For `s = x + y` the
//! directions are `s ∩ (x + y)`, `x ∩ (s - y)`, and `y ∩ (s - x)`; for
//! products the pair is `times`/`divby`.

use super::PropagationContext;
use super::Propagator;
use crate::basic_types::PropagationStatus;
use crate::domain::Domain;
use crate::variables::VarName;

/// The operation a directed propagator applies to its two inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RingOp {
    Plus,
    Minus,
    Times,
    DivBy,
}

impl RingOp {
    fn apply(self, a: &Domain, b: &Domain) -> Domain {
        match self {
            RingOp::Plus => a.plus(b),
            RingOp::Minus => a.minus(b),
            RingOp::Times => a.times(b),
            RingOp::DivBy => a.divby(b),
        }
    }

    fn label(self) -> &'static str {
        match self {
            RingOp::Plus => "ring-plus",
            RingOp::Minus => "ring-minus",
            RingOp::Times => "ring-times",
            RingOp::DivBy => "ring-divby",
        }
    }
}

/// Narrows `vars[0]` against `op(vars[1], vars[2])`.
#[derive(Debug)]
pub(crate) struct RingPropagator {
    op: RingOp,
    /// `[out, a, b]`; the inputs are the dependency set.
    vars: [VarName; 3],
    last_step: Option<u64>,
    solved: bool,
}

impl RingPropagator {
    pub(crate) fn new(op: RingOp, out: VarName, a: VarName, b: VarName) -> Self {
        RingPropagator {
            op,
            vars: [out, a, b],
            last_step: None,
            solved: false,
        }
    }
}

impl Propagator for RingPropagator {
    fn name(&self) -> &str {
        self.op.label()
    }

    fn all_vars(&self) -> &[VarName] {
        &self.vars
    }

    fn dep_vars(&self) -> &[VarName] {
        &self.vars[1..]
    }

    fn is_solved(&self) -> bool {
        self.solved
    }

    fn mark_solved(&mut self) {
        self.solved = true;
    }

    fn step(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        if self.solved {
            return Ok(0);
        }
        let stamp = context.revision_sum(self.dep_vars());
        if self.last_step == Some(stamp) {
            return Ok(0);
        }
        let [out, a, b] = self.vars.clone();
        let image = self.op.apply(context.domain(&a), context.domain(&b));
        let delta = context.constrain(&out, &image)?;
        self.last_step = Some(context.revision_sum(self.dep_vars()));
        Ok(delta)
    }

    fn rebuilt(&self) -> Box<dyn Propagator> {
        Box::new(RingPropagator::new(
            self.op,
            self.vars[0].clone(),
            self.vars[1].clone(),
            self.vars[2].clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Fail;
    use crate::basic_types::HashMap;
    use crate::variables::Variable;

    fn store(domains: &[(&str, (u32, u32))]) -> HashMap<VarName, Variable> {
        domains
            .iter()
            .map(|&(name, (lo, hi))| {
                (VarName::from(name), Variable::new(Domain::interval(lo, hi)))
            })
            .collect()
    }

    #[test]
    fn plus_direction_narrows_the_output() {
        let mut vars = store(&[("s", (0, 100)), ("x", (3, 3)), ("y", (0, 7))]);
        let mut ring = RingPropagator::new(RingOp::Plus, "s".into(), "x".into(), "y".into());
        let mut context = PropagationContext::new(&mut vars);
        assert_eq!(ring.step(&mut context), Ok(1));
        assert_eq!(context.domain(&"s".into()), &Domain::interval(3, 10));
        // Nothing moved, so the gate short-circuits the next step.
        assert_eq!(ring.step(&mut context), Ok(0));
    }

    #[test]
    fn minus_direction_fails_on_empty_image() {
        // x = s - y with s fixed below everything y allows.
        let mut vars = store(&[("x", (13, 13)), ("s", (10, 10)), ("y", (0, 100))]);
        let mut ring = RingPropagator::new(RingOp::Minus, "x".into(), "s".into(), "y".into());
        let mut context = PropagationContext::new(&mut vars);
        assert_eq!(ring.step(&mut context), Err(Fail));
    }

    #[test]
    fn times_direction_multiplies_bounds() {
        let mut vars = store(&[("p", (0, 1000)), ("x", (2, 3)), ("y", (4, 5))]);
        let mut ring = RingPropagator::new(RingOp::Times, "p".into(), "x".into(), "y".into());
        let mut context = PropagationContext::new(&mut vars);
        assert_eq!(ring.step(&mut context), Ok(1));
        assert_eq!(context.domain(&"p".into()), &Domain::interval(8, 15));
    }
}
