//! Reified comparisons: `b ⇔ (x op y)` for a 0/1 variable `b`.
//!
//! The reified propagator owns a positive sub-propagator for `op` and a
//! negative one for its complement. When `b` is determined the matching side
//! propagates normally (and may fail the space). While `b` is undetermined,
//! each side is stepped *speculatively* against a snapshot of the operand
//! domains: a side that fails outright forces `b` to the opposite value, and
//! the snapshot is restored either way so speculation never leaks into the
//! space.

use super::comparison::CmpOp;
use super::comparison::ComparisonPropagator;
use super::PropagationContext;
use super::Propagator;
use crate::basic_types::PropagationStatus;
use crate::domain::Domain;
use crate::variables::VarName;

#[derive(Debug)]
pub(crate) struct ReifiedPropagator {
    op: CmpOp,
    /// `[x, y, b]`.
    vars: [VarName; 3],
    /// Lazily created per space so their change-detection caches are private
    /// to this space; clones start over with `None`.
    positive: Option<ComparisonPropagator>,
    negative: Option<ComparisonPropagator>,
    last_step: Option<u64>,
    solved: bool,
}

impl ReifiedPropagator {
    pub(crate) fn new(op: CmpOp, x: VarName, y: VarName, boolean: VarName) -> Self {
        ReifiedPropagator {
            op,
            vars: [x, y, boolean],
            positive: None,
            negative: None,
            last_step: None,
            solved: false,
        }
    }

    /// Steps one side speculatively and reports whether it failed. The
    /// operand domains and revisions are restored on both exits; the probe
    /// instance is discarded so no gate or entailment state survives.
    fn speculate(&self, op: CmpOp, context: &mut PropagationContext<'_>) -> bool {
        let snapshot = context.snapshot(&self.vars[..2]);
        let mut probe = ComparisonPropagator::new(op, self.vars[0].clone(), self.vars[1].clone());
        let failed = probe.step(context).is_err();
        context.restore(snapshot);
        failed
    }
}

impl Propagator for ReifiedPropagator {
    fn name(&self) -> &str {
        "reified"
    }

    fn all_vars(&self) -> &[VarName] {
        &self.vars
    }

    fn dep_vars(&self) -> &[VarName] {
        &self.vars
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
        let stamp = context.revision_sum(&self.vars);
        if self.last_step == Some(stamp) {
            return Ok(0);
        }
        let op = self.op;
        let [x, y, boolean] = self.vars.clone();
        let mut delta = 0;
        loop {
            let before = context.revision_sum(&self.vars);
            match context.domain(&boolean).value() {
                Some(1) => {
                    let positive = self
                        .positive
                        .get_or_insert_with(|| ComparisonPropagator::new(op, x.clone(), y.clone()));
                    delta += positive.step(context)?;
                }
                Some(_) => {
                    let negative = self.negative.get_or_insert_with(|| {
                        ComparisonPropagator::new(op.complement(), x.clone(), y.clone())
                    });
                    delta += negative.step(context)?;
                }
                None => {
                    if self.speculate(op, context) {
                        delta += context.constrain(&boolean, &Domain::singleton(0))?;
                    }
                    if context.domain(&boolean).value().is_none()
                        && self.speculate(op.complement(), context)
                    {
                        delta += context.constrain(&boolean, &Domain::singleton(1))?;
                    }
                }
            }
            if context.revision_sum(&self.vars) == before {
                break;
            }
        }
        self.last_step = Some(context.revision_sum(&self.vars));
        Ok(delta)
    }

    fn rebuilt(&self) -> Box<dyn Propagator> {
        Box::new(ReifiedPropagator::new(
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

    fn reified_lt() -> ReifiedPropagator {
        ReifiedPropagator::new(CmpOp::Lt, "x".into(), "y".into(), "b".into())
    }

    #[test]
    fn true_boolean_propagates_the_positive_side() {
        let mut vars = store(&[("x", (4, 9)), ("y", (0, 7)), ("b", (1, 1))]);
        let mut reified = reified_lt();
        let mut context = PropagationContext::new(&mut vars);
        let delta = reified.step(&mut context).expect("satisfiable");
        assert!(delta > 0);
        assert_eq!(context.domain(&"x".into()), &Domain::interval(4, 6));
        assert_eq!(context.domain(&"y".into()), &Domain::interval(5, 7));
    }

    #[test]
    fn false_boolean_propagates_the_complement() {
        let mut vars = store(&[("x", (1, 10)), ("y", (5, 6)), ("b", (0, 0))]);
        let mut reified = reified_lt();
        let mut context = PropagationContext::new(&mut vars);
        let _ = reified.step(&mut context).expect("satisfiable");
        // not (x < y) is x >= y, so x rises to at least min(y).
        assert_eq!(context.domain(&"x".into()), &Domain::interval(5, 10));
    }

    #[test]
    fn entailed_comparison_forces_the_boolean_true() {
        let mut vars = store(&[("x", (0, 3)), ("y", (5, 6)), ("b", (0, 1))]);
        let mut reified = reified_lt();
        let mut context = PropagationContext::new(&mut vars);
        let _ = reified.step(&mut context).expect("satisfiable");
        assert_eq!(context.domain(&"b".into()).value(), Some(1));
        // Speculation must not leak narrowing into the operands.
        assert_eq!(context.domain(&"x".into()), &Domain::interval(0, 3));
        assert_eq!(context.domain(&"y".into()), &Domain::interval(5, 6));
    }

    #[test]
    fn refuted_comparison_forces_the_boolean_false() {
        let mut vars = store(&[("x", (7, 9)), ("y", (2, 4)), ("b", (0, 1))]);
        let mut reified = reified_lt();
        let mut context = PropagationContext::new(&mut vars);
        let _ = reified.step(&mut context).expect("satisfiable");
        assert_eq!(context.domain(&"b".into()).value(), Some(0));
    }

    #[test]
    fn contradictory_boolean_fails_the_space() {
        // x < y is entailed but b says it must not hold.
        let mut vars = store(&[("x", (0, 3)), ("y", (5, 6)), ("b", (0, 0))]);
        let mut reified = reified_lt();
        let mut context = PropagationContext::new(&mut vars);
        assert_eq!(reified.step(&mut context), Err(Fail));
    }

    #[test]
    fn undecidable_comparison_leaves_the_boolean_open() {
        let mut vars = store(&[("x", (0, 9)), ("y", (0, 9)), ("b", (0, 1))]);
        let mut reified = reified_lt();
        let mut context = PropagationContext::new(&mut vars);
        assert_eq!(reified.step(&mut context), Ok(0));
        assert_eq!(context.domain(&"b".into()).value(), None);
    }
}
