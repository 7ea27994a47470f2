//! Propagators for the six binary comparisons.

use super::PropagationContext;
use super::Propagator;
use crate::basic_types::Fail;
use crate::basic_types::PropagationStatus;
use crate::domain::Domain;
use crate::variables::VarName;

/// A binary comparison operator, usable directly or reified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    /// `x == y`
    Eq,
    /// `x != y`
    Neq,
    /// `x < y`
    Lt,
    /// `x <= y`
    Lte,
    /// `x > y`
    Gt,
    /// `x >= y`
    Gte,
}

impl CmpOp {
    /// The negation of the comparison, used for the refuting side of a
    /// reified constraint.
    pub fn complement(self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::Neq,
            CmpOp::Neq => CmpOp::Eq,
            CmpOp::Lt => CmpOp::Gte,
            CmpOp::Gte => CmpOp::Lt,
            CmpOp::Gt => CmpOp::Lte,
            CmpOp::Lte => CmpOp::Gt,
        }
    }

    /// Whether `a op b` holds for concrete values.
    pub fn holds(self, a: u32, b: u32) -> bool {
        match self {
            CmpOp::Eq => a == b,
            CmpOp::Neq => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Lte => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Gte => a >= b,
        }
    }

    fn label(self) -> &'static str {
        match self {
            CmpOp::Eq => "eq",
            CmpOp::Neq => "neq",
            CmpOp::Lt => "lt",
            CmpOp::Lte => "lte",
            CmpOp::Gt => "gt",
            CmpOp::Gte => "gte",
        }
    }
}

/// Propagates `x op y` by bounds (orderings) or domain intersection
/// (equality, disequality).
#[derive(Debug)]
pub(crate) struct ComparisonPropagator {
    op: CmpOp,
    vars: [VarName; 2],
    last_step: Option<u64>,
    solved: bool,
}

impl ComparisonPropagator {
    pub(crate) fn new(op: CmpOp, x: VarName, y: VarName) -> Self {
        ComparisonPropagator {
            op,
            vars: [x, y],
            last_step: None,
            solved: false,
        }
    }
}

impl Propagator for ComparisonPropagator {
    fn name(&self) -> &str {
        self.op.label()
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
        let [x, y] = self.vars.clone();
        let (delta, entailed) = match self.op {
            CmpOp::Eq => equalise(context, &x, &y)?,
            CmpOp::Neq => separate(context, &x, &y)?,
            CmpOp::Lt => order(context, &x, &y, true)?,
            CmpOp::Lte => order(context, &x, &y, false)?,
            CmpOp::Gt => order(context, &y, &x, true)?,
            CmpOp::Gte => order(context, &y, &x, false)?,
        };
        if entailed {
            self.solved = true;
        }
        self.last_step = Some(context.revision_sum(&self.vars));
        Ok(delta)
    }

    fn rebuilt(&self) -> Box<dyn Propagator> {
        Box::new(ComparisonPropagator::new(
            self.op,
            self.vars[0].clone(),
            self.vars[1].clone(),
        ))
    }
}

/// `x == y`: both variables narrow to the intersection of their domains.
fn equalise(
    context: &mut PropagationContext<'_>,
    x: &VarName,
    y: &VarName,
) -> Result<(u64, bool), Fail> {
    let meet = context.domain(x).intersection(context.domain(y));
    if meet.is_empty() {
        return Err(Fail);
    }
    let mut delta = 0;
    delta += context.constrain(x, &meet)?;
    delta += context.constrain(y, &meet)?;
    Ok((delta, false))
}

/// `x != y`: entailed once the domains are disjoint; otherwise a determined
/// side is removed from the other.
fn separate(
    context: &mut PropagationContext<'_>,
    x: &VarName,
    y: &VarName,
) -> Result<(u64, bool), Fail> {
    if context.domain(x).intersection(context.domain(y)).is_empty() {
        return Ok((0, true));
    }
    let mut delta = 0;
    if let Some(value) = context.domain(x).value() {
        delta += context.constrain(y, &Domain::singleton(value).complement())?;
    } else if let Some(value) = context.domain(y).value() {
        delta += context.constrain(x, &Domain::singleton(value).complement())?;
    }
    Ok((delta, false))
}

/// `x < y` (`strict`) or `x <= y`: the two-sided bounds rule, run to a local
/// fixpoint. Entailed once every value of `y` exceeds every value of `x`.
fn order(
    context: &mut PropagationContext<'_>,
    x: &VarName,
    y: &VarName,
    strict: bool,
) -> Result<(u64, bool), Fail> {
    let mut delta = 0;
    loop {
        let (x_lo, x_hi) = context.bounds(x)?;
        let (y_lo, y_hi) = context.bounds(y)?;
        let entailed = if strict { y_lo > x_hi } else { y_lo >= x_hi };
        if entailed {
            return Ok((delta, true));
        }
        let mut changed = 0;
        let x_cap = if strict {
            // x < y with y capped at zero leaves nothing for x.
            if y_hi == 0 {
                return Err(Fail);
            }
            y_hi - 1
        } else {
            y_hi
        };
        if x_cap < x_hi {
            changed += context.constrain_range(x, x_lo, x_cap)?;
        }
        let y_floor = if strict { x_lo + 1 } else { x_lo };
        if y_floor > y_lo {
            changed += context.constrain_range(y, y_floor, y_hi)?;
        }
        if changed == 0 {
            return Ok((delta, false));
        }
        delta += changed;
    }
}
