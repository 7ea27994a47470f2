//! Propagators for `p = k * v` with a constant factor.
//!
//! Posted as two directed propagators: the product narrows against the
//! scaled-up image of the variable, and the variable narrows against the
//! floored scale-down of the product. The degenerate factors zero and one
//! never reach this module; the space API rewrites them into equalities.

use super::PropagationContext;
use super::Propagator;
use crate::basic_types::PropagationStatus;
use crate::variables::VarName;

/// `p ∩ {k * x : x in v}`.
#[derive(Debug)]
pub(crate) struct ScaleUpPropagator {
    k: u32,
    /// `[p, v]`; the variable is the dependency.
    vars: [VarName; 2],
    last_step: Option<u64>,
    solved: bool,
}

impl ScaleUpPropagator {
    pub(crate) fn new(k: u32, product: VarName, variable: VarName) -> Self {
        ScaleUpPropagator {
            k,
            vars: [product, variable],
            last_step: None,
            solved: false,
        }
    }
}

impl Propagator for ScaleUpPropagator {
    fn name(&self) -> &str {
        "scale-up"
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
        let [product, variable] = self.vars.clone();
        let image = context.domain(&variable).scale_up(self.k);
        let delta = context.constrain(&product, &image)?;
        self.last_step = Some(context.revision_sum(self.dep_vars()));
        Ok(delta)
    }

    fn rebuilt(&self) -> Box<dyn Propagator> {
        Box::new(ScaleUpPropagator::new(
            self.k,
            self.vars[0].clone(),
            self.vars[1].clone(),
        ))
    }
}

/// `v ∩ {⌊p / k⌋ : p in product}`.
#[derive(Debug)]
pub(crate) struct ScaleDownPropagator {
    k: u32,
    /// `[v, p]`; the product is the dependency.
    vars: [VarName; 2],
    last_step: Option<u64>,
    solved: bool,
}

impl ScaleDownPropagator {
    pub(crate) fn new(k: u32, variable: VarName, product: VarName) -> Self {
        ScaleDownPropagator {
            k,
            vars: [variable, product],
            last_step: None,
            solved: false,
        }
    }
}

impl Propagator for ScaleDownPropagator {
    fn name(&self) -> &str {
        "scale-down"
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
        let [variable, product] = self.vars.clone();
        let image = context.domain(&product).scale_down(self.k);
        let delta = context.constrain(&variable, &image)?;
        self.last_step = Some(context.revision_sum(self.dep_vars()));
        Ok(delta)
    }

    fn rebuilt(&self) -> Box<dyn Propagator> {
        Box::new(ScaleDownPropagator::new(
            self.k,
            self.vars[0].clone(),
            self.vars[1].clone(),
        ))
    }
}
