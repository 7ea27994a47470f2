//! Variables: a name, a current domain, and a revision counter.

use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

use crate::basic_types::Fail;
use crate::domain::Domain;

/// The name of a variable in a computation space.
///
/// User variables carry the script-supplied string; temporaries are numbered
/// by the engine when a composite constraint needs an intermediate result.
/// Temporaries never appear in solutions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarName {
    /// A script-supplied variable.
    User(Arc<str>),
    /// An engine-generated temporary.
    Temp(u64),
}

impl VarName {
    /// True for engine-generated temporaries.
    pub fn is_temp(&self) -> bool {
        matches!(self, VarName::Temp(_))
    }
}

impl From<&str> for VarName {
    fn from(name: &str) -> Self {
        VarName::User(Arc::from(name))
    }
}

impl From<String> for VarName {
    fn from(name: String) -> Self {
        VarName::User(Arc::from(name))
    }
}

impl From<Arc<str>> for VarName {
    fn from(name: Arc<str>) -> Self {
        VarName::User(name)
    }
}

impl From<&VarName> for VarName {
    fn from(name: &VarName) -> Self {
        name.clone()
    }
}

impl Display for VarName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VarName::User(name) => write!(f, "{name}"),
            VarName::Temp(id) => write!(f, "_t{id}"),
        }
    }
}

/// A finite-domain variable: the current domain plus a revision counter that
/// increments exactly when the domain is replaced by a different one.
///
/// Revision counters are what makes propagator change detection cheap: a
/// propagator sums the revisions of the variables it depends on and skips its
/// step when the sum has not moved since it last ran.
#[derive(Clone, Debug)]
pub(crate) struct Variable {
    domain: Domain,
    revision: u64,
}

impl Variable {
    pub(crate) fn new(domain: Domain) -> Self {
        Variable {
            domain,
            revision: 0,
        }
    }

    pub(crate) fn domain(&self) -> &Domain {
        &self.domain
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    /// True when the domain still holds more than one value (or none).
    pub(crate) fn is_undetermined(&self) -> bool {
        self.domain.value().is_none()
    }

    /// True when the domain is a singleton.
    pub(crate) fn is_determined(&self) -> bool {
        !self.is_undetermined()
    }

    /// Replaces the domain, bumping the revision only when the new domain
    /// differs from the current one. Returns the number of revision
    /// increments (zero or one).
    pub(crate) fn set_dom(&mut self, domain: Domain) -> u64 {
        if self.domain == domain {
            return 0;
        }
        self.domain = domain;
        self.revision += 1;
        1
    }

    /// Narrows the domain to its intersection with `bound`, failing when the
    /// intersection is empty.
    pub(crate) fn constrain(&mut self, bound: &Domain) -> Result<u64, Fail> {
        let narrowed = self.domain.intersection(bound);
        if narrowed.is_empty() {
            return Err(Fail);
        }
        Ok(self.set_dom(narrowed))
    }

    /// Restores a snapshot taken before a speculative step. This is the one
    /// place a revision may move backwards; callers only rewind to a state
    /// they previously observed.
    pub(crate) fn restore(&mut self, domain: Domain, revision: u64) {
        self.domain = domain;
        self.revision = revision;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_dom_bumps_revision_only_on_change() {
        let mut variable = Variable::new(Domain::interval(0, 10));
        assert_eq!(variable.set_dom(Domain::interval(0, 10)), 0);
        assert_eq!(variable.revision(), 0);
        assert_eq!(variable.set_dom(Domain::interval(0, 5)), 1);
        assert_eq!(variable.revision(), 1);
    }

    #[test]
    fn constrain_fails_on_empty_intersection() {
        let mut variable = Variable::new(Domain::interval(0, 4));
        assert_eq!(variable.constrain(&Domain::interval(3, 8)), Ok(1));
        assert_eq!(variable.domain(), &Domain::interval(3, 4));
        assert_eq!(variable.constrain(&Domain::interval(7, 9)), Err(Fail));
        // A failed constrain leaves the variable untouched.
        assert_eq!(variable.domain(), &Domain::interval(3, 4));
    }

    #[test]
    fn determination_tracks_the_domain() {
        let mut variable = Variable::new(Domain::interval(2, 3));
        assert!(variable.is_undetermined());
        let _ = variable.set_dom(Domain::singleton(2));
        assert!(variable.is_determined());
    }
}
