//! A finite-domain constraint solver built on clonable *computation spaces*,
//! in the tradition of Mozart/Oz.
//!
//! A [`Space`] holds integer variables over finite domains together with the
//! propagators that constrain them. Posting a constraint never solves
//! anything by itself; [`Space::propagate`] runs all propagators to a
//! fixpoint, and the search drivers in [`search`] explore the tree that
//! results from cloning a stable space and committing each clone to one
//! branch of a [`branching`] choice.
//!
//! # Solving a problem
//!
//! ```
//! use ozkin::branching::distribute;
//! use ozkin::search::DepthFirst;
//! use ozkin::Domain;
//! use ozkin::Space;
//!
//! let mut space = Space::new();
//! let _ = space.decl_all(["a", "b"], Domain::interval(0, 10));
//! let _ = space.distinct(["a", "b"]);
//! let _ = space.plus("a", "b", "c");
//! distribute::fail_first(&mut space, ["a", "b"]);
//!
//! let mut search = DepthFirst::new(space);
//! let first = search.next().expect("a != b has solutions in [0, 10]");
//! assert_eq!(first.int("a"), Some(0));
//! assert_eq!(first.int("b"), Some(1));
//! assert_eq!(first.int("c"), Some(1));
//! ```
//!
//! # Crate layout
//!
//! - [`domain`] - canonical sorted interval sequences and their set algebra
//!   and arithmetic.
//! - [`variables`] - named variables holding a domain and a revision counter.
//! - [`space`] - the computation space: variable store, propagator list,
//!   brancher, fixpoint loop, and the constraint-posting API.
//! - [`branching`] - variable/value selection strategies and the
//!   [`branching::distribute`] presets.
//! - [`search`] - depth-first and branch-and-bound drivers, both exposed as
//!   iterators over [`Solution`]s.
//! - [`statistics`] - the statistic log line format shared by drivers and
//!   demo programs.

pub(crate) mod asserts;
pub mod basic_types;
pub mod branching;
pub mod domain;
pub(crate) mod propagators;
pub mod search;
pub mod space;
pub mod statistics;
pub mod variables;

pub use basic_types::Fail;
pub use basic_types::Solution;
pub use basic_types::SolutionValue;
pub use domain::Domain;
pub use domain::Interval;
pub use domain::INF;
pub use domain::SUP;
pub use propagators::comparison::CmpOp;
pub use space::Space;
pub use variables::VarName;
