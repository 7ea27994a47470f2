//! Assertion macros for usage errors and internal invariants.
//!
//! `ozkin_assert_simple!` guards the public API against programmer errors and
//! is always compiled in. `ozkin_assert_moderate!` checks internal invariants
//! on hot paths and is only active with the `debug-checks` feature.

/// Always-on assertion for programmer errors at the API boundary.
#[macro_export]
macro_rules! ozkin_assert_simple {
    ($($arg:tt)*) => {
        assert!($($arg)*)
    };
}

/// Invariant check that is only compiled in with the `debug-checks` feature.
#[macro_export]
macro_rules! ozkin_assert_moderate {
    ($($arg:tt)*) => {
        if cfg!(feature = "debug-checks") {
            assert!($($arg)*);
        }
    };
}
