//! Statistic logging in a stable machine-readable line format.
//!
//! Statistics are emitted through the [`log`] facade as lines of the form
//! `<prefix> <name>=<value>`, closed off by a postfix marker, so harnesses
//! can scrape them out of otherwise free-form logs. The prefix can be
//! configured once, before the first statistic is written.

use std::fmt::Display;

use once_cell::sync::OnceCell;

static PREFIX: OnceCell<String> = OnceCell::new();

const DEFAULT_PREFIX: &str = "$stat$";
const POSTFIX: &str = "$end-stats$";

/// Sets the statistic line prefix. Only the first call has any effect.
pub fn configure_statistic_prefix(prefix: impl Into<String>) {
    let _ = PREFIX.set(prefix.into());
}

/// Logs one `name=value` statistic.
pub fn log_statistic(name: &str, value: impl Display) {
    let prefix = PREFIX.get().map_or(DEFAULT_PREFIX, String::as_str);
    log::info!("{prefix} {name}={value}");
}

/// Marks the end of a block of statistics.
pub fn log_statistic_postfix() {
    let prefix = PREFIX.get().map_or(DEFAULT_PREFIX, String::as_str);
    log::info!("{prefix} {POSTFIX}");
}
