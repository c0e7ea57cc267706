//! Orchestration engine.
//!
//! Two top-level run modes differ only in how leaf results are combined:
//! [`run`] collects results keyed by declared key, [`pipe`] threads each
//! result into the next leaf and returns the final value. [`TaskList`] is
//! the legacy flat mode built on the same per-leaf reconciliation.

pub mod list;
pub mod runner;

pub use list::TaskList;
pub use runner::{pipe, run, RunOptions};
