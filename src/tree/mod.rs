//! Step tree model.
//!
//! A pure data transform: an ordered declaration ([`Steps`]) becomes a tree
//! of [`StepNode`]s (groups and leaves), and the tree flattens into the
//! depth-first [`FlatStep`] list that fixes both execution and display order.
//! Nothing in here is mutable state and nothing can fail.

mod def;
mod label;
mod node;

pub use def::{StepDef, Steps};
pub use label::humanize;
pub use node::{flatten, leaves_of, parse, FlatStep, StepNode};
