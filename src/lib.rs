//! Cairn - live hierarchical progress display for multi-step terminal
//! operations.
//!
//! A declared tree of named steps executes sequentially while a renderer
//! keeps an always-current multi-line status view (spinners, bars, nested
//! sub-steps, timings) in sync with execution state.
//!
//! # Modules
//!
//! - [`tree`] - Step declarations and the parsed step tree
//! - [`work`] - The three work-item shapes (value, deferred, incremental)
//! - [`context`] - Ambient step context for in-flight sub-progress
//! - [`render`] - Task registry and the live terminal renderer
//! - [`engine`] - Sequential orchestration: `run`, `pipe`, `TaskList`
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use cairn::{run, RunOptions, StepContext, Steps, WorkItem};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> cairn::Result<()> {
//! let steps = Steps::new()
//!     .step("loadConfig", WorkItem::value(|_| Ok(json!("loaded"))))
//!     .group(
//!         "build",
//!         Steps::new().step(
//!             "compileSources",
//!             WorkItem::value(|_| {
//!                 // Report sub-progress without an explicit handle.
//!                 StepContext::current().progress(1, 3);
//!                 Ok(json!(true))
//!             }),
//!         ),
//!     );
//!
//! let results = run(steps, RunOptions::default()).await?;
//! assert_eq!(results["loadConfig"], json!("loaded"));
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod render;
pub mod tree;
pub mod work;

pub use context::StepContext;
pub use engine::{pipe, run, RunOptions, TaskList};
pub use error::{CairnError, Result};
pub use render::{
    DrawTarget, MultiProgress, TaskHandle, TaskId, TaskKind, TaskOptions, TaskRecord, TaskStatus,
};
pub use tree::{StepDef, StepNode, Steps};
pub use work::{StepEvent, WorkItem};
