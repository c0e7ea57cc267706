//! Legacy fluent task list.
//!
//! Registers `(title, work item)` pairs one at a time and executes them with
//! the same reconciliation rules as [`run`](super::run), without the
//! tree/grouping features. Results come back in registration order.

use serde_json::Value;

use super::runner::{run_leaf, RunOptions};
use crate::error::Result;
use crate::render::{DrawTarget, MultiProgress, TaskOptions};
use crate::work::WorkItem;

/// A flat, fluently built list of tasks.
///
/// # Example
///
/// ```no_run
/// use cairn::{TaskList, WorkItem};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> cairn::Result<()> {
/// let results = TaskList::new()
///     .task("Fetch manifest", WorkItem::value(|_| Ok(json!("manifest"))))
///     .task("Install", WorkItem::deferred(|_| async { Ok(json!(true)) }))
///     .execute()
///     .await?;
/// assert_eq!(results.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct TaskList {
    tasks: Vec<(String, WorkItem)>,
    options: RunOptions,
}

impl TaskList {
    /// Create an empty task list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty task list with explicit options.
    pub fn with_options(options: RunOptions) -> Self {
        Self {
            tasks: Vec::new(),
            options,
        }
    }

    /// Register a task. Order of registration is execution order.
    pub fn task(mut self, title: impl Into<String>, work: WorkItem) -> Self {
        self.tasks.push((title.into(), work));
        self
    }

    /// Execute every task sequentially, returning their results in order.
    ///
    /// A failing task stops the list; tasks not yet started never run.
    pub async fn execute(self) -> Result<Vec<Value>> {
        let progress =
            MultiProgress::new(self.options.target.unwrap_or_else(DrawTarget::stderr));

        let handles: Vec<_> = self
            .tasks
            .iter()
            .map(|(title, _)| progress.add(title, TaskOptions::default()))
            .collect();

        progress.start();

        let mut results = Vec::with_capacity(self.tasks.len());
        let mut failure = None;
        for (index, (title, work)) in self.tasks.into_iter().enumerate() {
            match run_leaf(&progress, &handles[index], 0, &title, work, Value::Null).await {
                Ok(value) => results.push(value),
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }

        progress.stop(self.options.clear);

        match failure {
            Some(error) => Err(error),
            None => Ok(results),
        }
    }
}
