//! Work item shapes.
//!
//! Every leaf step owns exactly one [`WorkItem`]. The three variants cover
//! the three ways a step can produce its result:
//!
//! - [`WorkItem::Value`] — a synchronous closure, result taken immediately
//! - [`WorkItem::Deferred`] — a future with a single completion
//! - [`WorkItem::Incremental`] — a lazy, finite stream of [`StepEvent`]s
//!   consumed one at a time before the step completes
//!
//! All three resolve to exactly one [`Value`] or fail with exactly one error.
//! In `pipe` mode the closure argument is the previous leaf's result; in
//! `run` mode (and for the first `pipe` leaf) it is `Value::Null`.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{BoxStream, Stream, StreamExt};
use serde_json::Value;
use std::future::Future;

/// Synchronous value producer.
pub type ValueFn = Box<dyn FnOnce(Value) -> anyhow::Result<Value> + Send + 'static>;

/// Asynchronous producer with a single completion.
pub type DeferredFn = Box<dyn FnOnce(Value) -> BoxFuture<'static, anyhow::Result<Value>> + Send + 'static>;

/// Producer of a lazy, finite, non-restartable event sequence.
pub type IncrementalFn =
    Box<dyn FnOnce(Value) -> BoxStream<'static, anyhow::Result<StepEvent>> + Send + 'static>;

/// One progress event yielded by an incremental work item.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// Batch sub-step declaration: every label is pre-registered as a
    /// pending record and the parent leaf stops animating (it now
    /// represents a sub-tree).
    Substeps(Vec<String>),

    /// Complete the currently open sub-step and open the named one,
    /// reusing a pre-declared record when the label matches.
    Sub(String),

    /// Update the currently open sub-step's displayed count.
    Progress(u64, u64),

    /// The step's final result. A stream that ends without yielding this
    /// resolves to `Value::Null`.
    Finish(Value),
}

/// The work a leaf step performs.
pub enum WorkItem {
    /// Returns a result synchronously.
    Value(ValueFn),

    /// Returns a result asynchronously, single completion.
    Deferred(DeferredFn),

    /// Produces a lazy sequence of progress events, then completes.
    Incremental(IncrementalFn),
}

impl WorkItem {
    /// A synchronous value producer.
    pub fn value<F>(f: F) -> Self
    where
        F: FnOnce(Value) -> anyhow::Result<Value> + Send + 'static,
    {
        WorkItem::Value(Box::new(f))
    }

    /// A deferred producer: the closure builds the future that resolves to
    /// the step's result.
    pub fn deferred<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Value) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        WorkItem::Deferred(Box::new(move |input| f(input).boxed()))
    }

    /// An incremental producer: the closure builds the event stream.
    pub fn incremental<F, S>(f: F) -> Self
    where
        F: FnOnce(Value) -> S + Send + 'static,
        S: Stream<Item = anyhow::Result<StepEvent>> + Send + 'static,
    {
        WorkItem::Incremental(Box::new(move |input| f(input).boxed()))
    }
}

impl std::fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkItem::Value(_) => "Value",
            WorkItem::Deferred(_) => "Deferred",
            WorkItem::Incremental(_) => "Incremental",
        };
        f.debug_tuple(name).finish()
    }
}
