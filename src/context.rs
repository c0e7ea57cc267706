//! Ambient step context.
//!
//! Code running inside a leaf's work item can report sub-progress or open
//! named sub-steps without threading a handle through every call:
//! [`StepContext::current`] resolves the context bound to the dynamic extent
//! of the executing leaf. Outside of an active execution it degrades to an
//! inert no-op, so shared business logic stays unit-testable without the
//! display engine attached.
//!
//! The binding uses tokio's task-local storage rather than process-global
//! state, so two engines running concurrently in one process cannot observe
//! each other's context.

use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::render::{MultiProgress, TaskHandle, TaskId, TaskKind, TaskOptions};

tokio::task_local! {
    static ACTIVE_STEP: ActiveStep;
}

/// The implicit progress channel for whichever step is "current".
///
/// Obtained via [`StepContext::current`]. Every operation is a no-op when no
/// leaf is executing; none of them can panic.
pub struct StepContext {
    active: Option<ActiveStep>,
}

impl StepContext {
    /// The context bound to the currently executing leaf, or an inert
    /// context when called outside any active execution.
    pub fn current() -> Self {
        Self {
            active: ACTIVE_STEP.try_with(|active| active.clone()).ok(),
        }
    }

    /// Whether a leaf execution is bound to this context.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Update the displayed count of the open sub-step, or of the leaf
    /// itself when no sub-step is open. Flips the target record to a bar.
    pub fn progress(&self, current: u64, total: u64) {
        if let Some(active) = &self.active {
            active.progress(current, total);
        }
    }

    /// Complete the currently open sub-step and open the named one. Reuses
    /// a pre-declared record when the label matches one; otherwise a new
    /// record is created, inserted after the most recently inserted record
    /// of this leaf.
    pub fn sub(&self, label: &str) {
        if let Some(active) = &self.active {
            active.open_sub(label);
        }
    }
}

/// Run a future with the given step bound as the ambient context.
pub(crate) async fn with_active<F>(active: ActiveStep, fut: F) -> F::Output
where
    F: Future,
{
    ACTIVE_STEP.scope(active, fut).await
}

/// Sub-step bookkeeping for one executing leaf. Shared between the engine
/// (which feeds incremental events into it) and any [`StepContext`] the
/// leaf's own code resolves.
#[derive(Clone)]
pub(crate) struct ActiveStep {
    inner: Arc<ActiveStepInner>,
}

struct ActiveStepInner {
    progress: MultiProgress,
    leaf: TaskHandle,
    indent: usize,
    subs: Mutex<SubState>,
}

struct SubState {
    /// Pre-declared sub-step records not yet opened, in declaration order.
    declared: Vec<(String, TaskHandle)>,
    /// The currently open sub-step.
    open: Option<TaskHandle>,
    /// Insertion anchor: the most recently inserted record of this leaf.
    last_inserted: TaskId,
}

impl ActiveStep {
    pub(crate) fn new(progress: MultiProgress, leaf: TaskHandle, indent: usize) -> Self {
        let last_inserted = leaf.id();
        Self {
            inner: Arc::new(ActiveStepInner {
                progress,
                leaf,
                indent,
                subs: Mutex::new(SubState {
                    declared: Vec::new(),
                    open: None,
                    last_inserted,
                }),
            }),
        }
    }

    /// Pre-register a batch of sub-steps as pending records, in order, each
    /// inserted after the previous one. The leaf stops animating: it now
    /// represents a sub-tree.
    pub(crate) fn declare_substeps(&self, labels: &[String]) {
        let mut subs = self.inner.subs.lock().unwrap();
        for label in labels {
            let handle = self.inner.progress.add(
                label,
                TaskOptions {
                    indent: self.inner.indent + 1,
                    insert_after: Some(subs.last_inserted),
                    ..Default::default()
                },
            );
            subs.last_inserted = handle.id();
            subs.declared.push((label.clone(), handle));
        }
        self.inner.leaf.set_kind(TaskKind::Group);
    }

    /// Complete the open sub-step and open the named one.
    pub(crate) fn open_sub(&self, label: &str) {
        let mut subs = self.inner.subs.lock().unwrap();
        if let Some(open) = subs.open.take() {
            open.complete();
        }

        let handle = match subs.declared.iter().position(|(l, _)| l == label) {
            Some(index) => subs.declared.remove(index).1,
            None => {
                let handle = self.inner.progress.add(
                    label,
                    TaskOptions {
                        indent: self.inner.indent + 1,
                        insert_after: Some(subs.last_inserted),
                        ..Default::default()
                    },
                );
                subs.last_inserted = handle.id();
                handle
            }
        };
        handle.start();
        subs.open = Some(handle);
        self.inner.leaf.set_kind(TaskKind::Group);
    }

    /// Progress on the open sub-step, falling back to the leaf itself.
    pub(crate) fn progress(&self, current: u64, total: u64) {
        let subs = self.inner.subs.lock().unwrap();
        match &subs.open {
            Some(open) => open.set_progress(current, total),
            None => self.inner.leaf.set_progress(current, total),
        }
    }

    /// Complete any still-open sub-step (sequence exhaustion / leaf return).
    pub(crate) fn finish(&self) {
        let mut subs = self.inner.subs.lock().unwrap();
        if let Some(open) = subs.open.take() {
            open.complete();
        }
    }
}
