//! Step orchestration.
//!
//! Drives a parsed step tree against the renderer: every node is registered
//! as a pending task up front (the whole plan appears immediately), then
//! leaves execute strictly in flattened order. Each leaf runs inside an
//! ambient context scope, its result is reconciled per work-item shape, and
//! ancestor groups start and complete off their leaf descendants. Teardown
//! of the renderer is unconditional, so the terminal is never left
//! half-drawn or with a hidden cursor.

use std::collections::HashMap;
use std::time::Instant;

use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, trace};

use crate::context::{with_active, ActiveStep};
use crate::error::{CairnError, Result};
use crate::render::{DrawTarget, MultiProgress, TaskHandle, TaskKind, TaskOptions};
use crate::tree::{self, Steps};
use crate::work::{StepEvent, WorkItem};

/// Options for a [`run`]/[`pipe`] invocation.
#[derive(Default)]
pub struct RunOptions {
    /// Erase the display on exit instead of leaving the final frame.
    pub clear: bool,

    /// Where frames are drawn. Defaults to stderr, with a non-interactive
    /// fallback when stderr is not a terminal. Tests point this at a buffer.
    pub target: Option<DrawTarget>,
}

/// Execute every leaf in declared depth-first order, collecting each leaf's
/// result keyed by its declared key.
pub async fn run(steps: Steps, options: RunOptions) -> Result<HashMap<String, Value>> {
    let outcome = execute(steps, options, Mode::Collect).await?;
    Ok(outcome.results)
}

/// Execute every leaf in declared depth-first order, threading each leaf's
/// result as the sole input of the next leaf's work item (the first leaf
/// receives `Value::Null`). Returns only the final value.
pub async fn pipe(steps: Steps, options: RunOptions) -> Result<Value> {
    let outcome = execute(steps, options, Mode::Pipe).await?;
    Ok(outcome.last)
}

#[derive(Clone, Copy)]
enum Mode {
    Collect,
    Pipe,
}

struct Planned {
    key: String,
    indent: usize,
    work: Option<WorkItem>,
    handle: TaskHandle,
}

struct GroupTracker {
    /// Index of the group's own task in the planned list.
    task: usize,
    /// Indices of the group's leaf descendants.
    leaves: Vec<usize>,
    remaining: usize,
    started_at: Option<Instant>,
}

struct Outcome {
    results: HashMap<String, Value>,
    last: Value,
}

async fn execute(steps: Steps, options: RunOptions, mode: Mode) -> Result<Outcome> {
    let flat = tree::flatten(tree::parse(steps));
    let progress = MultiProgress::new(options.target.unwrap_or_else(DrawTarget::stderr));

    // Registration phase: groups and leaves alike become pending records.
    let mut planned = Vec::with_capacity(flat.len());
    let mut group_spans = Vec::new();
    for step in flat {
        let kind = if step.group {
            TaskKind::Group
        } else {
            TaskKind::Spinner
        };
        let handle = progress.add(
            &step.label,
            TaskOptions {
                kind,
                indent: step.indent,
                ..Default::default()
            },
        );
        if step.group {
            group_spans.push((planned.len(), step.indent));
        }
        planned.push(Planned {
            key: step.key,
            indent: step.indent,
            work: step.work,
            handle,
        });
    }
    let mut groups = group_trackers(&planned, &group_spans);
    debug!(tasks = planned.len(), groups = groups.len(), "plan registered");

    // A group declared without any leaf descendants completes vacuously.
    for group in &groups {
        if group.remaining == 0 {
            planned[group.task].handle.complete();
        }
    }

    progress.start();
    let result = drive(&progress, &mut planned, &mut groups, mode).await;
    progress.stop(options.clear);
    result
}

fn group_trackers(planned: &[Planned], group_spans: &[(usize, usize)]) -> Vec<GroupTracker> {
    group_spans
        .iter()
        .map(|&(task, indent)| {
            let leaves: Vec<usize> = planned
                .iter()
                .enumerate()
                .skip(task + 1)
                .take_while(|(_, p)| p.indent > indent)
                .filter(|(_, p)| p.work.is_some())
                .map(|(i, _)| i)
                .collect();
            GroupTracker {
                task,
                remaining: leaves.len(),
                leaves,
                started_at: None,
            }
        })
        .collect()
}

async fn drive(
    progress: &MultiProgress,
    planned: &mut [Planned],
    groups: &mut [GroupTracker],
    mode: Mode,
) -> Result<Outcome> {
    let mut results = HashMap::new();
    let mut last = Value::Null;

    for index in 0..planned.len() {
        let Some(work) = planned[index].work.take() else {
            continue;
        };

        // Ancestor group timers start with their first leaf.
        for group in groups.iter_mut() {
            if group.started_at.is_none() && group.leaves.contains(&index) {
                group.started_at = Some(Instant::now());
                planned[group.task].handle.start();
            }
        }

        let input = match mode {
            Mode::Pipe => last.clone(),
            Mode::Collect => Value::Null,
        };
        let key = planned[index].key.clone();
        let value = run_leaf(
            progress,
            &planned[index].handle,
            planned[index].indent,
            &key,
            work,
            input,
        )
        .await?;
        results.insert(key, value.clone());
        last = value;

        // A group completes the instant all of its leaf descendants have.
        for group in groups.iter_mut() {
            if group.leaves.contains(&index) {
                group.remaining -= 1;
                if group.remaining == 0 {
                    let elapsed = group
                        .started_at
                        .map(|t| t.elapsed())
                        .unwrap_or_default();
                    planned[group.task].handle.complete_with_time(elapsed);
                    trace!(group = %planned[group.task].key, "group completed");
                }
            }
        }
    }

    Ok(Outcome { results, last })
}

/// Run one leaf work item with an ambient context bound to its handle.
pub(crate) async fn run_leaf(
    progress: &MultiProgress,
    handle: &TaskHandle,
    indent: usize,
    key: &str,
    work: WorkItem,
    input: Value,
) -> Result<Value> {
    handle.start();
    debug!(step = %key, "step started");
    let active = ActiveStep::new(progress.clone(), handle.clone(), indent);

    let outcome = with_active(active.clone(), async {
        match work {
            WorkItem::Value(f) => f(input),
            WorkItem::Deferred(f) => f(input).await,
            WorkItem::Incremental(f) => {
                let mut events = f(input);
                let mut result = Value::Null;
                while let Some(event) = events.next().await {
                    match event? {
                        StepEvent::Substeps(labels) => active.declare_substeps(&labels),
                        StepEvent::Sub(label) => active.open_sub(&label),
                        StepEvent::Progress(current, total) => active.progress(current, total),
                        StepEvent::Finish(value) => result = value,
                    }
                    // Let the animation tick run before the next event.
                    tokio::task::yield_now().await;
                }
                Ok(result)
            }
        }
    })
    .await;

    match outcome {
        Ok(value) => {
            active.finish();
            handle.complete();
            trace!(step = %key, "step completed");
            Ok(value)
        }
        Err(error) => {
            handle.fail();
            debug!(step = %key, error = %error, "step failed");
            Err(CairnError::StepFailed {
                step: key.to_string(),
                message: format!("{:#}", error),
            })
        }
    }
}
