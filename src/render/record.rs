//! Task records and their status state machine.

use std::time::{Duration, Instant};

/// Opaque record identifier, unique per [`MultiProgress`](super::MultiProgress)
/// instance, assigned at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) u64);

/// How a task renders while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Animated spinner glyph.
    Spinner,

    /// Inline block-character bar sized to `current/total`.
    Bar,

    /// Aggregate of descendants; never animates (its status is derived,
    /// not an independent timer), shows the pending glyph while running.
    Group,
}

/// Status of a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Registered, not yet started.
    Pending,

    /// Currently executing.
    Running,

    /// Finished successfully.
    Completed,

    /// Finished with an error.
    Failed,

    /// Skipped without running.
    Skipped,
}

impl TaskStatus {
    /// Check if this is a terminal state (no more changes expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// One on-screen line of persistent state. Owned exclusively by the
/// renderer; the engine only holds [`TaskHandle`](super::TaskHandle)s.
/// Records are never deleted while the renderer lives.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub current: u64,
    pub total: u64,
    pub indent: usize,
    pub started_at: Option<Instant>,
    pub completion_time: Option<Duration>,
}

impl TaskRecord {
    pub(crate) fn new(id: TaskId, title: &str, options: &TaskOptions) -> Self {
        Self {
            id,
            title: title.to_string(),
            kind: options.kind,
            status: TaskStatus::Pending,
            current: 0,
            total: options.total.unwrap_or(0),
            indent: options.indent,
            started_at: None,
            completion_time: None,
        }
    }
}

/// Options for registering a new task record.
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    /// Render style; defaults to a spinner.
    pub kind: TaskKind,

    /// Total count for bar tasks.
    pub total: Option<u64>,

    /// Nesting depth (two display spaces per level).
    pub indent: usize,

    /// Splice the new record immediately after this id; appended when
    /// absent or unknown.
    pub insert_after: Option<TaskId>,
}

impl Default for TaskKind {
    fn default() -> Self {
        TaskKind::Spinner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Skipped.is_terminal());
    }

    #[test]
    fn status_display() {
        assert_eq!(format!("{}", TaskStatus::Pending), "pending");
        assert_eq!(format!("{}", TaskStatus::Completed), "completed");
        assert_eq!(format!("{}", TaskStatus::Failed), "failed");
    }

    #[test]
    fn new_record_starts_pending() {
        let record = TaskRecord::new(TaskId(1), "Build", &TaskOptions::default());
        assert_eq!(record.status, TaskStatus::Pending);
        assert_eq!(record.kind, TaskKind::Spinner);
        assert!(record.started_at.is_none());
        assert!(record.completion_time.is_none());
    }

    #[test]
    fn options_carry_total_and_indent() {
        let options = TaskOptions {
            kind: TaskKind::Bar,
            total: Some(10),
            indent: 2,
            ..Default::default()
        };
        let record = TaskRecord::new(TaskId(7), "Download", &options);
        assert_eq!(record.kind, TaskKind::Bar);
        assert_eq!(record.total, 10);
        assert_eq!(record.indent, 2);
    }
}
