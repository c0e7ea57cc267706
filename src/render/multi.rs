//! Live multi-task registry and renderer.
//!
//! [`MultiProgress`] owns an ordered, mutable list of [`TaskRecord`]s with
//! insert-after splice semantics, and redraws the whole list in place on
//! every state change and on every animation tick. The redraw moves the
//! cursor up by the number of lines drawn on the previous frame and rewrites
//! every record line, which is what produces flicker-free live multi-line
//! updates without a full-screen buffer.
//!
//! The animation tick runs on a dedicated thread started by [`start`]
//! (`MultiProgress::start`) and stopped by [`stop`](MultiProgress::stop),
//! redrawing unconditionally every 80 ms so the spinner glyph animates even
//! when no state changes.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::frame::render_line;
use super::record::{TaskId, TaskKind, TaskOptions, TaskRecord, TaskStatus};
use super::theme::{should_use_colors, CairnTheme};

const TICK_INTERVAL: Duration = Duration::from_millis(80);

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

/// Where frames are written.
pub enum DrawTarget {
    /// An interactive terminal.
    Term(console::Term),

    /// No drawing at all. The registry state machine is unaffected; only
    /// the draw step is skipped (non-interactive fallback).
    Hidden,

    /// An in-memory byte sink, for tests.
    Buffer(Arc<Mutex<Vec<u8>>>),
}

impl DrawTarget {
    /// Target stderr, falling back to [`DrawTarget::Hidden`] when stderr is
    /// not a terminal.
    pub fn stderr() -> Self {
        let term = console::Term::stderr();
        if term.is_term() {
            DrawTarget::Term(term)
        } else {
            DrawTarget::Hidden
        }
    }

    /// An in-memory target plus the shared buffer it writes to.
    pub fn buffer() -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        (DrawTarget::Buffer(Arc::clone(&buf)), buf)
    }

    fn write(&self, frame: &str) {
        match self {
            DrawTarget::Term(term) => {
                term.write_str(frame).ok();
            }
            DrawTarget::Hidden => {}
            DrawTarget::Buffer(buf) => {
                buf.lock().unwrap().extend_from_slice(frame.as_bytes());
            }
        }
    }

    fn is_hidden(&self) -> bool {
        matches!(self, DrawTarget::Hidden)
    }
}

struct Ticker {
    stop: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

struct State {
    records: Vec<TaskRecord>,
    next_id: u64,
    target: DrawTarget,
    theme: CairnTheme,
    last_lines: usize,
    tick: usize,
    active: bool,
    ticker: Option<Ticker>,
}

struct Shared {
    state: Mutex<State>,
}

/// Ordered registry of task records plus the in-place renderer.
///
/// Cloning is cheap and shares the same registry.
#[derive(Clone)]
pub struct MultiProgress {
    shared: Arc<Shared>,
}

impl MultiProgress {
    /// Create a registry writing to the given target.
    pub fn new(target: DrawTarget) -> Self {
        let theme = if should_use_colors() {
            CairnTheme::new()
        } else {
            CairnTheme::plain()
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    records: Vec::new(),
                    next_id: 0,
                    target,
                    theme,
                    last_lines: 0,
                    tick: 0,
                    active: false,
                    ticker: None,
                }),
            }),
        }
    }

    /// Create a registry targeting stderr (hidden when not a terminal).
    pub fn stderr() -> Self {
        Self::new(DrawTarget::stderr())
    }

    /// Register a new task record, created `pending`.
    ///
    /// When `insert_after` names an existing id the record is spliced
    /// immediately after it; otherwise it is appended.
    pub fn add(&self, title: &str, options: TaskOptions) -> TaskHandle {
        let mut state = self.shared.state.lock().unwrap();
        let id = TaskId(state.next_id);
        state.next_id += 1;

        let position = options
            .insert_after
            .and_then(|after| state.records.iter().position(|r| r.id == after))
            .map(|i| i + 1)
            .unwrap_or(state.records.len());
        let record = TaskRecord::new(id, title, &options);
        state.records.insert(position, record);
        draw_if_active(&mut state);

        TaskHandle {
            id,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Begin the render loop: first draw plus the 80 ms animation tick.
    /// Idempotent.
    pub fn start(&self) {
        let mut state = self.shared.state.lock().unwrap();
        if state.active {
            return;
        }
        state.active = true;
        debug!("progress renderer started");

        if !state.target.is_hidden() {
            state.target.write(HIDE_CURSOR);
        }
        draw(&mut state);

        let shared = Arc::clone(&self.shared);
        let (stop, ticks) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            match ticks.recv_timeout(TICK_INTERVAL) {
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    let mut state = shared.state.lock().unwrap();
                    if !state.active {
                        break;
                    }
                    state.tick += 1;
                    draw(&mut state);
                }
                _ => break,
            }
        });
        state.ticker = Some(Ticker { stop, handle });
    }

    /// Halt the render loop. Idempotent.
    ///
    /// With `clear` set, every previously drawn line is erased, leaving no
    /// trace; otherwise one final frame is drawn (so terminal statuses set
    /// during teardown are visible without waiting for a tick) and left on
    /// screen, cursor advanced past it.
    pub fn stop(&self, clear: bool) {
        let ticker = {
            let mut state = self.shared.state.lock().unwrap();
            if !state.active {
                return;
            }
            state.active = false;
            debug!(clear, "progress renderer stopped");

            if clear {
                if state.last_lines > 0 {
                    let erase = format!("\x1b[{}A\r\x1b[0J", state.last_lines);
                    state.target.write(&erase);
                    state.last_lines = 0;
                }
            } else {
                draw(&mut state);
            }
            if !state.target.is_hidden() {
                state.target.write(SHOW_CURSOR);
            }
            state.ticker.take()
        };

        // Join outside the lock: the tick thread may be waiting on it.
        if let Some(ticker) = ticker {
            drop(ticker.stop);
            ticker.handle.join().ok();
        }
    }

    /// Whether the render loop is running.
    pub fn is_active(&self) -> bool {
        self.shared.state.lock().unwrap().active
    }

    /// Snapshot of every record in display order.
    pub fn tasks(&self) -> Vec<TaskRecord> {
        self.shared.state.lock().unwrap().records.clone()
    }
}

/// Opaque reference to one task record.
///
/// All operations on a handle whose record no longer resolves are silent
/// no-ops; handles may outlive logical cleanup in edge cases.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    shared: Arc<Shared>,
}

impl TaskHandle {
    /// The record's opaque id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    fn with_record(&self, f: impl FnOnce(&mut TaskRecord)) {
        let mut state = self.shared.state.lock().unwrap();
        if let Some(index) = state.records.iter().position(|r| r.id == self.id) {
            f(&mut state.records[index]);
            draw_if_active(&mut state);
        }
    }

    /// Transition `pending` → `running` and start the elapsed timer.
    pub fn start(&self) {
        self.with_record(|record| {
            if record.status == TaskStatus::Pending {
                record.status = TaskStatus::Running;
                record.started_at = Some(Instant::now());
            }
        });
    }

    /// Update a bar record's displayed count.
    pub fn update(&self, current: u64) {
        self.with_record(|record| record.current = current);
    }

    /// Set both count and total, flipping the record to a bar.
    pub fn set_progress(&self, current: u64, total: u64) {
        self.with_record(|record| {
            record.kind = TaskKind::Bar;
            record.current = current;
            record.total = total;
        });
    }

    /// Complete with elapsed time measured from [`start`](Self::start).
    pub fn complete(&self) {
        self.with_record(|record| {
            if !record.status.is_terminal() {
                record.status = TaskStatus::Completed;
                record.completion_time = record.started_at.map(|t| t.elapsed());
            }
        });
    }

    /// Complete with an externally computed elapsed time (group aggregates).
    pub fn complete_with_time(&self, elapsed: Duration) {
        self.with_record(|record| {
            if !record.status.is_terminal() {
                record.status = TaskStatus::Completed;
                record.completion_time = Some(elapsed);
            }
        });
    }

    /// Mark the record failed.
    pub fn fail(&self) {
        self.with_record(|record| {
            if !record.status.is_terminal() {
                record.status = TaskStatus::Failed;
            }
        });
    }

    /// Mark the record skipped.
    pub fn skip(&self) {
        self.with_record(|record| {
            if !record.status.is_terminal() {
                record.status = TaskStatus::Skipped;
            }
        });
    }

    /// Replace the display title.
    pub fn set_title(&self, title: &str) {
        let title = title.to_string();
        self.with_record(move |record| record.title = title);
    }

    /// Change the render style (e.g. spinner → group once sub-steps exist).
    pub fn set_kind(&self, kind: TaskKind) {
        self.with_record(|record| record.kind = kind);
    }

    /// Current status; `Pending` when the record cannot be resolved.
    pub fn status(&self) -> TaskStatus {
        let state = self.shared.state.lock().unwrap();
        state
            .records
            .iter()
            .find(|r| r.id == self.id)
            .map(|r| r.status)
            .unwrap_or(TaskStatus::Pending)
    }
}

fn draw_if_active(state: &mut State) {
    if state.active {
        draw(state);
    }
}

fn draw(state: &mut State) {
    if state.target.is_hidden() {
        return;
    }

    let mut frame = String::new();
    if state.last_lines > 0 {
        frame.push_str(&format!("\x1b[{}A", state.last_lines));
    }
    for record in &state.records {
        frame.push_str("\r\x1b[2K");
        frame.push_str(&render_line(record, state.tick, &state.theme));
        frame.push('\n');
    }
    state.target.write(&frame);
    state.last_lines = state.records.len();
}

impl Drop for State {
    fn drop(&mut self) {
        // Never leave the terminal with a hidden cursor.
        if self.active && !self.target.is_hidden() {
            self.target.write(SHOW_CURSOR);
        }
    }
}
