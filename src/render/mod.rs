//! Task registry and live terminal renderer.
//!
//! This module provides:
//! - [`MultiProgress`] — the ordered, mutable task record list with
//!   insert-after splice semantics and the flicker-free in-place redraw loop
//! - [`TaskHandle`] — the engine's opaque reference to one record
//! - [`DrawTarget`] — terminal, hidden (non-interactive), or buffer output
//! - [`CairnTheme`] — style slots for glyphs and suffixes

pub mod frame;
pub mod multi;
pub mod record;
pub mod theme;

pub use frame::{format_duration, SPINNER_FRAMES};
pub use multi::{DrawTarget, MultiProgress, TaskHandle};
pub use record::{TaskId, TaskKind, TaskOptions, TaskRecord, TaskStatus};
pub use theme::{should_use_colors, CairnTheme};
