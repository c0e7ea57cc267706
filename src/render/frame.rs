//! Per-record line formatting.
//!
//! One task record renders as: status glyph, two-space indentation per
//! depth, title, an inline bar for bar records, and a dimmed elapsed-time
//! suffix once completed.

use std::time::Duration;

use super::record::{TaskKind, TaskRecord, TaskStatus};
use super::theme::CairnTheme;

/// Spinner animation frames, advanced once per tick.
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const PENDING_GLYPH: &str = "○";
const COMPLETED_GLYPH: &str = "✓";
const FAILED_GLYPH: &str = "✗";
const SKIPPED_GLYPH: &str = "⊘";

const BAR_WIDTH: u64 = 20;

/// Render one record as a single display line (no trailing newline).
pub fn render_line(record: &TaskRecord, tick: usize, theme: &CairnTheme) -> String {
    let icon = icon_for(record, tick, theme);
    let indent = "  ".repeat(record.indent);
    let mut line = format!("{} {}{}", icon, indent, record.title);

    if record.kind == TaskKind::Bar && record.total > 0 {
        line.push(' ');
        line.push_str(&render_bar(record.current, record.total));
    }

    if record.status == TaskStatus::Completed {
        if let Some(elapsed) = record.completion_time {
            line.push(' ');
            line.push_str(
                &theme
                    .duration
                    .apply_to(format!("({})", format_duration(elapsed)))
                    .to_string(),
            );
        }
    }

    line
}

fn icon_for(record: &TaskRecord, tick: usize, theme: &CairnTheme) -> String {
    match record.status {
        TaskStatus::Pending => theme.dim.apply_to(PENDING_GLYPH).to_string(),
        // Groups never animate: their status is a derived aggregate, not
        // an independent timer.
        TaskStatus::Running if record.kind == TaskKind::Group => {
            theme.dim.apply_to(PENDING_GLYPH).to_string()
        }
        TaskStatus::Running => theme
            .info
            .apply_to(SPINNER_FRAMES[tick % SPINNER_FRAMES.len()])
            .to_string(),
        TaskStatus::Completed => theme.success.apply_to(COMPLETED_GLYPH).to_string(),
        TaskStatus::Failed => theme.error.apply_to(FAILED_GLYPH).to_string(),
        TaskStatus::Skipped => theme.dim.apply_to(SKIPPED_GLYPH).to_string(),
    }
}

fn render_bar(current: u64, total: u64) -> String {
    let filled = (current.min(total) * BAR_WIDTH / total) as usize;
    let empty = BAR_WIDTH as usize - filled;
    format!(
        "{}{} {}/{}",
        "█".repeat(filled),
        "░".repeat(empty),
        current,
        total
    )
}

/// Human-readable elapsed time: `412ms`, `3.4s`, `2.1m`.
pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{:.1}m", d.as_secs_f64() / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::record::{TaskId, TaskOptions};
    use std::time::Instant;

    fn record(kind: TaskKind, status: TaskStatus) -> TaskRecord {
        let mut record = TaskRecord::new(
            TaskId(0),
            "Build",
            &TaskOptions {
                kind,
                ..Default::default()
            },
        );
        record.status = status;
        record
    }

    #[test]
    fn pending_shows_pending_glyph() {
        let line = render_line(
            &record(TaskKind::Spinner, TaskStatus::Pending),
            0,
            &CairnTheme::plain(),
        );
        assert_eq!(line, "○ Build");
    }

    #[test]
    fn running_spinner_shows_animation_frame() {
        let theme = CairnTheme::plain();
        let line = render_line(&record(TaskKind::Spinner, TaskStatus::Running), 0, &theme);
        assert!(line.starts_with("⠋"));

        let line = render_line(&record(TaskKind::Spinner, TaskStatus::Running), 1, &theme);
        assert!(line.starts_with("⠙"));
    }

    #[test]
    fn spinner_frames_wrap_around() {
        let theme = CairnTheme::plain();
        let first = render_line(&record(TaskKind::Spinner, TaskStatus::Running), 0, &theme);
        let wrapped = render_line(
            &record(TaskKind::Spinner, TaskStatus::Running),
            SPINNER_FRAMES.len(),
            &theme,
        );
        assert_eq!(first, wrapped);
    }

    #[test]
    fn running_group_shows_pending_glyph() {
        let line = render_line(
            &record(TaskKind::Group, TaskStatus::Running),
            3,
            &CairnTheme::plain(),
        );
        assert_eq!(line, "○ Build");
    }

    #[test]
    fn completed_shows_check_and_elapsed() {
        let mut record = record(TaskKind::Spinner, TaskStatus::Completed);
        record.completion_time = Some(Duration::from_millis(1200));
        let line = render_line(&record, 0, &CairnTheme::plain());
        assert_eq!(line, "✓ Build (1.2s)");
    }

    #[test]
    fn completed_without_time_omits_suffix() {
        let line = render_line(
            &record(TaskKind::Spinner, TaskStatus::Completed),
            0,
            &CairnTheme::plain(),
        );
        assert_eq!(line, "✓ Build");
    }

    #[test]
    fn failed_shows_cross() {
        let line = render_line(
            &record(TaskKind::Spinner, TaskStatus::Failed),
            0,
            &CairnTheme::plain(),
        );
        assert_eq!(line, "✗ Build");
    }

    #[test]
    fn skipped_shows_slash() {
        let line = render_line(
            &record(TaskKind::Spinner, TaskStatus::Skipped),
            0,
            &CairnTheme::plain(),
        );
        assert_eq!(line, "⊘ Build");
    }

    #[test]
    fn indent_adds_two_spaces_per_level() {
        let mut record = record(TaskKind::Spinner, TaskStatus::Pending);
        record.indent = 2;
        let line = render_line(&record, 0, &CairnTheme::plain());
        assert_eq!(line, "○     Build");
    }

    #[test]
    fn bar_renders_filled_and_empty_blocks() {
        let mut record = record(TaskKind::Bar, TaskStatus::Running);
        record.current = 5;
        record.total = 10;
        let line = render_line(&record, 0, &CairnTheme::plain());
        assert!(line.contains("██████████░░░░░░░░░░"));
        assert!(line.contains("5/10"));
    }

    #[test]
    fn bar_clamps_overshoot() {
        let mut record = record(TaskKind::Bar, TaskStatus::Running);
        record.current = 15;
        record.total = 10;
        let line = render_line(&record, 0, &CairnTheme::plain());
        assert!(line.contains(&"█".repeat(20)));
        assert!(!line.contains('░'));
    }

    #[test]
    fn bar_with_zero_total_is_omitted() {
        let mut record = record(TaskKind::Bar, TaskStatus::Running);
        record.total = 0;
        let line = render_line(&record, 0, &CairnTheme::plain());
        assert!(!line.contains('█'));
    }

    #[test]
    fn format_duration_sub_second_stays_in_millis() {
        assert_eq!(format_duration(Duration::ZERO), "0ms");
        assert_eq!(format_duration(Duration::from_millis(412)), "412ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
    }

    #[test]
    fn format_duration_switches_units_at_boundaries() {
        assert_eq!(format_duration(Duration::from_millis(1000)), "1.0s");
        assert_eq!(format_duration(Duration::from_millis(3400)), "3.4s");
        assert_eq!(format_duration(Duration::from_secs(59)), "59.0s");
        assert_eq!(format_duration(Duration::from_secs(126)), "2.1m");
    }

    #[test]
    fn started_at_does_not_affect_rendering() {
        let mut r = record(TaskKind::Spinner, TaskStatus::Running);
        r.started_at = Some(Instant::now());
        let line = render_line(&r, 0, &CairnTheme::plain());
        assert!(line.contains("Build"));
    }
}
