//! # TUI renderer (C9)
//!
//! Renders the call-stack breadcrumb, a horizontal rule, and a window into
//! the current source file centred on the line about to execute (spec
//! §4.8). The windowing arithmetic ([`compute_window`]) is kept free of
//! any ratatui types so it can be unit-tested directly against the
//! boundary invariants in spec §8 (invariants 11, 12); [`render`] is the
//! thin layer that paints a computed window into a frame.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::Frame;

/// Row 0 is the breadcrumb, row 1 the rule; source lines start at row 2.
pub const SOURCE_TOP_ROW: u16 = 2;

/// Result of the windowing policy (spec §4.8): which 1-indexed source
/// lines to show and which screen row carries the highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// First source line shown (1-indexed, inclusive).
    pub start: usize,
    /// One past the last source line shown (1-indexed, exclusive).
    pub end: usize,
    /// Absolute screen row (0-indexed) carrying the reversed-video
    /// highlight.
    pub highlight_row: usize,
}

/// Compute the source window for a terminal of height `height` showing
/// `current_line` out of `total_lines`, per spec §4.8's windowing policy
/// and the boundary invariants in spec §8 (11, 12).
#[must_use]
pub fn compute_window(height: u16, current_line: usize, total_lines: usize) -> Window {
    let h = height as usize;
    let half = h / 2;

    if current_line <= half {
        Window {
            start: 1,
            end: h.min(total_lines) + 1,
            highlight_row: current_line + 1,
        }
    } else {
        let start = current_line - half;
        let end = (start + h).min(total_lines) + 1;
        Window {
            start,
            end,
            highlight_row: half + 2,
        }
    }
}

/// Paint one frame: breadcrumb, rule, and the windowed source with the
/// current line reversed (spec §4.8). `lines` is 0-indexed (source cache
/// entries); `current_line` is the 1-indexed line about to execute.
pub fn render(frame: &mut Frame, stack: &[String], lines: &[String], current_line: usize) {
    let area = frame.area();
    let buf = frame.buffer_mut();

    render_breadcrumb(buf, area, stack);
    render_rule(buf, area);

    let window = compute_window(area.height, current_line, lines.len());
    for (row_offset, line_no) in (window.start..window.end).enumerate() {
        let row = SOURCE_TOP_ROW as usize + row_offset;
        if row >= area.height as usize {
            break;
        }
        let text = lines.get(line_no - 1).map(String::as_str).unwrap_or("");
        let style = if row == window.highlight_row {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        set_row(buf, area, row as u16, text, style);
    }
}

/// Row 0: frames joined by `"> "`, truncated to terminal width (spec
/// §4.8).
fn render_breadcrumb(buf: &mut Buffer, area: Rect, stack: &[String]) {
    let breadcrumb = stack.join("> ");
    set_row(buf, area, 0, &breadcrumb, Style::default());
}

/// Row 1: a horizontal rule of `'-'` spanning the width (spec §4.8).
fn render_rule(buf: &mut Buffer, area: Rect) {
    let rule = "-".repeat(area.width as usize);
    set_row(buf, area, 1, &rule, Style::default());
}

/// Set one screen row's text starting at column 0, truncated to the
/// frame's width. Equivalent to the external terminal library's
/// `set_cell(x, y, ch, fg, bg)` applied character by character across a
/// row (spec §1: terminal I/O is an external collaborator offering
/// exactly that primitive).
fn set_row(buf: &mut Buffer, area: Rect, row: u16, text: &str, style: Style) {
    if row >= area.height {
        return;
    }
    let width = area.width as usize;
    let truncated: String = text.chars().take(width).collect();
    buf.set_string(area.x, area.y + row, truncated, style);
}

/// Non-interactive fallback used by `--no-tui` (SPEC_FULL §4): prints the
/// breadcrumb and the current line bolded to stdout instead of drawing a
/// full screen. Grounded on the original's pre-termbox `bold()` renderer
/// (`examples/original_source/server.go`) — useful under CI or piped
/// output where raw terminal mode isn't available.
pub fn render_plain(stack: &[String], lines: &[String], current_line: usize) {
    use crossterm::style::Stylize;

    println!("{}", stack.join("> "));
    match lines.get(current_line.saturating_sub(1)) {
        Some(text) => println!("{}: {}", current_line, text.as_str().bold()),
        None => println!("{current_line}: <no source>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_top_window_starts_at_line_one() {
        // invariant 11: current line near top of file.
        let w = compute_window(40, 3, 100);
        assert_eq!(w.start, 1);
        assert_eq!(w.highlight_row, 3 + 1);
    }

    #[test]
    fn near_top_window_clips_to_file_length() {
        let w = compute_window(40, 1, 5);
        assert_eq!(w.start, 1);
        assert_eq!(w.end, 6); // min(40, 5) + 1
    }

    #[test]
    fn past_half_height_scrolls_and_centres() {
        // invariant 12: current line past h/2.
        let h = 40u16;
        let current = 500;
        let w = compute_window(h, current, 10_000);
        assert_eq!(w.start, current - (h as usize) / 2);
        assert_eq!(w.highlight_row, (h as usize) / 2 + 2);
    }

    #[test]
    fn scrolled_window_end_is_clipped_to_file_length() {
        let w = compute_window(40, 9990, 10_000);
        assert_eq!(w.end, 10_000 + 1);
    }

    #[test]
    fn boundary_at_exactly_half_height_takes_near_top_branch() {
        let h = 40u16;
        let w = compute_window(h, 20, 1000); // current_line == h/2
        assert_eq!(w.start, 1);
        assert_eq!(w.highlight_row, 20 + 1);
    }
}
