//! Input bar and status bar shared by the dashboard and focus views.
//!
//! Key handling for prompts lives in [`InputSession`]; which prompt is active and what a submit
//! does is decided by the model.

mod footer;
mod input_history;
mod input_session;
mod word_boundary;

pub use footer::FooterProps;
pub use footer::status_line;
pub use input_history::InputHistory;
pub use input_session::InputMode;
pub use input_session::InputSession;

use ratatui::text::Line;
use ratatui::text::Span;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::text_formatting::display_width;
use crate::text_formatting::fit_line;
use crate::text_formatting::truncate;
use crate::text_formatting::truncate_with_ellipsis;
use crate::theme::Theme;

/// The input bar: the active prompt with its buffer, or dimmed key hints.
///
/// Returns the line (exactly `width` columns) and, while a prompt is active, the cursor column.
/// A buffer longer than the bar scrolls horizontally so the cursor stays visible.
pub fn input_line(
    session: Option<&InputSession>,
    hints: &str,
    width: usize,
    theme: &Theme,
) -> (Line<'static>, Option<usize>) {
    let Some(session) = session else {
        let line = Line::from(Span::styled(
            format!(" {}", truncate_with_ellipsis(hints, width.saturating_sub(1))),
            theme.dim,
        ));
        return (fit_line(line, width), None);
    };

    let prompt = truncate(&session.mode.prompt(), width.saturating_sub(1)).to_string();
    let prompt_width = display_width(&prompt);
    let mut spans = vec![Span::styled(prompt, theme.accent)];
    // One column stays free for the cursor at the end of the buffer.
    let room = width.saturating_sub(prompt_width + 1);

    if session.text().is_empty() {
        if let Some(placeholder) = session.placeholder() {
            let hint = format!("(default: {placeholder})");
            spans.push(Span::styled(
                truncate(&hint, room).to_string(),
                theme.dim,
            ));
        }
        return (fit_line(Line::from(spans), width), Some(prompt_width));
    }

    let cursor_column = session.cursor_column();
    let skip = cursor_column.saturating_sub(room);
    let visible = skip_columns(session.text(), skip);
    spans.push(Span::raw(truncate(visible, room).to_string()));
    let cursor = (prompt_width + cursor_column - skip).min(width.saturating_sub(1));
    (fit_line(Line::from(spans), width), Some(cursor))
}

/// Drop leading graphemes until at least `columns` columns are skipped.
fn skip_columns(text: &str, columns: usize) -> &str {
    let mut skipped = 0usize;
    for (idx, grapheme) in text.grapheme_indices(true) {
        if skipped >= columns {
            return &text[idx..];
        }
        skipped += UnicodeWidthStr::width(grapheme);
    }
    ""
}
