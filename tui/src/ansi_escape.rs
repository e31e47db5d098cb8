use ansi_to_tui::IntoText;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::text_formatting::strip_ansi;

/// Convert one line of possibly ANSI-styled text into a styled [`Line`].
///
/// Styling does not carry across lines; input containing a newline is flattened into one line.
pub fn ansi_escape_line(s: &str) -> Line<'static> {
    if !s.contains('\x1b') {
        return Line::from(s.to_string());
    }
    match s.into_text() {
        Ok(text) => {
            let spans: Vec<Span<'static>> = text
                .lines
                .into_iter()
                .flat_map(|line| line.spans.into_iter())
                .collect();
            Line::from(spans)
        }
        Err(err) => {
            tracing::debug!("failed to parse ANSI sequences: {err}");
            Line::from(strip_ansi(s).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_formatting::line_to_plain;
    use pretty_assertions::assert_eq;
    use ratatui::style::Color;

    #[test]
    fn plain_text_is_a_single_raw_span() {
        let line = ansi_escape_line("hello");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line_to_plain(&line), "hello");
    }

    #[test]
    fn color_sequences_become_styles() {
        let line = ansi_escape_line("\x1b[31mred\x1b[0m plain");
        assert_eq!(line_to_plain(&line), "red plain");
        assert_eq!(line.spans[0].style.fg, Some(Color::Red));
    }
}
