//! The status bar at the bottom of every view.
//!
//! Pure rendering: callers build a [`FooterProps`] from model state and get back one line of
//! exactly the requested width.

use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::animation::BOUNCE_TRACK_WIDTH;
use crate::animation::bounce_track;
use crate::network_activity::NetworkActivity;
use crate::network_activity::NetworkKind;
use crate::text_formatting::display_width;
use crate::text_formatting::fit_line;
use crate::text_formatting::truncate_with_ellipsis;
use crate::theme::Theme;

#[derive(Clone, Copy, Debug)]
pub struct FooterProps<'a> {
    pub error: Option<&'a str>,
    pub notice: Option<&'a str>,
    pub network: NetworkActivity,
    pub provider_errors: usize,
    pub frame: usize,
}

pub fn status_line(props: FooterProps<'_>, width: usize, theme: &Theme) -> Line<'static> {
    let right = right_spans(&props, theme);
    let right_width: usize = right.iter().map(Span::width).sum();

    let (message, style) = match (props.error, props.notice) {
        (Some(error), _) => (format!("{} {error}", theme.glyphs.warning), theme.error),
        (None, Some(notice)) => (notice.to_string(), Style::default()),
        (None, None) => ("Ready".to_string(), theme.dim),
    };

    // The message may take the whole line when the indicator does not fit beside it.
    let mut spans = vec![Span::raw(" ")];
    if right_width + 2 >= width {
        spans.push(Span::styled(
            truncate_with_ellipsis(&message, width.saturating_sub(1)).into_owned(),
            style,
        ));
        return fit_line(Line::from(spans), width);
    }
    let left_room = width - right_width - 2;
    let left = truncate_with_ellipsis(&message, left_room).into_owned();
    let gap = width - 1 - display_width(&left) - right_width;
    spans.push(Span::styled(left, style));
    spans.push(Span::raw(" ".repeat(gap)));
    spans.extend(right);
    fit_line(Line::from(spans), width)
}

fn right_spans(props: &FooterProps<'_>, theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if props.provider_errors > 0 {
        spans.push(Span::styled(
            format!("provider errors (10m): {}", props.provider_errors),
            theme.warning,
        ));
        spans.push(Span::styled(" │ ", theme.dim));
    }
    let kind = props.network.kind();
    let style = match kind {
        NetworkKind::Idle => theme.dim,
        NetworkKind::Llm => theme.network_llm,
        NetworkKind::Mcp => theme.network_mcp,
    };
    spans.push(Span::styled(format!("{kind} "), style));
    if props.network.is_active() {
        spans.push(Span::styled(
            bounce_track(&theme.glyphs, props.frame, BOUNCE_TRACK_WIDTH),
            style,
        ));
    } else {
        spans.push(Span::styled(
            format!("[{}]", " ".repeat(BOUNCE_TRACK_WIDTH)),
            theme.dim,
        ));
    }
    spans.push(Span::raw(" "));
    spans
}
