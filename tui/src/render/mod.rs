//! Frame composer: turns a [`Model`] into rows of exactly the terminal's width.
//!
//! Every section is a [`Renderable`] stacked in a [`ColumnRenderable`]; the lines inside each
//! section are fitted to the width before they reach the buffer.

mod dashboard;
mod focus;
pub(crate) mod renderable;

use std::time::Instant;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Span;
use unicode_width::UnicodeWidthStr;
use zoea_protocol::AgentState;

use crate::bottom_pane::FooterProps;
use crate::bottom_pane::input_line;
use crate::bottom_pane::status_line;
use crate::layout::HEADER_ROWS;
use crate::layout::INPUT_ROWS;
use crate::layout::MIN_TERMINAL_HEIGHT;
use crate::layout::MIN_TERMINAL_WIDTH;
use crate::layout::STATUS_ROWS;
use crate::layout::is_too_small;
use crate::model::Model;
use crate::model::View;
use crate::text_formatting::display_width;
use crate::text_formatting::fit_line;
use crate::text_formatting::truncate_with_ellipsis;
use crate::theme::Theme;
use crate::version::ZOEA_VERSION;
use renderable::ColumnRenderable;
use renderable::CursorLine;
use renderable::FixedLines;
use renderable::Renderable;

const DASHBOARD_HINTS: &str = "↑/↓ select · enter focus · b broadcast · m message · n new · c configure · s start · x stop · d delete · ? help · q quit";
const FOCUS_HINTS: &str =
    "↑/↓ scroll · pgup/pgdn page · g/G top/end · m message · b broadcast · v verbose · esc back · ? help";

const HELP_BINDINGS: &[(&str, &str)] = &[
    ("↑/k ↓/j", "select mysis / scroll log"),
    ("g G", "first / last (top / end of log)"),
    ("pgup pgdn space", "page the log"),
    ("enter", "focus the selected mysis"),
    ("esc", "cancel input, clear error, leave focus"),
    ("b", "broadcast to every mysis"),
    ("m", "message the selected mysis"),
    ("n", "create a mysis (name, then provider)"),
    ("c", "configure provider and model"),
    ("s x", "start / stop"),
    ("d D", "delete / force delete"),
    ("r", "refresh"),
    ("v", "toggle verbose log rendering"),
    ("↑ ↓ (input)", "recall earlier broadcasts and messages"),
    ("? q", "close help / quit"),
];

impl Model {
    /// Draw the whole frame into `buf`.
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        self.frame_renderable(area).render(area, buf);
    }

    /// Where the terminal cursor belongs, when an input prompt is active.
    pub fn cursor_position(&self, area: Rect) -> Option<(u16, u16)> {
        self.frame_renderable(area).cursor_pos(area)
    }

    fn frame_renderable(&self, area: Rect) -> ColumnRenderable<'static> {
        let theme = self.theme();
        let width = usize::from(area.width);
        if is_too_small(area.width, area.height) {
            return ColumnRenderable::with([too_small_screen(area, theme)]);
        }
        if self.show_help() {
            return ColumnRenderable::with([help_screen(area, theme)]);
        }

        let mut column = ColumnRenderable::new();
        column.push(FixedLines::new(self.header_lines(width), HEADER_ROWS));
        let body_rows = area.height.saturating_sub(HEADER_ROWS + INPUT_ROWS + STATUS_ROWS);
        match self.view() {
            View::Dashboard => column.push(self.dashboard_body(area.width, body_rows)),
            View::Focus(focus) => column.push(self.focus_body(focus, area.width, body_rows)),
        }

        let hints = if self.is_focus() {
            FOCUS_HINTS
        } else {
            DASHBOARD_HINTS
        };
        let (line, cursor) = input_line(self.input(), hints, width, theme);
        let cursor = cursor.and_then(|col| u16::try_from(col).ok());
        column.push(CursorLine::new(line, cursor));

        let footer = FooterProps {
            error: self.error(),
            notice: self.notice(),
            network: self.network(),
            provider_errors: self.provider_errors(Instant::now()),
            frame: self.frame(),
        };
        column.push(status_line(footer, width, theme));
        column
    }

    fn header_lines(&self, width: usize) -> Vec<Line<'static>> {
        let theme = self.theme();
        let view = match self.focus().and_then(|focus| self.agent(&focus.agent_id)) {
            Some(agent) => format!("FOCUS · {}", agent.name),
            None if self.is_focus() => "FOCUS".to_string(),
            None => "DASHBOARD".to_string(),
        };
        let mut right = view;
        if self.verbose() {
            right.push_str(" · VERBOSE");
        }
        let right = format!("{right} ");
        let left = format!(" ZOEA SWARM v{ZOEA_VERSION}");
        let title = if display_width(&left) + display_width(&right) + 1 <= width {
            let gap = width - display_width(&left) - display_width(&right);
            Line::from(vec![
                Span::styled(left, theme.title),
                Span::raw(" ".repeat(gap)),
                Span::styled(right, theme.accent),
            ])
        } else {
            Line::from(Span::styled(left, theme.title))
        };

        vec![fit_line(title, width), fit_line(self.stats_line(), width)]
    }

    /// Counts per lifecycle state plus the aggregate tick.
    fn stats_line(&self) -> Line<'static> {
        let theme = self.theme();
        let count = |state: AgentState| self.agents().iter().filter(|a| a.state == state).count();
        let separator = || Span::styled(" │ ", theme.dim);
        let mut spans = vec![Span::raw(format!(" {} myses", self.agents().len()))];
        for state in [
            AgentState::Running,
            AgentState::Idle,
            AgentState::Stopped,
            AgentState::Errored,
        ] {
            spans.push(separator());
            spans.push(Span::styled(
                format!("{} {state}", count(state)),
                theme.state_style(state),
            ));
        }
        spans.push(separator());
        spans.push(Span::styled(format!("tick {}", self.tick()), theme.dim));
        Line::from(spans)
    }
}

/// A section heading: ` LABEL ` followed by a rule, with optional right-hand detail.
pub(crate) fn section_title(
    label: &str,
    detail: Option<&str>,
    width: usize,
    theme: &Theme,
) -> Line<'static> {
    let label = format!(" {label} ");
    let detail = detail.map(|detail| format!(" {detail} ")).unwrap_or_default();
    let used = display_width(&label) + display_width(&detail);
    let rule = theme.glyphs.rule.repeat(width.saturating_sub(used));
    fit_line(
        Line::from(vec![
            Span::styled(label, theme.title),
            Span::styled(rule, theme.dim),
            Span::styled(detail, theme.dim),
        ]),
        width,
    )
}

fn help_screen(area: Rect, theme: &Theme) -> FixedLines {
    let width = usize::from(area.width);
    let key_width = HELP_BINDINGS
        .iter()
        .map(|(keys, _)| display_width(keys))
        .max()
        .unwrap_or(0);
    let mut lines = vec![
        section_title("KEY BINDINGS", None, width, theme),
        Line::default(),
    ];
    for (keys, action) in HELP_BINDINGS {
        let keys = format!("  {keys:<key_width$}  ");
        let room = width.saturating_sub(display_width(&keys));
        lines.push(fit_line(
            Line::from(vec![
                Span::styled(keys, theme.accent),
                Span::raw(truncate_with_ellipsis(action, room).into_owned()),
            ]),
            width,
        ));
    }
    let rows = usize::from(area.height);
    lines.truncate(rows.saturating_sub(1));
    lines.resize(rows.saturating_sub(1), Line::default());
    lines.push(fit_line(
        Line::from(Span::styled(" Press ? or Esc to close help", theme.dim)),
        width,
    ));
    FixedLines::new(lines, area.height)
}

fn too_small_screen(area: Rect, theme: &Theme) -> FixedLines {
    let width = usize::from(area.width);
    let messages = [
        (format!("{} Terminal too small", theme.glyphs.warning), theme.warning),
        (
            format!(
                "need {MIN_TERMINAL_WIDTH}x{MIN_TERMINAL_HEIGHT}, have {}x{}",
                area.width, area.height
            ),
            theme.dim,
        ),
    ];
    let top = usize::from(area.height).saturating_sub(messages.len()) / 2;
    let mut lines = vec![Line::default(); top];
    for (text, style) in messages {
        let text = truncate_with_ellipsis(&text, width).into_owned();
        let left = (width - display_width(&text)) / 2;
        lines.push(fit_line(
            Line::from(vec![Span::raw(" ".repeat(left)), Span::styled(text, style)]),
            width,
        ));
    }
    FixedLines::new(lines, area.height)
}

/// Render the model to plain text, one row per line, each exactly `width` columns wide.
pub fn render_frame(model: &Model, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    model.render(area, &mut buf);
    buffer_to_string(&buf)
}

fn buffer_to_string(buf: &Buffer) -> String {
    let area = buf.area;
    let mut rows = Vec::with_capacity(usize::from(area.height));
    for y in area.top()..area.bottom() {
        let mut row = String::new();
        let mut hidden = 0usize;
        for x in area.left()..area.right() {
            // Cells behind a wide glyph are placeholders.
            if hidden > 0 {
                hidden -= 1;
                continue;
            }
            let symbol = buf[(x, y)].symbol();
            hidden = UnicodeWidthStr::width(symbol).saturating_sub(1);
            row.push_str(symbol);
        }
        rows.push(row);
    }
    rows.join("\n")
}
