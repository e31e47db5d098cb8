use ratatui::text::Line;
use ratatui::text::Span;
use zoea_protocol::AgentSummary;

use super::renderable::ColumnRenderable;
use super::renderable::FixedLines;
use super::section_title;
use crate::layout::FOCUS_INFO_ROWS;
use crate::layout::FOCUS_TITLE_ROWS;
use crate::layout::SCROLLBAR_COLS;
use crate::model::FocusView;
use crate::model::Model;
use crate::text_formatting::fit_line;
use crate::text_formatting::flatten_whitespace;
use crate::text_formatting::truncate_with_ellipsis;
use crate::theme::Theme;

impl Model {
    /// Info panel, log title and the scrollable log with its scrollbar, `rows` tall.
    pub(super) fn focus_body(
        &self,
        focus: &FocusView,
        width: u16,
        rows: u16,
    ) -> ColumnRenderable<'static> {
        let theme = self.theme();
        let columns = usize::from(width);
        let info = match self.agent(&focus.agent_id) {
            Some(agent) => self.info_lines(agent, focus, columns),
            None => vec![fit_line(
                Line::from(Span::styled(
                    format!(" mysis {} is no longer listed", focus.agent_id),
                    theme.dim,
                )),
                columns,
            )],
        };

        let viewport = &focus.viewport;
        let detail = (viewport.total() > viewport.height()).then(|| {
            let range = viewport.visible_range();
            let mut detail = format!("{}-{} of {}", range.start + 1, range.end, viewport.total());
            if !viewport.is_following() {
                detail.push_str(" · G to follow");
            }
            detail
        });
        let title = section_title("CONVERSATION", detail.as_deref(), columns, theme);

        let log_rows = rows.saturating_sub(FOCUS_INFO_ROWS + FOCUS_TITLE_ROWS);
        let log = log_lines(focus, usize::from(log_rows), columns, theme);

        ColumnRenderable::with([
            FixedLines::new(info, FOCUS_INFO_ROWS),
            FixedLines::new(vec![title], FOCUS_TITLE_ROWS),
            FixedLines::new(log, log_rows),
        ])
    }

    fn info_lines(&self, agent: &AgentSummary, focus: &FocusView, width: usize) -> Vec<Line<'static>> {
        let theme = self.theme();
        let label = |text: &str| Span::styled(text.to_string(), theme.dim);
        let model = agent.model.clone().unwrap_or_else(|| "-".to_string());
        let account = agent.account.clone().unwrap_or_else(|| "-".to_string());

        let identity = Line::from(vec![
            Span::raw(" "),
            Span::styled(agent.name.clone(), theme.title),
            Span::raw("  "),
            Span::styled(agent.state.to_string(), theme.state_style(agent.state)),
            label("  activity: "),
            Span::raw(agent.activity.to_string()),
        ]);
        let backend = Line::from(vec![
            label(" provider: "),
            Span::raw(agent.provider.clone()),
            label("  model: "),
            Span::raw(model),
            label("  account: "),
            Span::raw(account),
        ]);
        let created = agent.created_at.format("%Y-%m-%d %H:%M UTC");
        let origin = Line::from(vec![
            label(" id: "),
            Span::raw(agent.id.clone()),
            label("  created: "),
            Span::raw(created.to_string()),
        ]);

        let status = match agent.error_text() {
            Some(error) => {
                let text = format!(" Error: {}", flatten_whitespace(error));
                Line::from(Span::styled(
                    truncate_with_ellipsis(&text, width).into_owned(),
                    theme.error,
                ))
            }
            None => {
                let mut text = format!(
                    " {} entries · verbose {}",
                    focus.entries.len(),
                    if self.verbose() { "on" } else { "off" }
                );
                if self.is_sending(&agent.id) {
                    text.push_str(" · sending…");
                }
                Line::from(Span::styled(text, theme.dim))
            }
        };

        [identity, backend, origin, status]
            .into_iter()
            .map(|line| fit_line(line, width))
            .collect()
    }
}

/// Visible log lines with the scrollbar in the rightmost column.
fn log_lines(focus: &FocusView, rows: usize, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let content_width = width.saturating_sub(usize::from(SCROLLBAR_COLS));
    let scrollbar = focus.viewport.scrollbar();
    let visible = focus.visible_lines();
    (0..rows)
        .map(|row| {
            let line = visible.get(row).cloned().unwrap_or_default();
            let mut line = fit_line(line, content_width);
            let glyph = match scrollbar.as_ref().and_then(|bar| bar.get(row)) {
                Some(true) => Span::styled(theme.glyphs.scrollbar_thumb, theme.accent),
                Some(false) => Span::styled(theme.glyphs.scrollbar_track, theme.dim),
                None => Span::raw(" "),
            };
            line.spans.push(glyph);
            fit_line(line, width)
        })
        .collect()
}
