use ratatui::text::Line;
use ratatui::text::Span;
use zoea_protocol::AgentSummary;
use zoea_protocol::BroadcastRecord;

use super::renderable::ColumnRenderable;
use super::renderable::FixedLines;
use super::section_title;
use crate::animation::spinner;
use crate::history_cell::format_short_time;
use crate::layout::AGENT_ROW_HEIGHT;
use crate::layout::DASHBOARD_AGENT_TITLE_ROWS;
use crate::layout::DASHBOARD_BROADCAST_TITLE_ROWS;
use crate::layout::dashboard_split;
use crate::message_row::NO_ACTIVITY_PLACEHOLDER;
use crate::message_row::format_message_row;
use crate::model::BROADCAST_LIMIT;
use crate::model::Model;
use crate::text_formatting::display_width;
use crate::text_formatting::fit_line;
use crate::text_formatting::flatten_whitespace;
use crate::text_formatting::pad;
use crate::text_formatting::truncate_with_ellipsis;
use crate::theme::Theme;

const NAME_COLUMNS: usize = 16;
const STATE_COLUMNS: usize = 8;
const ACTIVITY_COLUMNS: usize = 10;
/// Message rows are indented under the mysis name.
const MESSAGE_INDENT: usize = 4;

impl Model {
    /// Broadcast list and mysis list, `rows` tall.
    pub(super) fn dashboard_body(&self, width: u16, rows: u16) -> ColumnRenderable<'static> {
        let theme = self.theme();
        let width = usize::from(width);
        let titles = DASHBOARD_BROADCAST_TITLE_ROWS + DASHBOARD_AGENT_TITLE_ROWS;
        let list_rows = usize::from(rows.saturating_sub(titles));
        let (broadcast_rows, agent_rows) =
            dashboard_split(list_rows, self.broadcasts().len(), BROADCAST_LIMIT);

        let broadcast_detail = match self.pending_broadcasts() {
            0 => None,
            pending => Some(format!("sending {pending}")),
        };
        let mut broadcasts = vec![section_title(
            "BROADCASTS",
            broadcast_detail.as_deref(),
            width,
            theme,
        )];
        broadcasts.extend(broadcast_lines(self.broadcasts(), broadcast_rows, width, theme));

        let agent_detail = format!("{}", self.agents().len());
        let mut agents = vec![section_title("MYSES", Some(&agent_detail), width, theme)];
        agents.extend(self.agent_lines(agent_rows, width));

        ColumnRenderable::with([
            FixedLines::new(broadcasts, to_rows(broadcast_rows) + DASHBOARD_BROADCAST_TITLE_ROWS),
            FixedLines::new(agents, to_rows(agent_rows) + DASHBOARD_AGENT_TITLE_ROWS),
        ])
    }

    /// Two rows per mysis, scrolled so the selection stays visible.
    fn agent_lines(&self, rows: usize, width: usize) -> Vec<Line<'static>> {
        let theme = self.theme();
        if rows == 0 {
            return Vec::new();
        }
        if self.agents().is_empty() {
            return vec![fit_line(
                Line::from(Span::styled(
                    " No myses yet. Press n to create one.",
                    theme.dim,
                )),
                width,
            )];
        }
        let visible = (rows / AGENT_ROW_HEIGHT).max(1);
        let first = self
            .selected_index()
            .saturating_sub(visible - 1)
            .min(self.agents().len().saturating_sub(visible));
        let mut lines = Vec::with_capacity(rows);
        for (idx, agent) in self.agents().iter().enumerate().skip(first).take(visible) {
            lines.push(self.agent_summary_line(agent, idx == self.selected_index(), width));
            lines.push(message_line(agent, width, theme));
        }
        lines.truncate(rows);
        lines
    }

    fn agent_summary_line(&self, agent: &AgentSummary, selected: bool, width: usize) -> Line<'static> {
        let theme = self.theme();
        let glyphs = &theme.glyphs;
        let marker = if selected { glyphs.selection } else { " " };
        let busy = agent.activity.is_busy() || self.is_sending(&agent.id);
        let spin = if busy {
            spinner(glyphs, self.frame())
        } else {
            " "
        };
        let name = pad(&truncate_with_ellipsis(&agent.name, NAME_COLUMNS), NAME_COLUMNS);
        let name_style = if selected {
            theme.selected
        } else {
            theme.brand
        };
        let model = agent.model.as_deref().unwrap_or("-");
        let mut spans = vec![
            Span::styled(marker, theme.accent),
            Span::raw(" "),
            Span::styled(spin.to_string(), theme.accent),
            Span::raw(" "),
            Span::styled(name, name_style),
            Span::raw(" "),
            Span::styled(
                pad(&agent.state.to_string(), STATE_COLUMNS),
                theme.state_style(agent.state),
            ),
            Span::raw(" "),
            Span::styled(
                pad(&agent.activity.to_string(), ACTIVITY_COLUMNS),
                theme.dim,
            ),
            Span::raw(" "),
            Span::raw(format!("{}/{model}", agent.provider)),
        ];
        if let Some(account) = agent.account.as_deref() {
            spans.push(Span::styled(format!(" @{account}"), theme.dim));
        }
        fit_line(Line::from(spans), width)
    }
}

fn message_line(agent: &AgentSummary, width: usize, theme: &Theme) -> Line<'static> {
    let indent = Span::raw(" ".repeat(MESSAGE_INDENT));
    let room = width.saturating_sub(MESSAGE_INDENT);
    let body = format_message_row(agent, room, theme).unwrap_or_else(|| {
        Line::from(Span::styled(NO_ACTIVITY_PLACEHOLDER, theme.dim))
    });
    let mut spans = vec![indent];
    spans.extend(
        body.spans
            .into_iter()
            .map(|span| span.patch_style(body.style)),
    );
    fit_line(Line::from(spans), width)
}

/// Newest first, one row each: `[HH:MM] sender: content`.
fn broadcast_lines(
    broadcasts: &[BroadcastRecord],
    rows: usize,
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    if rows == 0 {
        return Vec::new();
    }
    if broadcasts.is_empty() {
        return vec![fit_line(
            Line::from(Span::styled(" No broadcasts yet", theme.dim)),
            width,
        )];
    }
    broadcasts
        .iter()
        .take(rows)
        .map(|broadcast| {
            let time = format!(" {} ", format_short_time(broadcast.created_at));
            let sender = format!(
                "{}: ",
                broadcast.sender_name.as_deref().unwrap_or("swarm")
            );
            let room = width.saturating_sub(display_width(&time) + display_width(&sender));
            let content = flatten_whitespace(&broadcast.content);
            fit_line(
                Line::from(vec![
                    Span::styled(time, theme.dim),
                    Span::styled(sender, theme.role_swarm),
                    Span::raw(truncate_with_ellipsis(&content, room).into_owned()),
                ]),
                width,
            )
        })
        .collect()
}

fn to_rows(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}
