//! One-line activity summary shown under each mysis on the dashboard.

use ratatui::text::Line;
use ratatui::text::Span;
use zoea_protocol::AgentState;
use zoea_protocol::AgentSummary;
use zoea_protocol::MemoryRecord;
use zoea_protocol::MemoryRole;
use zoea_protocol::MemorySource;
use zoea_protocol::tool_calls::decode_tool_calls;

use crate::history_cell::format_short_time;
use crate::history_cell::tool_call_summary;
use crate::text_formatting::display_width;
use crate::text_formatting::flatten_whitespace;
use crate::text_formatting::truncate_with_ellipsis;
use crate::theme::Theme;

pub const NO_ACTIVITY_PLACEHOLDER: &str = "no recent activity";

/// Pick the memory that best summarizes what `agent` is doing and format it for a row at most
/// `width` columns wide.
///
/// Precedence, first match wins: a surfaced error on an errored mysis, the newest assistant
/// reply, the newest assistant tool call (first call only), the newest user-role message. The
/// legacy `last_message` is used only when no memories were reported at all. `None` means the
/// caller shows [`NO_ACTIVITY_PLACEHOLDER`].
pub fn format_message_row(
    agent: &AgentSummary,
    width: usize,
    theme: &Theme,
) -> Option<Line<'static>> {
    if width == 0 {
        return None;
    }

    if agent.state == AgentState::Errored
        && let Some(error) = agent.error_text()
    {
        let text = format!("Error: {}", flatten_whitespace(error));
        return Some(Line::from(truncate_with_ellipsis(&text, width).into_owned()).style(theme.error));
    }

    let memories = &agent.recent_memories;
    if memories.is_empty() {
        let legacy = agent
            .last_message
            .as_deref()
            .map(flatten_whitespace)
            .filter(|text| !text.is_empty())?;
        return Some(Line::from(truncate_with_ellipsis(&legacy, width).into_owned()));
    }

    if let Some(reply) = memories
        .iter()
        .find(|m| m.role == MemoryRole::Assistant && !m.is_tool_call())
    {
        return Some(tagged_row(
            reply,
            "[AI]",
            theme.role_assistant,
            flatten_whitespace(&reply.content),
            width,
            theme,
        ));
    }

    if let Some((memory, summary)) = memories
        .iter()
        .filter(|m| m.is_tool_call())
        .find_map(|m| first_tool_call_summary(m).map(|summary| (m, summary)))
    {
        let bullet = theme.glyphs.bullet;
        return Some(tagged_row(
            memory,
            "[AI]",
            theme.role_assistant,
            format!("{bullet} {summary}"),
            width,
            theme,
        ));
    }

    if let Some(user) = memories.iter().find(|m| m.role == MemoryRole::User) {
        let (tag, style) = if user.source == MemorySource::Broadcast {
            ("[SWARM]", theme.role_swarm)
        } else {
            ("[YOU]", theme.role_user)
        };
        return Some(tagged_row(
            user,
            tag,
            style,
            flatten_whitespace(&user.content),
            width,
            theme,
        ));
    }

    None
}

fn first_tool_call_summary(memory: &MemoryRecord) -> Option<String> {
    match decode_tool_calls(&memory.content) {
        Ok(calls) => calls.first().map(tool_call_summary),
        Err(err) => {
            tracing::debug!("skipping undecodable tool call memory: {err}");
            None
        }
    }
}

fn tagged_row(
    memory: &MemoryRecord,
    tag: &'static str,
    tag_style: ratatui::style::Style,
    body: String,
    width: usize,
    theme: &Theme,
) -> Line<'static> {
    let time = format!("{} ", format_short_time(memory.created_at));
    let tag = format!("{tag} ");
    let mut spans: Vec<Span<'static>> = Vec::with_capacity(3);
    let mut remaining = width;
    for (text, style) in [(time, theme.dim), (tag, tag_style)] {
        let fitted = truncate_with_ellipsis(&text, remaining).into_owned();
        remaining = remaining.saturating_sub(display_width(&fitted));
        spans.push(Span::styled(fitted, style));
        if remaining == 0 {
            return Line::from(spans);
        }
    }
    spans.push(Span::raw(
        truncate_with_ellipsis(&body, remaining).into_owned(),
    ));
    Line::from(spans)
}
