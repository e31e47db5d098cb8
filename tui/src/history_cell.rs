//! Conversation log cells for the focus view.
//!
//! Each stored memory becomes one [`LogEntryCell`]: a blank spacer, a header rule carrying the
//! timestamp and role, the content, and an optional reasoning block. Content is classified once
//! into a [`ContentShape`] and rendered by matching on that shape.

use chrono::DateTime;
use chrono::Local;
use chrono::Utc;
use itertools::Itertools;
use ratatui::prelude::*;
use ratatui::style::Style;
use serde_json::Value;
use zoea_protocol::MemoryRecord;
use zoea_protocol::MemoryRole;
use zoea_protocol::MemorySource;
use zoea_protocol::tool_calls::ToolCallDecodeError;
use zoea_protocol::tool_calls::ToolCallRecord;
use zoea_protocol::tool_calls::decode_tool_calls;
use zoea_protocol::tool_calls::is_tool_call_payload;

use crate::ansi_escape::ansi_escape_line;
use crate::json_tree::render_json_tree;
use crate::json_tree::render_value_tree;
use crate::text_formatting::display_width;
use crate::text_formatting::fit_line;
use crate::text_formatting::strip_ansi;
use crate::text_formatting::truncate_with_ellipsis;
use crate::text_formatting::wrap;
use crate::theme::Theme;

/// Columns of indentation in front of entry content.
pub const LOG_INDENT: usize = 2;
/// Reasoning longer than this many wrapped lines is elided in compact mode.
pub const REASONING_MAX_LINES: usize = 3;
const REASONING_TAIL_LINES: usize = 2;
const TOOL_ARGS_INDENT: &str = "  ";
pub const TIMESTAMP_PLACEHOLDER: &str = "T0 [--:--]";

/// A renderable unit of the conversation log.
pub trait HistoryCell {
    fn display_lines(&self, width: u16) -> Vec<Line<'static>>;

    fn desired_height(&self, width: u16) -> u16 {
        u16::try_from(self.display_lines(width).len()).unwrap_or(u16::MAX)
    }
}

/// One conversation record, detached from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub role: MemoryRole,
    pub source: MemorySource,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub content: String,
    pub reasoning: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<MemoryRecord> for LogEntry {
    fn from(record: MemoryRecord) -> Self {
        Self {
            role: record.role,
            source: record.source,
            sender_id: record.sender_id,
            sender_name: record.sender_name,
            content: record.content,
            reasoning: record.reasoning,
            timestamp: record.created_at,
        }
    }
}

/// How an entry's content should be presented.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentShape {
    PlainText(String),
    ToolCallBatch(Result<Vec<ToolCallRecord>, ToolCallDecodeError>),
    StructuredValue(Value),
}

/// Decide the presentation of `entry` once, in priority order: tool calls, JSON tool results,
/// then plain text.
pub fn classify(entry: &LogEntry) -> ContentShape {
    if entry.role == MemoryRole::Assistant && is_tool_call_payload(&entry.content) {
        return ContentShape::ToolCallBatch(decode_tool_calls(&entry.content));
    }
    if entry.role == MemoryRole::Tool {
        let body = strip_call_id_prefix(&entry.content).trim();
        if looks_like_json(body) {
            match serde_json::from_str::<Value>(body) {
                Ok(value) => return ContentShape::StructuredValue(value),
                Err(err) => tracing::debug!("tool result looked like JSON but failed: {err}"),
            }
        }
        return ContentShape::PlainText(body.to_string());
    }
    ContentShape::PlainText(entry.content.clone())
}

/// Strip a leading `call_<id>:` marker from a tool result.
pub fn strip_call_id_prefix(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("call_") else {
        return content;
    };
    match rest.split_once(':') {
        Some((id, body))
            if !id.is_empty() && !id.chars().any(|ch| ch.is_whitespace() || ch == '{') =>
        {
            body
        }
        _ => content,
    }
}

fn looks_like_json(text: &str) -> bool {
    (text.starts_with('{') && text.ends_with('}')) || (text.starts_with('[') && text.ends_with(']'))
}

/// Header label for an entry's role.
pub fn role_prefix(role: MemoryRole, source: MemorySource, sender_name: Option<&str>) -> String {
    match role {
        MemoryRole::System => "SYS:".to_string(),
        MemoryRole::User => match source {
            MemorySource::BroadcastSelf => "YOU (BROADCAST):".to_string(),
            MemorySource::Broadcast => match sender_name.map(str::trim).filter(|s| !s.is_empty()) {
                Some(sender) => format!("SWARM ({sender}):"),
                None => "SWARM:".to_string(),
            },
            _ => "YOU:".to_string(),
        },
        MemoryRole::Assistant => "AI:".to_string(),
        MemoryRole::Tool => "TOOL:".to_string(),
        MemoryRole::Unknown => "???:".to_string(),
    }
}

fn role_style(theme: &Theme, role: MemoryRole, source: MemorySource) -> Style {
    match role {
        MemoryRole::System => theme.role_system,
        MemoryRole::User if source == MemorySource::Broadcast => theme.role_swarm,
        MemoryRole::User => theme.role_user,
        MemoryRole::Assistant => theme.role_assistant,
        MemoryRole::Tool => theme.role_tool,
        MemoryRole::Unknown => theme.role_unknown,
    }
}

/// A zero (epoch) timestamp means "unknown".
fn known_timestamp(timestamp: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    timestamp.filter(|ts| ts.timestamp() != 0 || ts.timestamp_subsec_nanos() != 0)
}

/// `T<tick> [HH:MM]`, or a fixed placeholder when the entry has no timestamp.
pub fn format_log_timestamp(tick: i64, timestamp: Option<DateTime<Utc>>) -> String {
    match known_timestamp(timestamp) {
        Some(ts) => format!("T{tick} [{}]", ts.with_timezone(&Local).format("%H:%M")),
        None => TIMESTAMP_PLACEHOLDER.to_string(),
    }
}

/// `[HH:MM]` for compact rows.
pub fn format_short_time(timestamp: Option<DateTime<Utc>>) -> String {
    match known_timestamp(timestamp) {
        Some(ts) => format!("[{}]", ts.with_timezone(&Local).format("%H:%M")),
        None => "[--:--]".to_string(),
    }
}

/// `name(key: value, ...)` with keys sorted and nested values elided.
pub fn tool_call_summary(call: &ToolCallRecord) -> String {
    format!("{}({})", call.name, format_tool_args(&call.arguments))
}

pub fn format_tool_args(arguments: &str) -> String {
    let trimmed = arguments.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => map
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(key, value)| format!("{key}: {}", literal_arg(value)))
            .join(", "),
        Ok(value) => literal_arg(&value),
        Err(_) => trimmed.to_string(),
    }
}

fn literal_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Object(_) | Value::Array(_) => "…".to_string(),
    }
}

/// Render one log entry into lines exactly `width` columns wide.
pub fn render_log_entry(
    entry: &LogEntry,
    width: usize,
    verbose: bool,
    tick: i64,
    theme: &Theme,
) -> Vec<Line<'static>> {
    if width == 0 {
        return Vec::new();
    }
    let content_width = width.saturating_sub(LOG_INDENT).max(1);
    let timestamp = format_log_timestamp(tick, entry.timestamp);
    let prefix = role_prefix(entry.role, entry.source, entry.sender_name.as_deref());
    let style = role_style(theme, entry.role, entry.source);

    let mut lines: Vec<Line<'static>> = vec![Line::from("")];
    lines.push(header_line(&timestamp, &prefix, style, width, theme));

    let content = match classify(entry) {
        ContentShape::ToolCallBatch(decoded) => {
            tool_call_lines(decoded, content_width, verbose, theme)
        }
        ContentShape::StructuredValue(value) => {
            render_value_tree(&value, &theme.glyphs, verbose, content_width)
                .iter()
                .map(|line| line.to_line(theme))
                .collect()
        }
        ContentShape::PlainText(text) => plain_lines(&text, content_width, entry.role, theme),
    };
    lines.extend(content.into_iter().map(indent));

    if let Some(reasoning) = entry
        .reasoning
        .as_deref()
        .filter(|text| !text.trim().is_empty())
    {
        lines.push(header_line(
            &timestamp,
            "REASONING:",
            theme.reasoning,
            width,
            theme,
        ));
        lines.extend(
            reasoning_lines(reasoning, content_width, verbose, theme)
                .into_iter()
                .map(indent),
        );
    }

    lines.into_iter().map(|line| fit_line(line, width)).collect()
}

fn indent(line: Line<'static>) -> Line<'static> {
    let mut spans = Vec::with_capacity(line.spans.len() + 1);
    spans.push(Span::raw(" ".repeat(LOG_INDENT)));
    spans.extend(line.spans);
    Line::from(spans).style(line.style)
}

fn header_line(
    timestamp: &str,
    label: &str,
    label_style: Style,
    width: usize,
    theme: &Theme,
) -> Line<'static> {
    let head = format!("{timestamp} {label} ");
    let fill = width.saturating_sub(display_width(&head));
    Line::from(vec![
        Span::styled(format!("{timestamp} "), theme.dim),
        Span::styled(label.to_string(), label_style),
        Span::raw(" "),
        Span::styled(theme.glyphs.rule.repeat(fill), theme.dim),
    ])
}

fn plain_lines(text: &str, width: usize, role: MemoryRole, theme: &Theme) -> Vec<Line<'static>> {
    let base = match role {
        MemoryRole::System => theme.dim,
        _ => Style::default(),
    };
    let wrapped = wrap(text, width);
    if wrapped.is_empty() {
        return vec![Line::from("")];
    }
    wrapped
        .iter()
        .map(|line| ansi_escape_line(line).patch_style(base))
        .collect()
}

fn warning_line(message: &str, width: usize, theme: &Theme) -> Line<'static> {
    let text = format!("{} {}", theme.glyphs.warning, strip_ansi(message));
    Line::from(truncate_with_ellipsis(&text, width).into_owned()).style(theme.warning)
}

fn tool_call_lines(
    decoded: Result<Vec<ToolCallRecord>, ToolCallDecodeError>,
    width: usize,
    verbose: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let calls = match decoded {
        Ok(calls) => calls,
        Err(ToolCallDecodeError::EmptyPayload) => {
            return vec![warning_line("empty tool call payload", width, theme)];
        }
        Err(err) => {
            tracing::debug!("rendering malformed tool call payload: {err}");
            return vec![warning_line(&err.to_string(), width, theme)];
        }
    };

    let bullet = theme.glyphs.bullet;
    let mut lines = Vec::new();
    for call in &calls {
        if !verbose {
            let summary = tool_call_summary(call);
            let summary = strip_ansi(&summary);
            let text = truncate_with_ellipsis(&summary, width.saturating_sub(2).max(1));
            lines.push(Line::from(vec![
                Span::styled(format!("{bullet} "), theme.role_tool),
                Span::raw(text.into_owned()),
            ]));
            continue;
        }

        lines.push(Line::from(vec![
            Span::styled(format!("{bullet} "), theme.role_tool),
            Span::styled(call.name.clone(), theme.role_tool),
        ]));
        let tree_width = width.saturating_sub(TOOL_ARGS_INDENT.len()).max(1);
        match render_json_tree(call.arguments.trim(), &theme.glyphs, true, tree_width) {
            Ok(tree) => lines.extend(tree.iter().map(|line| {
                let mut spans = vec![Span::raw(TOOL_ARGS_INDENT)];
                spans.extend(line.to_line(theme).spans);
                Line::from(spans)
            })),
            Err(_) if call.arguments.trim().is_empty() => {}
            Err(_) => lines.extend(
                wrap(call.arguments.trim(), tree_width)
                    .into_iter()
                    .map(|line| Line::from(format!("{TOOL_ARGS_INDENT}{}", strip_ansi(&line)))),
            ),
        }
    }
    lines
}

fn reasoning_lines(
    reasoning: &str,
    width: usize,
    verbose: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let wrapped = wrap(reasoning, width);
    let styled = |text: &str| ansi_escape_line(text).patch_style(theme.reasoning);
    if verbose || wrapped.len() <= REASONING_MAX_LINES {
        return wrapped.iter().map(|line| styled(line)).collect();
    }
    let elided = wrapped.len() - 1 - REASONING_TAIL_LINES;
    let mut lines = vec![styled(&wrapped[0])];
    lines.push(Line::from(format!("[{elided} more]")).style(theme.dim));
    lines.extend(
        wrapped[wrapped.len() - REASONING_TAIL_LINES..]
            .iter()
            .map(|line| styled(line)),
    );
    lines
}

/// A stored memory rendered as a log block.
#[derive(Debug)]
pub struct LogEntryCell<'a> {
    entry: &'a LogEntry,
    verbose: bool,
    tick: i64,
    theme: &'a Theme,
}

impl<'a> LogEntryCell<'a> {
    pub fn new(entry: &'a LogEntry, verbose: bool, tick: i64, theme: &'a Theme) -> Self {
        Self {
            entry,
            verbose,
            tick,
            theme,
        }
    }
}

impl HistoryCell for LogEntryCell<'_> {
    fn display_lines(&self, width: u16) -> Vec<Line<'static>> {
        render_log_entry(
            self.entry,
            usize::from(width),
            self.verbose,
            self.tick,
            self.theme,
        )
    }
}

/// A single dimmed, centered notice such as "No conversation history".
#[derive(Debug)]
pub struct NoticeCell<'a> {
    message: String,
    theme: &'a Theme,
}

impl<'a> NoticeCell<'a> {
    pub fn new(message: impl Into<String>, theme: &'a Theme) -> Self {
        Self {
            message: message.into(),
            theme,
        }
    }
}

impl HistoryCell for NoticeCell<'_> {
    fn display_lines(&self, width: u16) -> Vec<Line<'static>> {
        let width = usize::from(width);
        if width == 0 {
            return Vec::new();
        }
        let text = truncate_with_ellipsis(&self.message, width);
        let left = (width - display_width(&text)) / 2;
        let line = Line::from(vec![
            Span::raw(" ".repeat(left)),
            Span::styled(text.into_owned(), self.theme.dim),
        ]);
        vec![Line::from(""), fit_line(line, width)]
    }
}

/// Render every entry in order, newest last.
pub fn render_log(
    entries: &[LogEntry],
    width: u16,
    verbose: bool,
    tick: i64,
    theme: &Theme,
) -> Vec<Line<'static>> {
    if entries.is_empty() {
        return NoticeCell::new("No conversation history yet", theme).display_lines(width);
    }
    entries
        .iter()
        .flat_map(|entry| LogEntryCell::new(entry, verbose, tick, theme).display_lines(width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_formatting::line_to_plain;
    use pretty_assertions::assert_eq;

    fn entry(role: MemoryRole, source: MemorySource, content: &str) -> LogEntry {
        LogEntry::from(MemoryRecord::new(role, source, content))
    }

    fn plain(lines: &[Line<'static>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line_to_plain(line).trim_end().to_string())
            .collect()
    }

    #[test]
    fn role_prefixes_follow_source() {
        assert_eq!(
            role_prefix(MemoryRole::System, MemorySource::System, None),
            "SYS:"
        );
        assert_eq!(
            role_prefix(MemoryRole::User, MemorySource::BroadcastSelf, None),
            "YOU (BROADCAST):"
        );
        assert_eq!(
            role_prefix(MemoryRole::User, MemorySource::Broadcast, Some("nova")),
            "SWARM (nova):"
        );
        assert_eq!(
            role_prefix(MemoryRole::User, MemorySource::Broadcast, None),
            "SWARM:"
        );
        assert_eq!(
            role_prefix(MemoryRole::User, MemorySource::Direct, None),
            "YOU:"
        );
        assert_eq!(
            role_prefix(MemoryRole::Assistant, MemorySource::Llm, None),
            "AI:"
        );
        assert_eq!(
            role_prefix(MemoryRole::Tool, MemorySource::Tool, None),
            "TOOL:"
        );
        assert_eq!(
            role_prefix(MemoryRole::Unknown, MemorySource::System, None),
            "???:"
        );
    }

    #[test]
    fn every_line_is_exactly_the_requested_width() {
        let theme = Theme::new();
        let mut long = entry(
            MemoryRole::Assistant,
            MemorySource::Llm,
            "A fairly long reply that will need wrapping 日本語 across lines",
        );
        long.reasoning = Some("one two three four five six seven eight nine ten".to_string());
        let entries = [
            long,
            entry(
                MemoryRole::Tool,
                MemorySource::Tool,
                r#"call_7:{"cargo":[1,2,3,4,5,6,7,8],"ship":{"name":"Zoea"}}"#,
            ),
            entry(
                MemoryRole::Assistant,
                MemorySource::Llm,
                r#"[TOOL_CALLS]call_1:travel:{"to":"a very distant system"}"#,
            ),
        ];
        for width in [1usize, 2, 10, 40, 80] {
            for e in &entries {
                for verbose in [false, true] {
                    for line in render_log_entry(e, width, verbose, 12, &theme) {
                        assert_eq!(line.width(), width, "{:?}", line_to_plain(&line));
                    }
                }
            }
        }
    }

    #[test]
    fn block_layout_has_spacer_header_and_content() {
        let theme = Theme::new();
        let lines = render_log_entry(
            &entry(MemoryRole::User, MemorySource::Direct, "Hello World"),
            30,
            false,
            5,
            &theme,
        );
        let text = plain(&lines);
        assert_eq!(text[0], "");
        assert_eq!(text[1], format!("T0 [--:--] YOU: {}", "─".repeat(14)));
        assert_eq!(text[2], "  Hello World");
        assert_eq!(text.len(), 3);
    }

    #[test]
    fn empty_tool_args_render_as_empty_parens() {
        let theme = Theme::new();
        let lines = render_log_entry(
            &entry(
                MemoryRole::Assistant,
                MemorySource::Llm,
                "[TOOL_CALLS]call_1:get_ship:{}",
            ),
            40,
            false,
            0,
            &theme,
        );
        assert_eq!(plain(&lines[2..]), vec!["  • get_ship()"]);
    }

    #[test]
    fn tool_args_are_sorted_and_nested_values_elided() {
        let call = ToolCallRecord::new(
            "call_2",
            "travel",
            r#"{"speed": 3, "dest": "sol", "route": {"via": "x"}, "ok": true}"#,
        );
        assert_eq!(
            tool_call_summary(&call),
            "travel(dest: sol, ok: true, route: …, speed: 3)"
        );
    }

    #[test]
    fn verbose_tool_calls_render_argument_tree() {
        let theme = Theme::new();
        let lines = render_log_entry(
            &entry(
                MemoryRole::Assistant,
                MemorySource::Llm,
                r#"[TOOL_CALLS]call_1:travel:{"to":"sol","fast":true}"#,
            ),
            40,
            true,
            0,
            &theme,
        );
        assert_eq!(
            plain(&lines[2..]),
            vec![
                "  • travel",
                "    ├─ \"fast\": true",
                "    └─ \"to\": \"sol\"",
            ]
        );
    }

    #[test]
    fn malformed_tool_payloads_degrade_to_warnings() {
        let theme = Theme::new();
        let empty = render_log_entry(
            &entry(MemoryRole::Assistant, MemorySource::Llm, "[TOOL_CALLS]"),
            40,
            false,
            0,
            &theme,
        );
        assert_eq!(plain(&empty[2..]), vec!["  ⚠ empty tool call payload"]);

        let invalid = render_log_entry(
            &entry(MemoryRole::Assistant, MemorySource::Llm, "[TOOL_CALLS]x|y"),
            60,
            false,
            0,
            &theme,
        );
        assert_eq!(
            plain(&invalid[2..]),
            vec!["  ⚠ no valid tool calls (2 malformed)"]
        );
    }

    #[test]
    fn tool_results_render_as_tree_or_fall_back_to_text() {
        let theme = Theme::new();
        let tree = render_log_entry(
            &entry(MemoryRole::Tool, MemorySource::Tool, r#"call_9:{"hull": 90}"#),
            40,
            false,
            0,
            &theme,
        );
        assert_eq!(plain(&tree[2..]), vec!["  └─ \"hull\": 90"]);

        let broken = render_log_entry(
            &entry(MemoryRole::Tool, MemorySource::Tool, "call_9:{hull: 90}"),
            40,
            false,
            0,
            &theme,
        );
        assert_eq!(plain(&broken[2..]), vec!["  {hull: 90}"]);
    }

    #[test]
    fn classify_prefers_tool_calls_then_json_then_text() {
        assert!(matches!(
            classify(&entry(
                MemoryRole::Assistant,
                MemorySource::Llm,
                "[TOOL_CALLS]call_1:a:{}"
            )),
            ContentShape::ToolCallBatch(Ok(_))
        ));
        assert!(matches!(
            classify(&entry(MemoryRole::Tool, MemorySource::Tool, "[1,2]")),
            ContentShape::StructuredValue(_)
        ));
        assert!(matches!(
            classify(&entry(MemoryRole::User, MemorySource::Direct, "{\"a\":1}")),
            ContentShape::PlainText(_)
        ));
    }

    #[test]
    fn long_reasoning_is_elided_unless_verbose() {
        let theme = Theme::new();
        let mut e = entry(MemoryRole::Assistant, MemorySource::Llm, "ok");
        e.reasoning = Some("r1\nr2\nr3\nr4\nr5\nr6".to_string());

        let compact = plain(&render_log_entry(&e, 30, false, 0, &theme));
        let reasoning_at = compact
            .iter()
            .position(|line| line.contains("REASONING:"))
            .unwrap_or_else(|| panic!("missing reasoning header in {compact:?}"));
        assert_eq!(
            compact[reasoning_at + 1..].to_vec(),
            vec!["  r1", "  [3 more]", "  r5", "  r6"]
        );

        let verbose = plain(&render_log_entry(&e, 30, true, 0, &theme));
        assert_eq!(verbose.len(), reasoning_at + 1 + 6);
    }

    #[test]
    fn short_reasoning_is_shown_in_full() {
        let theme = Theme::new();
        let mut e = entry(MemoryRole::Assistant, MemorySource::Llm, "ok");
        e.reasoning = Some("a\nb\nc".to_string());
        let lines = plain(&render_log_entry(&e, 30, false, 0, &theme));
        assert_eq!(lines[lines.len() - 3..].to_vec(), vec!["  a", "  b", "  c"]);
    }

    #[test]
    fn ansi_sequences_never_reach_the_screen_as_text() {
        let theme = Theme::new();
        let mut e = entry(
            MemoryRole::Assistant,
            MemorySource::Llm,
            r#"[TOOL_CALLS]call_1:scan:{"target":"\u001b[1mbold\u001b[0m"}"#,
        );
        e.reasoning = Some("\x1b[31mhot\x1b[0m reasoning".to_string());

        let lines = render_log_entry(&e, 40, false, 0, &theme);
        let text = plain(&lines);
        assert!(text.contains(&"  hot reasoning".to_string()), "{text:?}");
        assert!(text.contains(&"  • scan(target: bold)".to_string()), "{text:?}");
        for line in &text {
            assert!(!line.contains("[31m") && !line.contains("[0m"), "{line}");
            assert!(!line.contains('\x1b'), "{line:?}");
        }
        for line in &lines {
            assert_eq!(line.width(), 40);
        }
    }

    #[test]
    fn epoch_timestamps_render_as_placeholder() {
        assert_eq!(
            format_log_timestamp(12, DateTime::<Utc>::from_timestamp(0, 0)),
            TIMESTAMP_PLACEHOLDER
        );
        assert_eq!(format_log_timestamp(12, None), TIMESTAMP_PLACEHOLDER);
        assert_eq!(
            format_short_time(DateTime::<Utc>::from_timestamp(0, 0)),
            "[--:--]"
        );
        let real = DateTime::<Utc>::from_timestamp(1_700_000_000, 0);
        assert!(format_log_timestamp(12, real).starts_with("T12 ["));
    }

    #[test]
    fn long_json_keys_keep_a_visible_value() {
        let theme = Theme::new();
        let content = format!(r#"call_1:{{"{}": 12345}}"#, "k".repeat(60));
        let lines = render_log_entry(
            &entry(MemoryRole::Tool, MemorySource::Tool, &content),
            40,
            false,
            0,
            &theme,
        );
        let body = plain(&lines[2..]);
        assert_eq!(body.len(), 1);
        assert!(body[0].ends_with('…'), "{body:?}");
        assert_eq!(lines[2].width(), 40);
    }

    #[test]
    fn call_id_prefix_is_only_stripped_when_well_formed() {
        assert_eq!(strip_call_id_prefix("call_abc:{}"), "{}");
        assert_eq!(strip_call_id_prefix("call me maybe: later"), "call me maybe: later");
        assert_eq!(strip_call_id_prefix("plain"), "plain");
    }

    #[test]
    fn empty_log_shows_notice() {
        let theme = Theme::new();
        let lines = render_log(&[], 40, false, 0, &theme);
        assert!(plain(&lines).iter().any(|l| l.contains("No conversation history yet")));
        for line in &lines[1..] {
            assert_eq!(line.width(), 40);
        }
    }
}
