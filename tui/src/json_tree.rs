//! Render decoded JSON values as a box-drawing tree.
//!
//! Object keys are always emitted in lexicographic order so the same value renders the same way
//! regardless of how the producer ordered its fields. Long arrays are windowed unless `verbose`
//! is set.
//!
//! The rendered text always starts with a connector glyph or the `(empty)` marker, so feeding it
//! back into a JSON parser fails.

use ratatui::text::Line;
use ratatui::text::Span;
use serde_json::Value;

use crate::text_formatting::display_width;
use crate::text_formatting::truncate_with_ellipsis;
use crate::theme::Glyphs;
use crate::theme::Theme;

/// Arrays longer than this are elided in non-verbose mode.
pub const ARRAY_ELISION_THRESHOLD: usize = 6;
pub const ARRAY_HEAD: usize = 3;
pub const ARRAY_TAIL: usize = 3;
pub const EMPTY_MARKER: &str = "(empty)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Number,
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeLineKind {
    Scalar(ScalarKind),
    /// A key whose nested children follow on the next lines.
    Branch,
    Empty,
    Elided(usize),
}

/// One annotated line of tree output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub prefix: String,
    pub label: Option<String>,
    pub value: Option<String>,
    pub kind: TreeLineKind,
}

impl TreeLine {
    #[cfg(test)]
    pub(crate) fn plain(&self) -> String {
        let mut out = self.prefix.clone();
        if let Some(label) = &self.label {
            out.push_str(label);
            if self.value.is_some() {
                out.push(' ');
            }
        }
        if let Some(value) = &self.value {
            out.push_str(value);
        }
        out
    }

    pub fn to_line(&self, theme: &Theme) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::with_capacity(4);
        if !self.prefix.is_empty() {
            spans.push(Span::styled(self.prefix.clone(), theme.dim));
        }
        if let Some(label) = &self.label {
            spans.push(Span::styled(label.clone(), theme.json_key));
            if self.value.is_some() {
                spans.push(Span::raw(" "));
            }
        }
        if let Some(value) = &self.value {
            let style = match self.kind {
                TreeLineKind::Scalar(ScalarKind::String) => theme.json_string,
                TreeLineKind::Scalar(ScalarKind::Number) => theme.json_number,
                TreeLineKind::Scalar(ScalarKind::Literal) => theme.json_literal,
                TreeLineKind::Branch | TreeLineKind::Empty | TreeLineKind::Elided(_) => theme.dim,
            };
            spans.push(Span::styled(value.clone(), style));
        }
        Line::from(spans)
    }
}

/// Parse `input` and render it as tree lines no wider than `max_width` where possible.
pub fn render_json_tree(
    input: &str,
    glyphs: &Glyphs,
    verbose: bool,
    max_width: usize,
) -> Result<Vec<TreeLine>, serde_json::Error> {
    let value: Value = serde_json::from_str(input)?;
    Ok(render_value_tree(&value, glyphs, verbose, max_width))
}

pub fn render_value_tree(
    value: &Value,
    glyphs: &Glyphs,
    verbose: bool,
    max_width: usize,
) -> Vec<TreeLine> {
    let renderer = TreeRenderer {
        verbose,
        max_width,
        glyphs,
    };
    let mut out = Vec::new();
    match value {
        Value::Object(map) if map.is_empty() => out.push(empty_line(String::new(), None)),
        Value::Array(items) if items.is_empty() => out.push(empty_line(String::new(), None)),
        Value::Object(_) | Value::Array(_) => renderer.render_children(value, "", &mut out),
        scalar => {
            let prefix = renderer.glyphs.last_branch.to_string();
            out.push(renderer.scalar_line(prefix, None, scalar));
        }
    }
    out
}

/// Join tree lines into plain multi-line text.
#[cfg(test)]
pub(crate) fn tree_text(lines: &[TreeLine]) -> String {
    lines
        .iter()
        .map(TreeLine::plain)
        .collect::<Vec<_>>()
        .join("\n")
}

enum Child<'a> {
    Entry(String, &'a Value),
    Elided(usize),
}

struct TreeRenderer<'g> {
    verbose: bool,
    max_width: usize,
    glyphs: &'g Glyphs,
}

impl TreeRenderer<'_> {
    fn children<'a>(&self, value: &'a Value) -> Vec<Child<'a>> {
        match value {
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by_key(|(key, _)| *key);
                entries
                    .into_iter()
                    .map(|(key, value)| Child::Entry(object_label(key), value))
                    .collect()
            }
            Value::Array(items) => {
                let len = items.len();
                let indexed = |idx: usize| Child::Entry(format!("[{idx}]:"), &items[idx]);
                if self.verbose || len <= ARRAY_ELISION_THRESHOLD {
                    return (0..len).map(indexed).collect();
                }
                let mut children: Vec<Child<'a>> = (0..ARRAY_HEAD).map(indexed).collect();
                children.push(Child::Elided(len - ARRAY_HEAD - ARRAY_TAIL));
                children.extend((len - ARRAY_TAIL..len).map(indexed));
                children
            }
            _ => Vec::new(),
        }
    }

    fn render_children(&self, value: &Value, parent_prefix: &str, out: &mut Vec<TreeLine>) {
        let children = self.children(value);
        let count = children.len();
        for (idx, child) in children.into_iter().enumerate() {
            let is_last = idx + 1 == count;
            let connector = if is_last {
                self.glyphs.last_branch
            } else {
                self.glyphs.branch
            };
            let prefix = format!("{parent_prefix}{connector}");
            match child {
                Child::Elided(count) => out.push(TreeLine {
                    prefix,
                    label: None,
                    value: Some(format!("[{count} more]")),
                    kind: TreeLineKind::Elided(count),
                }),
                Child::Entry(label, value) => match value {
                    Value::Object(map) if map.is_empty() => {
                        let label = self.bounded_label(&prefix, &label, 1);
                        out.push(empty_line(prefix, Some(label)));
                    }
                    Value::Array(items) if items.is_empty() => {
                        let label = self.bounded_label(&prefix, &label, 1);
                        out.push(empty_line(prefix, Some(label)));
                    }
                    Value::Object(_) | Value::Array(_) => {
                        let label = self.bounded_label(&prefix, &label, 0);
                        out.push(TreeLine {
                            prefix,
                            label: Some(label),
                            value: None,
                            kind: TreeLineKind::Branch,
                        });
                        let continuation = if is_last {
                            self.glyphs.blank
                        } else {
                            self.glyphs.vertical
                        };
                        let child_prefix = format!("{parent_prefix}{continuation}");
                        self.render_children(value, &child_prefix, out);
                    }
                    scalar => out.push(self.scalar_line(prefix, Some(label), scalar)),
                },
            }
        }
    }

    /// Cap `label` so that `reserve` columns (plus the separating space) still fit after it.
    fn bounded_label(&self, prefix: &str, label: &str, reserve: usize) -> String {
        let separator = usize::from(reserve > 0);
        let room = self
            .max_width
            .saturating_sub(display_width(prefix) + reserve + separator)
            .max(1);
        truncate_with_ellipsis(label, room).into_owned()
    }

    fn scalar_line(&self, prefix: String, label: Option<String>, value: &Value) -> TreeLine {
        let (text, kind) = scalar_text(value);
        let label = label.map(|label| self.bounded_label(&prefix, &label, 1));
        let used = display_width(&prefix)
            + label
                .as_deref()
                .map(|label| display_width(label) + 1)
                .unwrap_or(0);
        // Always leave room for at least the ellipsis so the value is never dropped entirely.
        let available = self.max_width.saturating_sub(used).max(1);
        TreeLine {
            prefix,
            label,
            value: Some(truncate_with_ellipsis(&text, available).into_owned()),
            kind: TreeLineKind::Scalar(kind),
        }
    }
}

fn empty_line(prefix: String, label: Option<String>) -> TreeLine {
    TreeLine {
        prefix,
        label,
        value: Some(EMPTY_MARKER.to_string()),
        kind: TreeLineKind::Empty,
    }
}

fn object_label(key: &str) -> String {
    let quoted = serde_json::to_string(key).unwrap_or_else(|_| format!("\"{key}\""));
    format!("{quoted}:")
}

fn scalar_text(value: &Value) -> (String, ScalarKind) {
    match value {
        Value::String(s) => (
            serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\"")),
            ScalarKind::String,
        ),
        Value::Number(n) => (n.to_string(), ScalarKind::Number),
        Value::Bool(b) => (b.to_string(), ScalarKind::Literal),
        Value::Null => ("null".to_string(), ScalarKind::Literal),
        Value::Object(_) | Value::Array(_) => (value.to_string(), ScalarKind::Literal),
    }
}
