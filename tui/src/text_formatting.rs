//! Display-width aware text helpers.
//!
//! Every measurement here is in terminal columns: wide glyphs count as two, combining marks and
//! ANSI styling sequences count as zero. Byte and char lengths are never used for layout.

use std::borrow::Cow;

use ratatui::text::Line;
use ratatui::text::Span;
use textwrap::WordSeparator;
use textwrap::WrapAlgorithm;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub const ELLIPSIS: &str = "…";
const TAB_SPACES: &str = "    ";

/// Terminal columns needed to show `text`.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(text).as_ref())
}

/// Longest prefix of `text` that fits in `max_width` columns.
///
/// Cuts only between grapheme clusters, so a wide or multi-byte glyph is either kept whole or
/// dropped. ANSI sequences inside the kept prefix are preserved.
pub fn truncate(text: &str, max_width: usize) -> &str {
    if max_width == 0 {
        return "";
    }
    let mut used = 0usize;
    let mut end = 0usize;
    for token in tokens(text) {
        match token {
            Token::Escape(seq) => end += seq.len(),
            Token::Grapheme(g) => {
                let w = UnicodeWidthStr::width(g);
                if used + w > max_width {
                    break;
                }
                used += w;
                end += g.len();
            }
        }
    }
    &text[..end]
}

/// Like [`truncate`] but marks the cut with a trailing ellipsis.
///
/// Never returns an empty string for non-empty input while `max_width > 0`.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(text) <= max_width {
        return Cow::Borrowed(text);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }
    let kept = truncate(text, max_width - 1);
    Cow::Owned(format!("{kept}{ELLIPSIS}"))
}

/// Right-pad `text` with spaces to at least `width` columns.
pub fn pad(text: &str, width: usize) -> String {
    let current = display_width(text);
    if current >= width {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + width - current);
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', width - current));
    out
}

/// Word-wrap `text` so no line is wider than `max_width` columns.
///
/// Explicit newlines split paragraphs first and blank lines are kept. Words are packed greedily;
/// a word wider than `max_width` is hard-split into `max_width`-wide chunks.
pub fn wrap(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return Vec::new();
    }
    let sanitized = sanitize(text);
    let options = textwrap::Options::new(max_width)
        .wrap_algorithm(WrapAlgorithm::FirstFit)
        .word_separator(WordSeparator::AsciiSpace)
        .break_words(true);

    let mut lines = Vec::new();
    for paragraph in sanitized.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        for line in textwrap::wrap(paragraph, &options) {
            hard_split_into(line.trim_end(), max_width, &mut lines);
        }
    }
    lines
}

fn hard_split_into(line: &str, max_width: usize, out: &mut Vec<String>) {
    if display_width(line) <= max_width {
        out.push(line.to_string());
        return;
    }
    let mut current = String::new();
    let mut used = 0usize;
    for token in tokens(line) {
        match token {
            Token::Escape(seq) => current.push_str(seq),
            Token::Grapheme(g) => {
                let (g, w) = match UnicodeWidthStr::width(g) {
                    // A glyph wider than the whole line can never fit; show a marker instead.
                    w if w > max_width => (ELLIPSIS, 1),
                    w => (g, w),
                };
                if used + w > max_width {
                    out.push(std::mem::take(&mut current));
                    used = 0;
                }
                current.push_str(g);
                used += w;
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
}

/// Replace tabs, drop carriage returns and other control characters (ESC is kept for ANSI).
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if !text
        .chars()
        .any(|ch| ch.is_control() && ch != '\n' && ch != '\x1b')
    {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' => out.push_str(TAB_SPACES),
            '\n' | '\x1b' => out.push(ch),
            ch if ch.is_control() => {}
            ch => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Collapse all whitespace runs (including newlines) into single spaces.
pub fn flatten_whitespace(text: &str) -> String {
    let stripped = strip_ansi(text);
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    if !text.contains('\x1b') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for token in tokens(text) {
        if let Token::Grapheme(g) = token {
            out.push_str(g);
        }
    }
    Cow::Owned(out)
}

/// Fit a styled line to exactly `width` columns, truncating spans and padding with spaces.
pub fn fit_line(line: Line<'static>, width: usize) -> Line<'static> {
    let Line {
        spans,
        style,
        alignment,
    } = line;
    let mut out: Vec<Span<'static>> = Vec::with_capacity(spans.len() + 1);
    let mut remaining = width;
    for span in spans {
        if remaining == 0 {
            break;
        }
        let span_width = span.width();
        if span_width <= remaining {
            remaining -= span_width;
            out.push(span);
            continue;
        }
        let kept = truncate(span.content.as_ref(), remaining).to_string();
        remaining -= UnicodeWidthStr::width(kept.as_str());
        out.push(Span::styled(kept, span.style));
        break;
    }
    if remaining > 0 {
        out.push(Span::raw(" ".repeat(remaining)));
    }
    Line {
        spans: out,
        style,
        alignment,
    }
}

/// Plain text of a styled line.
#[cfg(test)]
pub(crate) fn line_to_plain(line: &Line<'_>) -> String {
    line.spans
        .iter()
        .map(|span| span.content.as_ref())
        .collect::<String>()
}

enum Token<'a> {
    Escape(&'a str),
    Grapheme(&'a str),
}

fn tokens(text: &str) -> impl Iterator<Item = Token<'_>> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        if rest.starts_with('\x1b') {
            let len = escape_len(rest);
            let (seq, tail) = rest.split_at(len);
            rest = tail;
            return Some(Token::Escape(seq));
        }
        let next_escape = rest.find('\x1b').unwrap_or(rest.len());
        let g = rest[..next_escape]
            .graphemes(true)
            .next()
            .unwrap_or(&rest[..next_escape]);
        rest = &rest[g.len()..];
        Some(Token::Grapheme(g))
    })
}

/// Byte length of the escape sequence at the start of `text` (which starts with ESC).
fn escape_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    match bytes.get(1) {
        // CSI: ESC [ params final-byte
        Some(b'[') => bytes[2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map(|pos| pos + 3)
            .unwrap_or(bytes.len()),
        // OSC: ESC ] ... BEL | ESC \
        Some(b']') => {
            let mut idx = 2;
            while idx < bytes.len() {
                if bytes[idx] == 0x07 {
                    return idx + 1;
                }
                if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
                    return idx + 2;
                }
                idx += 1;
            }
            bytes.len()
        }
        Some(b) if b.is_ascii() => 2,
        _ => 1,
    }
}
