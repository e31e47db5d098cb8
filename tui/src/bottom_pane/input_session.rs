//! Single-line text input used by every modal prompt on the dashboard.
//!
//! An [`InputSession`] is created when a mode-entering key is pressed and dropped on submit,
//! cancel, or completion. The owning model holds at most one at a time.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::word_boundary::beginning_of_previous_word;
use super::word_boundary::end_of_next_word;
use crate::text_formatting::flatten_whitespace;

/// What the text being typed is for. Later stages carry the values collected earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Broadcast,
    Message { target: String, target_name: String },
    NewAgentName,
    NewAgentProvider { name: String },
    ConfigProvider { target: String, target_name: String },
    ConfigModel {
        target: String,
        target_name: String,
        provider: String,
    },
}

impl InputMode {
    /// Prompt label shown in front of the buffer.
    pub fn prompt(&self) -> String {
        match self {
            InputMode::Broadcast => "Broadcast: ".to_string(),
            InputMode::Message { target_name, .. } => format!("Message {target_name}: "),
            InputMode::NewAgentName => "New mysis name: ".to_string(),
            InputMode::NewAgentProvider { name } => format!("Provider for {name}: "),
            InputMode::ConfigProvider { target_name, .. } => {
                format!("Provider for {target_name}: ")
            }
            InputMode::ConfigModel {
                target_name,
                provider,
                ..
            } => format!("Model for {target_name} ({provider}): "),
        }
    }

    /// Modes whose submissions are recorded in, and recalled from, input history.
    pub fn uses_history(&self) -> bool {
        matches!(self, InputMode::Broadcast | InputMode::Message { .. })
    }

    /// Agent the input is aimed at, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            InputMode::Message { target, .. }
            | InputMode::ConfigProvider { target, .. }
            | InputMode::ConfigModel { target, .. } => Some(target),
            InputMode::Broadcast | InputMode::NewAgentName | InputMode::NewAgentProvider { .. } => {
                None
            }
        }
    }
}

/// The text buffer plus cursor for one prompt. The cursor is a byte offset that always sits on a
/// grapheme boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSession {
    pub mode: InputMode,
    buffer: String,
    cursor: usize,
    /// Dimmed hint shown while the buffer is empty, e.g. the default provider.
    placeholder: Option<String>,
}

impl InputSession {
    pub fn new(mode: InputMode) -> Self {
        Self {
            mode,
            buffer: String::new(),
            cursor: 0,
            placeholder: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display columns between the start of the buffer and the cursor.
    pub fn cursor_column(&self) -> usize {
        UnicodeWidthStr::width(&self.buffer[..self.cursor])
    }

    /// Replace the whole buffer, leaving the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = single_line(text);
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn insert_str(&mut self, text: &str) {
        let text = single_line(text);
        self.buffer.insert_str(self.cursor, &text);
        self.cursor += text.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        let start = self.previous_boundary();
        self.buffer.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn delete_forward(&mut self) {
        let end = self.next_boundary();
        self.buffer.replace_range(self.cursor..end, "");
    }

    pub fn move_left(&mut self) {
        self.cursor = self.previous_boundary();
    }

    pub fn move_right(&mut self) {
        self.cursor = self.next_boundary();
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    pub fn move_word_left(&mut self) {
        self.cursor = beginning_of_previous_word(&self.buffer, self.cursor);
    }

    pub fn move_word_right(&mut self) {
        self.cursor = end_of_next_word(&self.buffer, self.cursor);
    }

    /// Ctrl+U: delete everything before the cursor.
    pub fn kill_to_start(&mut self) {
        self.buffer.replace_range(..self.cursor, "");
        self.cursor = 0;
    }

    /// Ctrl+W / Alt+Backspace.
    pub fn delete_previous_word(&mut self) {
        let start = beginning_of_previous_word(&self.buffer, self.cursor);
        self.buffer.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    /// Apply an editing key. Returns `false` for keys that are not editing keys, leaving them to
    /// the caller (Enter, Esc, Up, Down, ...).
    pub fn handle_edit_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('a') if ctrl => self.move_home(),
            KeyCode::Char('e') if ctrl => self.move_end(),
            KeyCode::Char('u') if ctrl => self.kill_to_start(),
            KeyCode::Char('w') if ctrl => self.delete_previous_word(),
            KeyCode::Char('b') if alt => self.move_word_left(),
            KeyCode::Char('f') if alt => self.move_word_right(),
            KeyCode::Char(_) if ctrl => return false,
            KeyCode::Char(ch) => self.insert_char(ch),
            KeyCode::Backspace if alt || ctrl => self.delete_previous_word(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left if alt || ctrl => self.move_word_left(),
            KeyCode::Right if alt || ctrl => self.move_word_right(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }

    fn previous_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .graphemes(true)
            .next()
            .map(|g| self.cursor + g.len())
            .unwrap_or(self.buffer.len())
    }
}

fn single_line(text: &str) -> String {
    if text.contains(['\n', '\r', '\t']) {
        flatten_whitespace(text)
    } else {
        text.chars().filter(|ch| !ch.is_control()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn typed(text: &str) -> InputSession {
        let mut session = InputSession::new(InputMode::Broadcast);
        session.insert_str(text);
        session
    }

    #[test]
    fn typing_and_cursor_movement() {
        let mut session = InputSession::new(InputMode::Broadcast);
        for ch in "helo".chars() {
            assert!(session.handle_edit_key(key(KeyCode::Char(ch))));
        }
        session.handle_edit_key(key(KeyCode::Left));
        session.handle_edit_key(key(KeyCode::Char('l')));
        assert_eq!(session.text(), "hello");
        assert_eq!(session.cursor(), 4);

        session.handle_edit_key(ctrl('a'));
        session.handle_edit_key(key(KeyCode::Delete));
        assert_eq!(session.text(), "ello");
        session.handle_edit_key(ctrl('e'));
        session.handle_edit_key(key(KeyCode::Backspace));
        assert_eq!(session.text(), "ell");
    }

    #[test]
    fn backspace_removes_whole_graphemes() {
        let mut session = typed("ok 👍🏽");
        session.backspace();
        assert_eq!(session.text(), "ok ");
        let mut wide = typed("日本");
        wide.move_left();
        assert_eq!(wide.cursor_column(), 2);
        wide.backspace();
        assert_eq!(wide.text(), "本");
    }

    #[test]
    fn kill_and_word_deletion() {
        let mut session = typed("mine the belt");
        session.handle_edit_key(ctrl('w'));
        assert_eq!(session.text(), "mine the ");
        session.handle_edit_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::ALT));
        assert_eq!(session.text(), "mine ");
        session.move_left();
        session.handle_edit_key(ctrl('u'));
        assert_eq!(session.text(), " ");
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn paste_is_flattened_to_one_line() {
        let mut session = typed("say ");
        session.insert_str("hello\nworld\t!");
        assert_eq!(session.text(), "say hello world !");
        assert_eq!(session.cursor(), session.text().len());
    }

    #[test]
    fn non_editing_keys_are_left_to_caller() {
        let mut session = typed("x");
        assert!(!session.handle_edit_key(key(KeyCode::Enter)));
        assert!(!session.handle_edit_key(key(KeyCode::Esc)));
        assert!(!session.handle_edit_key(key(KeyCode::Up)));
        assert!(!session.handle_edit_key(ctrl('c')));
        assert_eq!(session.text(), "x");
    }

    #[test]
    fn prompts_name_their_target() {
        let mode = InputMode::Message {
            target: "a1".to_string(),
            target_name: "nova".to_string(),
        };
        assert_eq!(mode.prompt(), "Message nova: ");
        assert_eq!(mode.target(), Some("a1"));
        assert!(mode.uses_history());
        assert!(!InputMode::NewAgentName.uses_history());
    }
}
