/// Shell-style Up/Down recall of previously submitted broadcast and message texts.
///
/// History lives in memory for the lifetime of the dashboard. It is kept separate from the
/// input session so a new session can recall texts submitted in earlier ones.
#[derive(Debug, Default)]
pub struct InputHistory {
    entries: Vec<String>,

    /// Current cursor within `entries`. `None` when the user is not browsing history.
    history_cursor: Option<usize>,

    /// The text last placed into the input by navigation. Up/Down only keep navigating while
    /// the buffer still holds exactly this text.
    last_history_text: Option<String>,
}

pub const MAX_ENTRIES: usize = 100;

impl InputHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a submitted text so it can be recalled later.
    pub fn record_submission(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        self.reset_navigation();

        if self.entries.last().is_some_and(|prev| prev == text) {
            return;
        }

        self.entries.push(text.to_string());
        if self.entries.len() > MAX_ENTRIES {
            let drop_count = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(0..drop_count);
        }
    }

    /// Reset navigation so the next Up resumes from the newest entry.
    pub fn reset_navigation(&mut self) {
        self.history_cursor = None;
        self.last_history_text = None;
    }

    /// Whether Up/Down should navigate history given the current buffer. Navigation never
    /// hijacks a buffer the user has edited.
    pub fn should_handle_navigation(&self, text: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        if text.is_empty() {
            return true;
        }
        matches!(&self.last_history_text, Some(prev) if prev == text)
    }

    /// Handle Up. Returns the text to place into the buffer, or `None` when already at the
    /// oldest entry.
    pub fn navigate_up(&mut self, current_text: &str) -> Option<String> {
        let total_entries = self.entries.len();
        if total_entries == 0 {
            return None;
        }

        let mut next_idx = match self.history_cursor {
            None => total_entries - 1,
            Some(0) => return None,
            Some(idx) => idx - 1,
        };

        loop {
            let entry = &self.entries[next_idx];
            if entry != current_text {
                self.history_cursor = Some(next_idx);
                self.last_history_text = Some(entry.clone());
                return Some(entry.clone());
            }
            if next_idx == 0 {
                return None;
            }
            next_idx -= 1;
        }
    }

    /// Handle Down. Walking past the newest entry clears the buffer and stops browsing.
    pub fn navigate_down(&mut self, current_text: &str) -> Option<String> {
        let total_entries = self.entries.len();
        let mut next_idx = match self.history_cursor {
            None => return None,
            Some(idx) => idx + 1,
        };

        while next_idx < total_entries {
            let entry = &self.entries[next_idx];
            if entry != current_text {
                self.history_cursor = Some(next_idx);
                self.last_history_text = Some(entry.clone());
                return Some(entry.clone());
            }
            next_idx += 1;
        }

        self.reset_navigation();
        Some(String::new())
    }
}
