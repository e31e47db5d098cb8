use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use ratatui::text::Line;

use super::FOCUS_MEMORY_LIMIT;
use super::Model;
use super::View;
use crate::app_event::AppCommand;
use crate::bottom_pane::InputMode;
use crate::bottom_pane::InputSession;
use crate::history_cell::LogEntry;
use crate::history_cell::render_log;
use crate::layout::focus_content_width;
use crate::layout::focus_viewport_height;
use crate::viewport::ViewportState;

/// Conversation view of one mysis.
///
/// `lines` is the rendered log at `width` columns; it is rebuilt whenever the entries, the
/// width or the verbose flag change.
#[derive(Debug)]
pub struct FocusView {
    pub agent_id: String,
    pub entries: Vec<LogEntry>,
    pub lines: Vec<Line<'static>>,
    pub viewport: ViewportState,
    pub width: u16,
}

impl FocusView {
    pub fn visible_lines(&self) -> &[Line<'static>] {
        &self.lines[self.viewport.visible_range()]
    }
}

impl Model {
    /// Switch to the conversation of `agent_id`, scrolled to its newest entry.
    pub(super) fn enter_focus(&mut self, agent_id: &str) {
        self.input = None;
        let mut focus = FocusView {
            agent_id: agent_id.to_string(),
            entries: Vec::new(),
            lines: Vec::new(),
            viewport: ViewportState::new(focus_viewport_height(self.height)),
            width: focus_content_width(self.width),
        };
        focus.entries = self.load_focus_entries(agent_id);
        self.render_focus_lines(&mut focus);
        focus.viewport.goto_bottom();
        self.view = View::Focus(Box::new(focus));
    }

    pub(super) fn leave_focus(&mut self) {
        self.view = View::Dashboard;
    }

    fn load_focus_entries(&mut self, agent_id: &str) -> Vec<LogEntry> {
        match self.swarm.get_recent_memories(agent_id, FOCUS_MEMORY_LIMIT) {
            Ok(memories) => memories
                .into_iter()
                .filter(|memory| !memory.is_from_broadcast())
                .map(LogEntry::from)
                .collect(),
            Err(err) => {
                self.set_error("Failed to load conversation", &err);
                Vec::new()
            }
        }
    }

    fn render_focus_lines(&self, focus: &mut FocusView) {
        focus.lines = render_log(
            &focus.entries,
            focus.width,
            self.verbose,
            self.tick,
            &self.theme,
        );
        focus.viewport.set_content(focus.lines.len());
    }

    /// Reload the focused conversation after new memories arrived.
    pub(super) fn refresh_focus(&mut self) {
        let View::Focus(mut focus) = std::mem::replace(&mut self.view, View::Dashboard) else {
            return;
        };
        focus.entries = self.load_focus_entries(&focus.agent_id);
        self.render_focus_lines(&mut focus);
        self.view = View::Focus(focus);
    }

    /// Re-render the focused conversation with the current verbose flag.
    pub(super) fn rerender_focus(&mut self) {
        let View::Focus(mut focus) = std::mem::replace(&mut self.view, View::Dashboard) else {
            return;
        };
        self.render_focus_lines(&mut focus);
        self.view = View::Focus(focus);
    }

    /// Recompute the viewport for the current terminal size and re-wrap at the new width.
    pub(super) fn relayout_focus(&mut self) {
        let View::Focus(mut focus) = std::mem::replace(&mut self.view, View::Dashboard) else {
            return;
        };
        focus.width = focus_content_width(self.width);
        focus.viewport.set_height(focus_viewport_height(self.height));
        self.render_focus_lines(&mut focus);
        self.view = View::Focus(focus);
    }

    fn focused_id(&self) -> Option<String> {
        self.focus().map(|focus| focus.agent_id.clone())
    }

    fn scroll(&mut self, f: impl FnOnce(&mut ViewportState)) {
        if let View::Focus(focus) = &mut self.view {
            f(&mut focus.viewport);
        }
    }

    pub(super) fn handle_focus_key(&mut self, key: KeyEvent) -> Vec<AppCommand> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll(|v| v.scroll_up(1)),
            KeyCode::Down | KeyCode::Char('j') => self.scroll(|v| v.scroll_down(1)),
            KeyCode::PageUp => self.scroll(ViewportState::page_up),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll(ViewportState::page_down),
            KeyCode::Home | KeyCode::Char('g') => self.scroll(ViewportState::goto_top),
            KeyCode::End | KeyCode::Char('G') => self.scroll(ViewportState::goto_bottom),
            KeyCode::Char('b') => self.begin_input(InputSession::new(InputMode::Broadcast)),
            KeyCode::Char('m') => {
                if let Some(id) = self.focused_id() {
                    self.begin_message(&id);
                }
            }
            KeyCode::Char('c') => {
                if let Some(id) = self.focused_id() {
                    self.begin_configure(&id);
                }
            }
            KeyCode::Char('s') => {
                if let Some(id) = self.focused_id() {
                    self.start_agent(&id);
                }
            }
            KeyCode::Char('x') => {
                if let Some(id) = self.focused_id() {
                    self.stop_agent(&id);
                }
            }
            KeyCode::Char('r') => {
                self.refresh_agents();
                self.refresh_focus();
            }
            _ => {}
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use zoea_protocol::MemoryRecord;
    use zoea_protocol::MemoryRole;
    use zoea_protocol::MemorySource;

    use super::super::tests::ch;
    use super::super::tests::key;
    use super::super::tests::model_with;
    use super::*;
    use crate::app_event::AppEvent;
    use crate::test_support::FakeSwarm;
    use crate::text_formatting::line_to_plain;

    fn swarm_with_history(messages: usize) -> (Arc<FakeSwarm>, String) {
        let swarm = Arc::new(FakeSwarm::default());
        let id = swarm.add_agent("nova", zoea_protocol::AgentState::Running);
        for idx in 0..messages {
            swarm.push_memory(
                &id,
                MemoryRecord::new(MemoryRole::Assistant, MemorySource::Llm, format!("reply {idx}")),
            );
        }
        (swarm, id)
    }

    #[test]
    fn enter_focus_then_escape_returns_to_dashboard() {
        let (swarm, id) = swarm_with_history(3);
        let mut model = model_with(swarm);
        model.update(key(KeyCode::Enter));
        assert_eq!(model.focus().map(|f| f.agent_id.as_str()), Some(id.as_str()));

        model.update(key(KeyCode::Esc));
        assert!(!model.is_focus());
        assert!(model.focus().is_none());
    }

    #[test]
    fn focus_hides_broadcast_memories() {
        let (swarm, id) = swarm_with_history(1);
        swarm.push_memory(
            &id,
            MemoryRecord::new(MemoryRole::User, MemorySource::Broadcast, "regroup")
                .with_sender("a9", "vega"),
        );
        swarm.push_memory(
            &id,
            MemoryRecord::new(MemoryRole::User, MemorySource::BroadcastSelf, "status?"),
        );
        let mut model = model_with(swarm);
        model.update(key(KeyCode::Enter));
        let contents: Vec<&str> = model
            .focus()
            .map(|f| f.entries.iter().map(|e| e.content.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(contents, vec!["reply 0", "status?"]);
    }

    #[test]
    fn focus_starts_at_bottom_and_scrolls() {
        let (swarm, _) = swarm_with_history(20);
        let mut model = model_with(swarm);
        model.update(key(KeyCode::Enter));
        let (offset, max) = model
            .focus()
            .map(|f| (f.viewport.offset(), f.viewport.max_offset()))
            .unwrap_or_default();
        assert!(max > 0);
        assert_eq!(offset, max);

        model.update(key(KeyCode::Up));
        model.update(key(KeyCode::Up));
        assert_eq!(model.focus().map(|f| f.viewport.offset()), Some(max - 2));
        model.update(ch('G'));
        assert_eq!(model.focus().map(|f| f.viewport.offset()), Some(max));
        model.update(ch('g'));
        model.update(key(KeyCode::Up));
        assert_eq!(model.focus().map(|f| f.viewport.offset()), Some(0));
    }

    #[test]
    fn resize_rewraps_at_new_width() {
        let (swarm, id) = swarm_with_history(0);
        swarm.push_memory(
            &id,
            MemoryRecord::new(
                MemoryRole::Assistant,
                MemorySource::Llm,
                "a long enough reply to wrap when the terminal becomes narrow",
            ),
        );
        let mut model = model_with(swarm);
        model.update(key(KeyCode::Enter));
        let wide = model.focus().map(|f| f.lines.len()).unwrap_or_default();

        model.update(AppEvent::Resize {
            width: 40,
            height: 20,
        });
        let focus = model.focus();
        assert_eq!(focus.map(|f| f.width), Some(39));
        assert_eq!(focus.map(|f| f.viewport.height()), Some(11));
        let narrow = focus.map(|f| f.lines.len()).unwrap_or_default();
        assert!(narrow > wide);
        for line in focus.map(|f| f.lines.as_slice()).unwrap_or_default() {
            assert_eq!(line.width(), 39, "{:?}", line_to_plain(line));
        }
    }

    #[test]
    fn verbose_toggle_rerenders_immediately() {
        let (swarm, id) = swarm_with_history(0);
        swarm.push_memory(
            &id,
            MemoryRecord::new(MemoryRole::Assistant, MemorySource::Llm, "ok")
                .with_reasoning("a\nb\nc\nd\ne\nf"),
        );
        let mut model = model_with(swarm);
        model.update(key(KeyCode::Enter));
        let compact = model.focus().map(|f| f.lines.len()).unwrap_or_default();
        model.update(ch('v'));
        assert!(model.verbose());
        let verbose = model.focus().map(|f| f.lines.len()).unwrap_or_default();
        assert_eq!(verbose, compact + 2);
    }

    #[test]
    fn focus_keys_act_on_the_focused_agent() {
        let (swarm, id) = swarm_with_history(0);
        swarm.add_agent("vega", zoea_protocol::AgentState::Idle);
        let mut model = model_with(Arc::clone(&swarm));
        model.update(key(KeyCode::Enter));
        model.update(ch('x'));
        model.update(ch('s'));
        assert_eq!(
            swarm.calls(),
            vec![format!("stop {id}"), format!("start {id}")]
        );
    }
}
