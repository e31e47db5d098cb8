use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;

use super::Model;
use crate::app_event::AppCommand;
use crate::bottom_pane::InputMode;
use crate::bottom_pane::InputSession;

impl Model {
    pub(super) fn handle_dashboard_key(&mut self, key: KeyEvent) -> Vec<AppCommand> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.agents.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = self.agents.len().saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_agent().map(|agent| agent.id.clone()) {
                    self.enter_focus(&id);
                }
            }
            KeyCode::Char('b') => self.begin_input(InputSession::new(InputMode::Broadcast)),
            KeyCode::Char('m') => {
                if let Some(id) = self.selected_agent().map(|agent| agent.id.clone()) {
                    self.begin_message(&id);
                }
            }
            KeyCode::Char('n') => self.begin_input(InputSession::new(InputMode::NewAgentName)),
            KeyCode::Char('c') => {
                if let Some(id) = self.selected_agent().map(|agent| agent.id.clone()) {
                    self.begin_configure(&id);
                }
            }
            KeyCode::Char('s') => self.with_selected(Self::start_agent),
            KeyCode::Char('x') => self.with_selected(Self::stop_agent),
            KeyCode::Char('d') => self.with_selected(|model, id| model.delete_agent(id, false)),
            KeyCode::Char('D') => self.with_selected(|model, id| model.delete_agent(id, true)),
            KeyCode::Char('r') => {
                self.refresh_all();
                if self.error.is_none() {
                    self.set_notice("Refreshed");
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn with_selected(&mut self, action: impl FnOnce(&mut Self, &str)) {
        if let Some(id) = self.selected_agent().map(|agent| agent.id.clone()) {
            action(self, &id);
        }
    }

    fn agent_label(&self, id: &str) -> String {
        self.agent(id)
            .map(|agent| agent.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub(super) fn start_agent(&mut self, id: &str) {
        let name = self.agent_label(id);
        match self.swarm.start_agent(id) {
            Ok(()) => self.set_notice(format!("Started {name}")),
            Err(err) => self.set_error(&format!("Failed to start {name}"), &err),
        }
        self.refresh_agents();
    }

    pub(super) fn stop_agent(&mut self, id: &str) {
        let name = self.agent_label(id);
        match self.swarm.stop_agent(id) {
            Ok(()) => self.set_notice(format!("Stopped {name}")),
            Err(err) => self.set_error(&format!("Failed to stop {name}"), &err),
        }
        self.refresh_agents();
    }

    fn delete_agent(&mut self, id: &str, force: bool) {
        let name = self.agent_label(id);
        match self.swarm.delete_agent(id, force) {
            Ok(()) => {
                self.sending.remove(id);
                self.set_notice(format!("Deleted {name}"));
            }
            Err(err) => self.set_error(&format!("Failed to delete {name}"), &err),
        }
        self.refresh_agents();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use zoea_protocol::AgentState;
    use zoea_protocol::SwarmError;

    use super::super::tests::ch;
    use super::super::tests::key;
    use super::super::tests::model_with;
    use super::*;
    use crate::test_support::FakeSwarm;

    #[test]
    fn selection_is_clamped_to_the_list() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha", "beta"]));
        let mut model = model_with(swarm);
        model.update(key(KeyCode::Up));
        assert_eq!(model.selected_index(), 0);
        model.update(ch('j'));
        model.update(ch('j'));
        model.update(key(KeyCode::Down));
        assert_eq!(model.selected_index(), 1);
        model.update(ch('g'));
        assert_eq!(model.selected_index(), 0);
    }

    #[test]
    fn lifecycle_keys_call_the_orchestrator() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha", "beta"]));
        let mut model = model_with(Arc::clone(&swarm));
        model.update(ch('j'));
        model.update(ch('s'));
        assert_eq!(model.selected_agent().map(|a| a.state), Some(AgentState::Running));
        assert_eq!(model.notice(), Some("Started beta"));

        model.update(ch('x'));
        model.update(ch('d'));
        model.update(ch('D'));
        assert_eq!(
            swarm.calls(),
            vec![
                "start agent-2",
                "stop agent-2",
                "delete agent-2 force=false",
                "delete agent-1 force=true",
            ]
        );
        assert!(model.agents().is_empty());
        assert_eq!(model.selected_index(), 0);
    }

    #[test]
    fn success_clears_previous_error() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha"]));
        let mut model = model_with(Arc::clone(&swarm));
        swarm.fail_next(SwarmError::AgentBusy("alpha".to_string()));
        model.update(ch('d'));
        assert_eq!(model.error(), Some("Failed to delete alpha: agent alpha is busy"));
        assert_eq!(model.agents().len(), 1);

        model.update(ch('s'));
        assert_eq!(model.error(), None);
    }

    #[test]
    fn escape_clears_error_on_dashboard() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha"]));
        let mut model = model_with(Arc::clone(&swarm));
        swarm.fail_next(SwarmError::Backend("nope".to_string()));
        model.update(ch('x'));
        assert!(model.error().is_some());
        model.update(key(KeyCode::Esc));
        assert_eq!(model.error(), None);
        assert!(!model.is_focus());
    }

    #[test]
    fn keys_without_agents_are_noops() {
        let swarm = Arc::new(FakeSwarm::default());
        let mut model = model_with(Arc::clone(&swarm));
        for c in ['s', 'x', 'd', 'm', 'c'] {
            model.update(ch(c));
        }
        model.update(key(KeyCode::Enter));
        assert!(swarm.calls().is_empty());
        assert!(model.input().is_none());
        assert!(!model.is_focus());
    }
}
