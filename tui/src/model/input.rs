use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use zoea_protocol::SwarmError;

use super::Model;
use crate::app_event::AppCommand;
use crate::bottom_pane::InputMode;
use crate::bottom_pane::InputSession;
use crate::network_activity::NetworkKind;

impl Model {
    /// Start a new prompt, dropping whatever prompt was active.
    pub(super) fn begin_input(&mut self, session: InputSession) {
        self.history.reset_navigation();
        self.input = Some(session);
    }

    pub(super) fn begin_message(&mut self, agent_id: &str) {
        let Some(agent) = self.agent(agent_id) else {
            return;
        };
        let mode = InputMode::Message {
            target: agent.id.clone(),
            target_name: agent.name.clone(),
        };
        self.begin_input(InputSession::new(mode));
    }

    pub(super) fn begin_configure(&mut self, agent_id: &str) {
        let Some(agent) = self.agent(agent_id) else {
            return;
        };
        let placeholder = agent.provider.clone();
        let mode = InputMode::ConfigProvider {
            target: agent.id.clone(),
            target_name: agent.name.clone(),
        };
        self.begin_input(InputSession::new(mode).with_placeholder(placeholder));
    }

    pub(super) fn handle_input_key(&mut self, key: KeyEvent) -> Vec<AppCommand> {
        let Some(session) = self.input.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc => {
                self.input = None;
                self.error = None;
                self.history.reset_navigation();
                Vec::new()
            }
            KeyCode::Enter => match self.input.take() {
                Some(session) => self.submit_input(session),
                None => Vec::new(),
            },
            KeyCode::Up | KeyCode::Down if session.mode.uses_history() => {
                if self.history.should_handle_navigation(session.text()) {
                    let recalled = if key.code == KeyCode::Up {
                        self.history.navigate_up(session.text())
                    } else {
                        self.history.navigate_down(session.text())
                    };
                    if let Some(text) = recalled {
                        session.set_text(&text);
                    }
                }
                Vec::new()
            }
            _ => {
                if session.handle_edit_key(key) {
                    self.history.reset_navigation();
                }
                Vec::new()
            }
        }
    }

    fn submit_input(&mut self, session: InputSession) -> Vec<AppCommand> {
        let text = session.text().trim().to_string();
        if session.mode.uses_history() {
            self.history.record_submission(&text);
        }
        match session.mode {
            InputMode::Broadcast => self.submit_broadcast(text),
            InputMode::Message { target, .. } => self.submit_message(target, text),
            InputMode::NewAgentName => {
                self.submit_new_agent_name(session, text);
                Vec::new()
            }
            InputMode::NewAgentProvider { name } => {
                self.submit_new_agent_provider(&name, &text);
                Vec::new()
            }
            InputMode::ConfigProvider {
                target,
                target_name,
            } => {
                self.submit_config_provider(target, target_name, &text);
                Vec::new()
            }
            InputMode::ConfigModel {
                target,
                target_name,
                provider,
            } => {
                self.submit_config_model(&target, &target_name, &provider, &text);
                Vec::new()
            }
        }
    }

    fn submit_broadcast(&mut self, text: String) -> Vec<AppCommand> {
        if text.is_empty() {
            return Vec::new();
        }
        self.pending_broadcasts += 1;
        self.network.begin(NetworkKind::Llm);
        vec![AppCommand::Broadcast { text }]
    }

    fn submit_message(&mut self, agent_id: String, text: String) -> Vec<AppCommand> {
        if text.is_empty() {
            return Vec::new();
        }
        self.sending.insert(agent_id.clone());
        self.network.begin(NetworkKind::Llm);
        vec![AppCommand::SendMessage { agent_id, text }]
    }

    fn submit_new_agent_name(&mut self, mut session: InputSession, name: String) {
        if name.is_empty() {
            self.notice = None;
            self.error = Some("Name is required".to_string());
            session.clear();
            self.input = Some(session);
            return;
        }
        self.error = None;
        let default_provider = self.providers.default_provider().to_string();
        self.input = Some(
            InputSession::new(InputMode::NewAgentProvider { name })
                .with_placeholder(default_provider),
        );
    }

    fn submit_new_agent_provider(&mut self, name: &str, provider: &str) {
        let provider = if provider.is_empty() {
            self.providers.default_provider().to_string()
        } else {
            provider.to_string()
        };
        if !self.providers.contains(&provider) {
            self.set_error(
                "Cannot create mysis",
                &SwarmError::UnknownProvider(provider),
            );
            return;
        }
        match self.swarm.create_agent(name, &provider) {
            Ok(agent) => {
                self.set_notice(format!("Created {} ({provider})", agent.name));
                self.refresh_agents();
                if let Some(idx) = self.agents.iter().position(|a| a.id == agent.id) {
                    self.selected = idx;
                }
            }
            Err(err) => self.set_error(&format!("Failed to create {name}"), &err),
        }
    }

    fn submit_config_provider(&mut self, target: String, target_name: String, provider: &str) {
        let provider = if provider.is_empty() {
            self.agent(&target)
                .map(|agent| agent.provider.clone())
                .unwrap_or_else(|| self.providers.default_provider().to_string())
        } else {
            provider.to_string()
        };
        if !self.providers.contains(&provider) {
            self.set_error(
                &format!("Cannot configure {target_name}"),
                &SwarmError::UnknownProvider(provider),
            );
            return;
        }
        self.error = None;
        let default_model = self.providers.default_model_for(&provider).to_string();
        self.input = Some(
            InputSession::new(InputMode::ConfigModel {
                target,
                target_name,
                provider,
            })
            .with_placeholder(default_model),
        );
    }

    fn submit_config_model(&mut self, target: &str, target_name: &str, provider: &str, model: &str) {
        let model = if model.is_empty() {
            self.providers.default_model_for(provider)
        } else {
            model
        }
        .to_string();
        match self.swarm.configure_agent(target, provider, &model) {
            Ok(()) => self.set_notice(format!("Configured {target_name}: {provider}/{model}")),
            Err(err) => self.set_error(&format!("Failed to configure {target_name}"), &err),
        }
        self.refresh_agents();
    }

    pub(super) fn on_message_sent(&mut self, agent_id: &str, result: Result<(), SwarmError>) {
        self.sending.remove(agent_id);
        self.network.end();
        match result {
            Ok(()) => self.error = None,
            Err(err) => {
                let name = self
                    .agent(agent_id)
                    .map(|agent| agent.name.clone())
                    .unwrap_or_else(|| agent_id.to_string());
                self.set_error(&format!("Failed to message {name}"), &err);
            }
        }
    }

    pub(super) fn on_broadcast_sent(&mut self, result: Result<(), SwarmError>) {
        self.pending_broadcasts = self.pending_broadcasts.saturating_sub(1);
        self.network.end();
        match result {
            Ok(()) => {
                self.error = None;
                self.refresh_broadcasts();
            }
            Err(err) => self.set_error("Broadcast failed", &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use super::super::tests::ch;
    use super::super::tests::key;
    use super::super::tests::model_with;
    use super::super::tests::type_text;
    use super::*;
    use crate::app_event::AppEvent;
    use crate::test_support::FakeSwarm;

    #[test]
    fn empty_name_keeps_first_stage_with_error() {
        let swarm = Arc::new(FakeSwarm::default());
        let mut model = model_with(Arc::clone(&swarm));
        model.update(ch('n'));
        type_text(&mut model, "   ");
        model.update(key(KeyCode::Enter));

        assert_eq!(model.input().map(|s| &s.mode), Some(&InputMode::NewAgentName));
        assert_eq!(model.error(), Some("Name is required"));
        assert!(swarm.calls().is_empty());
    }

    #[test]
    fn empty_provider_uses_configured_default() {
        let swarm = Arc::new(FakeSwarm::default());
        let mut model = model_with(Arc::clone(&swarm));
        model.update(ch('n'));
        type_text(&mut model, "nova");
        model.update(key(KeyCode::Enter));
        assert_eq!(
            model.input().map(|s| &s.mode),
            Some(&InputMode::NewAgentProvider {
                name: "nova".to_string()
            })
        );
        assert_eq!(model.input().and_then(|s| s.placeholder()), Some("ollama"));

        model.update(key(KeyCode::Enter));
        assert!(model.input().is_none());
        assert_eq!(swarm.calls(), vec!["create nova ollama"]);
        assert_eq!(model.selected_agent().map(|a| a.name.as_str()), Some("nova"));
        assert_eq!(model.error(), None);
    }

    #[test]
    fn unknown_provider_aborts_creation() {
        let swarm = Arc::new(FakeSwarm::default());
        let mut model = model_with(Arc::clone(&swarm));
        model.update(ch('n'));
        type_text(&mut model, "nova");
        model.update(key(KeyCode::Enter));
        type_text(&mut model, "skynet");
        model.update(key(KeyCode::Enter));

        assert!(model.input().is_none());
        assert_eq!(
            model.error(),
            Some("Cannot create mysis: unknown provider: skynet")
        );
        assert!(swarm.calls().is_empty());
        assert!(model.agents().is_empty());
    }

    #[test]
    fn explicit_known_provider_is_used() {
        let swarm = Arc::new(FakeSwarm::default());
        let mut model = model_with(Arc::clone(&swarm));
        model.update(ch('n'));
        type_text(&mut model, "vega");
        model.update(key(KeyCode::Enter));
        type_text(&mut model, "opencode_zen");
        model.update(key(KeyCode::Enter));
        assert_eq!(swarm.calls(), vec!["create vega opencode_zen"]);
    }

    #[test]
    fn broadcast_submit_clears_input_and_returns_command() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha"]));
        let mut model = model_with(swarm);
        model.update(ch('b'));
        type_text(&mut model, "regroup at base");
        let commands = model.update(key(KeyCode::Enter));

        assert_eq!(
            commands,
            vec![AppCommand::Broadcast {
                text: "regroup at base".to_string()
            }]
        );
        assert!(model.input().is_none());
        assert_eq!(model.pending_broadcasts(), 1);
        assert!(model.network().is_active());

        model.update(AppEvent::BroadcastSent { result: Ok(()) });
        assert_eq!(model.pending_broadcasts(), 0);
        assert!(!model.network().is_active());
    }

    #[test]
    fn empty_broadcast_is_dropped() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha"]));
        let mut model = model_with(swarm);
        model.update(ch('b'));
        assert_eq!(model.update(key(KeyCode::Enter)), Vec::new());
        assert!(model.input().is_none());
        assert_eq!(model.pending_broadcasts(), 0);
    }

    #[test]
    fn message_marks_agent_busy_until_completion() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha"]));
        let mut model = model_with(swarm);
        model.update(ch('m'));
        type_text(&mut model, "mine");
        let commands = model.update(key(KeyCode::Enter));
        assert_eq!(
            commands,
            vec![AppCommand::SendMessage {
                agent_id: "agent-1".to_string(),
                text: "mine".to_string()
            }]
        );
        assert!(model.is_sending("agent-1"));

        model.update(AppEvent::MessageSent {
            agent_id: "agent-1".to_string(),
            result: Err(SwarmError::AgentNotRunning("agent-1".to_string())),
        });
        assert!(!model.is_sending("agent-1"));
        assert_eq!(
            model.error(),
            Some("Failed to message alpha: agent agent-1 is not running")
        );
    }

    #[test]
    fn duplicate_completions_never_underflow() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha"]));
        let mut model = model_with(swarm);
        for _ in 0..3 {
            model.update(AppEvent::BroadcastSent { result: Ok(()) });
        }
        assert_eq!(model.network().outstanding(), 0);
        assert_eq!(model.pending_broadcasts(), 0);
    }

    #[test]
    fn escape_tears_down_input_and_error() {
        let swarm = Arc::new(FakeSwarm::default());
        let mut model = model_with(swarm);
        model.update(ch('n'));
        model.update(key(KeyCode::Enter));
        assert!(model.error().is_some());
        model.update(key(KeyCode::Esc));
        assert!(model.input().is_none());
        assert_eq!(model.error(), None);
    }

    #[test]
    fn entering_a_mode_replaces_the_previous_session() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha"]));
        let mut model = model_with(swarm);
        model.update(key(KeyCode::Enter));
        model.update(ch('m'));
        type_text(&mut model, "draft");
        model.update(key(KeyCode::Esc));
        model.update(ch('b'));
        assert_eq!(model.input().map(|s| (&s.mode, s.text())), Some((&InputMode::Broadcast, "")));
    }

    #[test]
    fn history_recall_with_up_and_down() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha"]));
        let mut model = model_with(swarm);
        for text in ["first", "second"] {
            model.update(ch('b'));
            type_text(&mut model, text);
            model.update(key(KeyCode::Enter));
        }
        model.update(ch('b'));
        model.update(key(KeyCode::Up));
        assert_eq!(model.input().map(|s| s.text()), Some("second"));
        model.update(key(KeyCode::Up));
        assert_eq!(model.input().map(|s| s.text()), Some("first"));
        model.update(key(KeyCode::Down));
        model.update(key(KeyCode::Down));
        assert_eq!(model.input().map(|s| s.text()), Some(""));
    }

    #[test]
    fn paste_goes_into_the_active_input() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha"]));
        let mut model = model_with(swarm);
        model.update(AppEvent::Paste("ignored".to_string()));
        model.update(ch('b'));
        model.update(AppEvent::Paste("line one\nline two".to_string()));
        model.update(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('w'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(model.input().map(|s| s.text()), Some("line one line "));
    }

    #[test]
    fn configure_flow_defaults_model_for_provider() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha"]));
        let mut model = model_with(Arc::clone(&swarm));
        model.update(ch('c'));
        assert_eq!(model.input().and_then(|s| s.placeholder()), Some("ollama"));
        type_text(&mut model, "opencode_zen");
        model.update(key(KeyCode::Enter));
        assert_eq!(model.input().and_then(|s| s.placeholder()), Some("gpt-5-nano"));
        model.update(key(KeyCode::Enter));

        assert!(model.input().is_none());
        assert_eq!(swarm.calls(), vec!["configure agent-1 opencode_zen gpt-5-nano"]);
        assert_eq!(model.agents()[0].provider, "opencode_zen");
        assert_eq!(
            model.notice(),
            Some("Configured alpha: opencode_zen/gpt-5-nano")
        );
    }

    #[test]
    fn configure_with_unknown_provider_resets_input() {
        let swarm = Arc::new(FakeSwarm::with_agents(&["alpha"]));
        let mut model = model_with(Arc::clone(&swarm));
        model.update(ch('c'));
        type_text(&mut model, "nope");
        model.update(key(KeyCode::Enter));
        assert!(model.input().is_none());
        assert_eq!(
            model.error(),
            Some("Cannot configure alpha: unknown provider: nope")
        );
        assert!(swarm.calls().is_empty());
    }
}
