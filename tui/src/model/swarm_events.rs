use std::time::Instant;

use zoea_protocol::SwarmEvent;
use zoea_protocol::SwarmEventKind;

use super::Model;
use super::View;
use crate::network_activity::NetworkKind;

impl Model {
    pub(super) fn handle_swarm_event(&mut self, event: SwarmEvent, now: Instant) {
        tracing::debug!(kind = %event.kind, agent = ?event.agent_id, "swarm event");
        match event.kind {
            SwarmEventKind::NetworkLlm => self.network.begin(NetworkKind::Llm),
            SwarmEventKind::NetworkMcp => self.network.begin(NetworkKind::Mcp),
            SwarmEventKind::NetworkIdle => self.network.end(),
            SwarmEventKind::Broadcast => self.refresh_broadcasts(),
            SwarmEventKind::AgentError => {
                let message = event.message.as_deref().unwrap_or_default();
                if self.provider_health.observe(now, message) {
                    tracing::info!(
                        agent = ?event.agent_name,
                        "provider failure recorded: {message}"
                    );
                }
            }
            SwarmEventKind::AgentCreated
            | SwarmEventKind::AgentDeleted
            | SwarmEventKind::AgentStateChanged
            | SwarmEventKind::AgentConfigChanged
            | SwarmEventKind::AgentResponse
            | SwarmEventKind::AgentMessage => {}
        }

        if event.kind.changes_agent_list() {
            self.refresh_agents();
        }

        let Some(focused) = self.focus().map(|focus| focus.agent_id.clone()) else {
            return;
        };
        let about_focused = event.agent_id.as_deref() == Some(focused.as_str());
        if event.kind == SwarmEventKind::AgentDeleted && about_focused {
            self.view = View::Dashboard;
            self.input = None;
            self.set_notice(format!(
                "{} was deleted",
                event.agent_name.as_deref().unwrap_or("Focused mysis")
            ));
            return;
        }
        if event.kind.adds_memory() && about_focused {
            self.refresh_focus();
        }
    }
}
