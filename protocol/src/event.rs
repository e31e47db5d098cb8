//! Events emitted by the swarm orchestrator.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

/// Discriminant of a [`SwarmEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SwarmEventKind {
    AgentCreated,
    AgentDeleted,
    AgentStateChanged,
    AgentConfigChanged,
    AgentResponse,
    AgentMessage,
    Broadcast,
    NetworkLlm,
    NetworkMcp,
    NetworkIdle,
    AgentError,
}

impl SwarmEventKind {
    /// Events after which the agent list must be reloaded.
    pub fn changes_agent_list(self) -> bool {
        matches!(
            self,
            SwarmEventKind::AgentCreated
                | SwarmEventKind::AgentDeleted
                | SwarmEventKind::AgentStateChanged
                | SwarmEventKind::AgentConfigChanged
                | SwarmEventKind::AgentResponse
                | SwarmEventKind::AgentMessage
                | SwarmEventKind::AgentError
        )
    }

    /// Events that add a memory to some agent's conversation.
    pub fn adds_memory(self) -> bool {
        matches!(
            self,
            SwarmEventKind::AgentResponse | SwarmEventKind::AgentMessage
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SwarmEvent {
    pub kind: SwarmEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Free-form payload: a message body, an error text, or a new state name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl SwarmEvent {
    pub fn new(kind: SwarmEventKind) -> Self {
        Self {
            kind,
            agent_id: None,
            agent_name: None,
            message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn for_agent(kind: SwarmEventKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            agent_id: Some(id.into()),
            agent_name: Some(name.into()),
            ..Self::new(kind)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn event_round_trips_through_json_with_snake_case_kind() -> anyhow::Result<()> {
        let event = SwarmEvent::for_agent(SwarmEventKind::NetworkLlm, "a1", "alpha");
        let json = serde_json::to_value(&event)?;
        assert_eq!(json["kind"], "network_llm");
        let back: SwarmEvent = serde_json::from_value(json)?;
        assert_eq!(back, event);
        Ok(())
    }

    #[test]
    fn network_events_do_not_reload_agents() {
        assert!(!SwarmEventKind::NetworkIdle.changes_agent_list());
        assert!(SwarmEventKind::AgentDeleted.changes_agent_list());
        assert!(SwarmEventKind::AgentMessage.adds_memory());
        assert!(!SwarmEventKind::Broadcast.adds_memory());
    }
}
