use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

use crate::memory::MemoryRecord;

/// Lifecycle state of a mysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentState {
    #[default]
    Idle,
    Running,
    Stopped,
    Errored,
}

/// What a mysis is doing right now, as reported by the orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityState {
    #[default]
    Idle,
    LlmCall,
    McpCall,
    Traveling,
    Mining,
    InCombat,
    Cooldown,
}

impl ActivityState {
    /// Whether the dashboard should animate a spinner for this activity.
    pub fn is_busy(self) -> bool {
        !matches!(self, ActivityState::Idle)
    }
}

/// Snapshot of one mysis as seen by the dashboard.
///
/// The dashboard replaces its whole list of summaries on every refresh; a summary is never
/// patched in place.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub state: AgentState,
    #[serde(default)]
    pub activity: ActivityState,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Most recent memories, newest first.
    #[serde(default)]
    pub recent_memories: Vec<MemoryRecord>,
    /// Legacy single-message field kept for orchestrators that do not report memories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl AgentSummary {
    /// Non-empty error text, if any.
    pub fn error_text(&self) -> Option<&str> {
        self.last_error
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn states_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&ActivityState::InCombat).ok(),
            Some("\"in_combat\"".to_string())
        );
        assert_eq!(AgentState::Errored.to_string(), "errored");
        assert_eq!(ActivityState::LlmCall.to_string(), "llm_call");
    }

    #[test]
    fn error_text_ignores_blank_errors() {
        let mut agent = AgentSummary {
            last_error: Some("   ".to_string()),
            ..AgentSummary::default()
        };
        assert_eq!(agent.error_text(), None);
        agent.last_error = Some(" boom ".to_string());
        assert_eq!(agent.error_text(), Some("boom"));
    }
}
