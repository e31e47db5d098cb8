use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

use crate::tool_calls;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MemoryRole {
    System,
    User,
    Assistant,
    Tool,
    /// Roles written by newer orchestrators that this build does not know about.
    #[serde(other)]
    Unknown,
}

/// Where a memory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MemorySource {
    Direct,
    Broadcast,
    BroadcastSelf,
    Llm,
    Tool,
    System,
}

/// One stored conversation record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MemoryRecord {
    pub role: MemoryRole,
    pub source: MemorySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// `None` when the store did not record a timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl MemoryRecord {
    pub fn new(role: MemoryRole, source: MemorySource, content: impl Into<String>) -> Self {
        Self {
            role,
            source,
            sender_id: None,
            sender_name: None,
            content: content.into(),
            reasoning: None,
            created_at: None,
        }
    }

    pub fn with_sender(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.sender_id = Some(id.into());
        self.sender_name = Some(name.into());
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Whether this is an assistant memory holding encoded tool calls.
    pub fn is_tool_call(&self) -> bool {
        self.role == MemoryRole::Assistant && tool_calls::is_tool_call_payload(&self.content)
    }

    pub fn is_from_broadcast(&self) -> bool {
        self.source == MemorySource::Broadcast
    }
}

/// A swarm-wide broadcast as kept by the store.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BroadcastRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_roles_deserialize_to_unknown() -> anyhow::Result<()> {
        let record: MemoryRecord = serde_json::from_str(
            r#"{"role":"narrator","source":"system","content":"hello"}"#,
        )?;
        assert_eq!(record.role, MemoryRole::Unknown);
        assert_eq!(record.created_at, None);
        Ok(())
    }

    #[test]
    fn tool_call_detection_requires_assistant_role() {
        let content = "[TOOL_CALLS]call_1:get_ship:{}";
        assert!(MemoryRecord::new(MemoryRole::Assistant, MemorySource::Llm, content).is_tool_call());
        assert!(!MemoryRecord::new(MemoryRole::Tool, MemorySource::Tool, content).is_tool_call());
        assert!(
            !MemoryRecord::new(MemoryRole::Assistant, MemorySource::Llm, "plain").is_tool_call()
        );
    }
}
