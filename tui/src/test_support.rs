//! In-memory `SwarmClient` used by the state machine and runner tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use zoea_protocol::AgentState;
use zoea_protocol::AgentSummary;
use zoea_protocol::BroadcastRecord;
use zoea_protocol::MemoryRecord;
use zoea_protocol::SwarmError;

use crate::swarm_client::SwarmClient;

#[derive(Default)]
struct FakeState {
    agents: Vec<AgentSummary>,
    memories: HashMap<String, Vec<MemoryRecord>>,
    broadcasts: Vec<BroadcastRecord>,
    calls: Vec<String>,
    tick: i64,
    next_id: usize,
    fail_next: Option<SwarmError>,
}

#[derive(Default)]
pub(crate) struct FakeSwarm {
    state: Mutex<FakeState>,
}

pub(crate) fn created_at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
        + Duration::minutes(minute)
}

impl FakeSwarm {
    pub(crate) fn with_agents(names: &[&str]) -> Self {
        let swarm = Self::default();
        for name in names {
            swarm.add_agent(name, AgentState::Idle);
        }
        swarm
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub(crate) fn add_agent(&self, name: &str, state: AgentState) -> String {
        let mut guard = self.lock();
        guard.next_id += 1;
        let id = format!("agent-{}", guard.next_id);
        let minute = guard.next_id as i64;
        guard.agents.push(AgentSummary {
            id: id.clone(),
            name: name.to_string(),
            state,
            provider: "ollama".to_string(),
            model: Some("qwen3:8b".to_string()),
            created_at: created_at(minute),
            ..AgentSummary::default()
        });
        id
    }

    pub(crate) fn update_agent(&self, id: &str, f: impl FnOnce(&mut AgentSummary)) {
        let mut guard = self.lock();
        if let Some(agent) = guard.agents.iter_mut().find(|a| a.id == id) {
            f(agent);
        }
    }

    pub(crate) fn push_memory(&self, id: &str, record: MemoryRecord) {
        self.lock()
            .memories
            .entry(id.to_string())
            .or_default()
            .push(record);
    }

    pub(crate) fn push_broadcast(&self, sender: &str, content: &str) {
        self.lock().broadcasts.push(BroadcastRecord {
            sender_id: None,
            sender_name: Some(sender.to_string()),
            content: content.to_string(),
            created_at: None,
        });
    }

    pub(crate) fn set_tick(&self, tick: i64) {
        self.lock().tick = tick;
    }

    pub(crate) fn fail_next(&self, error: SwarmError) {
        self.lock().fail_next = Some(error);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub(crate) fn agents(&self) -> Vec<AgentSummary> {
        self.lock().agents.clone()
    }

    fn record(&self, call: String) -> Result<(), SwarmError> {
        let mut guard = self.lock();
        guard.calls.push(call);
        match guard.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl SwarmClient for FakeSwarm {
    fn list_agents(&self) -> Result<Vec<AgentSummary>, SwarmError> {
        // Reverse creation order so callers must sort.
        let mut agents = self.lock().agents.clone();
        agents.reverse();
        Ok(agents)
    }

    fn create_agent(&self, name: &str, provider: &str) -> Result<AgentSummary, SwarmError> {
        self.record(format!("create {name} {provider}"))?;
        let id = self.add_agent(name, AgentState::Idle);
        self.update_agent(&id, |agent| agent.provider = provider.to_string());
        self.lock()
            .agents
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(SwarmError::AgentNotFound(id))
    }

    fn start_agent(&self, id: &str) -> Result<(), SwarmError> {
        self.record(format!("start {id}"))?;
        self.update_agent(id, |agent| agent.state = AgentState::Running);
        Ok(())
    }

    fn stop_agent(&self, id: &str) -> Result<(), SwarmError> {
        self.record(format!("stop {id}"))?;
        self.update_agent(id, |agent| agent.state = AgentState::Stopped);
        Ok(())
    }

    fn delete_agent(&self, id: &str, force: bool) -> Result<(), SwarmError> {
        self.record(format!("delete {id} force={force}"))?;
        self.lock().agents.retain(|agent| agent.id != id);
        Ok(())
    }

    fn configure_agent(&self, id: &str, provider: &str, model: &str) -> Result<(), SwarmError> {
        self.record(format!("configure {id} {provider} {model}"))?;
        self.update_agent(id, |agent| {
            agent.provider = provider.to_string();
            agent.model = Some(model.to_string());
        });
        Ok(())
    }

    fn send_message(&self, id: &str, text: &str) -> Result<(), SwarmError> {
        self.record(format!("send {id} {text}"))
    }

    fn send_message_async(&self, id: &str, text: &str) -> Result<(), SwarmError> {
        self.record(format!("send_async {id} {text}"))
    }

    fn broadcast(&self, text: &str) -> Result<(), SwarmError> {
        self.record(format!("broadcast {text}"))
    }

    fn aggregate_tick(&self) -> i64 {
        self.lock().tick
    }

    fn get_recent_memories(&self, id: &str, limit: usize) -> Result<Vec<MemoryRecord>, SwarmError> {
        let guard = self.lock();
        let memories = guard.memories.get(id).cloned().unwrap_or_default();
        let skip = memories.len().saturating_sub(limit);
        Ok(memories.into_iter().skip(skip).collect())
    }

    fn get_recent_broadcasts(&self, limit: usize) -> Result<Vec<BroadcastRecord>, SwarmError> {
        let guard = self.lock();
        Ok(guard.broadcasts.iter().rev().take(limit).cloned().collect())
    }

    fn shutdown(&self) {
        let _ = self.record("shutdown".to_string());
    }
}
