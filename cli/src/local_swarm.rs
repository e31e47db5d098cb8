//! In-process orchestrator so the dashboard runs without an external backend.
//!
//! Every running mysis cycles through a rest, an LLM call, an optional MCP tool call, and the
//! in-game action that call started. [`LocalSwarm::step`] advances all of them by one beat and
//! bumps the aggregate tick. Network begin/idle events are always emitted in pairs, including
//! when a mysis is stopped or deleted mid-call.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde_json::Value;
use serde_json::json;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;
use zoea_protocol::ActivityState;
use zoea_protocol::AgentState;
use zoea_protocol::AgentSummary;
use zoea_protocol::BroadcastRecord;
use zoea_protocol::MemoryRecord;
use zoea_protocol::MemoryRole;
use zoea_protocol::MemorySource;
use zoea_protocol::ProviderCatalog;
use zoea_protocol::SwarmError;
use zoea_protocol::SwarmEvent;
use zoea_protocol::SwarmEventKind;
use zoea_protocol::tool_calls::ToolCallRecord;
use zoea_protocol::tool_calls::encode_tool_calls;
use zoea_tui::SwarmClient;

const MEMORY_HISTORY: usize = 500;
const BROADCAST_HISTORY: usize = 100;
/// Memories attached to each summary returned by `list_agents`.
const SUMMARY_MEMORIES: usize = 8;

const ERROR_RATE: f64 = 0.03;
const TOOL_CALL_RATE: f64 = 0.6;
const REASONING_RATE: f64 = 0.5;
const BROADCAST_RATE: f64 = 0.08;

const DEMO_NAMES: &[&str] = &[
    "nova", "vega", "orion", "lyra", "rigel", "deneb", "altair", "sirius",
];
const DEMO_ORDERS: &str = "Scout the nearest asteroid belt and report back.";

const SYSTEMS: &[&str] = &["sol", "alpha_centauri", "barnard", "wolf_359", "sirius"];

const REPLIES: &[&str] = &[
    "Hold is at half capacity, continuing the mining run.",
    "Market prices look flat today. Holding cargo for now.",
    "Docked at the station. Refuelling before the next jump.",
    "No hostiles on scanner. Proceeding with the survey.",
    "Shields recharged. Ready for the next assignment.",
];

const REASONING: &[&str] = &[
    "Fuel is the constraint.\nThe belt is two jumps away.\nMining there pays for the trip.\nIron sells better at Sol.\nSo mine, then sell at Sol.",
    "The last scan showed a station nearby.\nDocking is cheaper than travelling back.",
    "Nothing urgent in the inbox.\nKeep working the current plan.",
];

const PROVIDER_FAILURES: &[&str] = &[
    "429 rate limit exceeded",
    "request timed out after 30s",
    "502 bad gateway",
    "connection reset by peer",
];

const STATUS_BROADCASTS: &[&str] = &[
    "Cargo hold full, heading back to the station.",
    "Pirates spotted near the outer belt, keep clear.",
    "Ore prices are up at Sol Central.",
    "Found a rich iron deposit in the inner belt.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tool {
    GetShip,
    Travel,
    Mine,
    Scan,
    Sell,
    Attack,
}

const TOOLS: &[Tool] = &[
    Tool::GetShip,
    Tool::Travel,
    Tool::Mine,
    Tool::Scan,
    Tool::Sell,
    Tool::Attack,
];

impl Tool {
    fn name(self) -> &'static str {
        match self {
            Tool::GetShip => "get_ship",
            Tool::Travel => "travel",
            Tool::Mine => "mine",
            Tool::Scan => "scan_system",
            Tool::Sell => "sell_cargo",
            Tool::Attack => "attack",
        }
    }

    fn arguments<R: Rng>(self, rng: &mut R) -> Value {
        match self {
            Tool::GetShip => json!({}),
            Tool::Travel => json!({ "destination": pick(SYSTEMS, rng) }),
            Tool::Mine => json!({ "target": "asteroid_belt", "cycles": rng.random_range(1..5) }),
            Tool::Scan => json!({ "range": rng.random_range(1..4) }),
            Tool::Sell => json!({ "item": "iron_ore", "quantity": rng.random_range(5..50) }),
            Tool::Attack => json!({ "target": "pirate_drone" }),
        }
    }

    fn result<R: Rng>(self, rng: &mut R) -> Value {
        match self {
            Tool::GetShip => json!({
                "ship": {
                    "name": "Zoea",
                    "hull": rng.random_range(60..=100),
                    "fuel": rng.random_range(20..=100),
                    "cargo": ["iron_ore", "ice"],
                }
            }),
            Tool::Travel => json!({ "status": "en_route", "eta_ticks": rng.random_range(3..12) }),
            Tool::Mine => json!({
                "mined": { "iron_ore": rng.random_range(1..20) },
                "cargo_used": rng.random_range(10..90),
            }),
            Tool::Scan => {
                let count = rng.random_range(2..10);
                let contacts: Vec<Value> = (0..count)
                    .map(|idx| {
                        let kind = if rng.random_bool(0.7) { "asteroid" } else { "ship" };
                        json!({ "id": idx, "kind": kind, "distance": rng.random_range(1..50) })
                    })
                    .collect();
                json!({ "system": pick(SYSTEMS, rng), "contacts": contacts })
            }
            Tool::Sell => json!({
                "credits_earned": rng.random_range(100..2000),
                "market": "sol_central",
            }),
            Tool::Attack => {
                let outcome = if rng.random_bool(0.7) { "victory" } else { "retreat" };
                json!({ "outcome": outcome, "hull_damage": rng.random_range(0..30) })
            }
        }
    }

    /// In-game activity the call starts, if any.
    fn activity(self) -> Option<ActivityState> {
        match self {
            Tool::Travel => Some(ActivityState::Traveling),
            Tool::Mine => Some(ActivityState::Mining),
            Tool::Attack => Some(ActivityState::InCombat),
            Tool::GetShip | Tool::Scan | Tool::Sell => None,
        }
    }
}

fn pick<R: Rng>(choices: &[&'static str], rng: &mut R) -> &'static str {
    choices.choose(rng).copied().unwrap_or_default()
}

#[derive(Debug)]
enum Phase {
    Resting {
        remaining: u32,
    },
    Thinking {
        remaining: u32,
        prompt: Option<String>,
    },
    CallingTool {
        remaining: u32,
        call_id: String,
        tool: Tool,
    },
    Acting {
        remaining: u32,
    },
    Cooling {
        remaining: u32,
    },
}

impl Phase {
    fn rest<R: Rng>(rng: &mut R) -> Self {
        Phase::Resting {
            remaining: rng.random_range(2..8),
        }
    }

    fn on_network(&self) -> bool {
        matches!(self, Phase::Thinking { .. } | Phase::CallingTool { .. })
    }

    /// Count down one beat. `false` once the phase is over.
    fn tick_down(&mut self) -> bool {
        let remaining = match self {
            Phase::Resting { remaining }
            | Phase::Thinking { remaining, .. }
            | Phase::CallingTool { remaining, .. }
            | Phase::Acting { remaining }
            | Phase::Cooling { remaining } => remaining,
        };
        if *remaining == 0 {
            return false;
        }
        *remaining -= 1;
        true
    }
}

struct AgentRecord {
    summary: AgentSummary,
    /// Oldest first.
    memories: VecDeque<MemoryRecord>,
    inbox: VecDeque<String>,
    phase: Phase,
}

impl AgentRecord {
    fn new(summary: AgentSummary) -> Self {
        Self {
            summary,
            memories: VecDeque::new(),
            inbox: VecDeque::new(),
            phase: Phase::Resting { remaining: 0 },
        }
    }

    fn snapshot(&self) -> AgentSummary {
        let mut summary = self.summary.clone();
        summary.recent_memories = self
            .memories
            .iter()
            .rev()
            .take(SUMMARY_MEMORIES)
            .cloned()
            .collect();
        summary
    }

    fn event(&self, kind: SwarmEventKind) -> SwarmEvent {
        SwarmEvent::for_agent(kind, &self.summary.id, &self.summary.name)
    }

    fn remember(&mut self, memory: MemoryRecord) {
        let memory = match memory.created_at {
            Some(_) => memory,
            None => memory.with_created_at(Utc::now()),
        };
        self.memories.push_back(memory);
        while self.memories.len() > MEMORY_HISTORY {
            self.memories.pop_front();
        }
    }

    fn set_activity(&mut self, activity: ActivityState, events: &mut Vec<SwarmEvent>) {
        if self.summary.activity == activity {
            return;
        }
        self.summary.activity = activity;
        events.push(
            self.event(SwarmEventKind::AgentStateChanged)
                .with_message(activity.to_string()),
        );
    }

    /// Abandon whatever the mysis is doing, closing any network call in flight.
    fn interrupt(&mut self, events: &mut Vec<SwarmEvent>) {
        if self.phase.on_network() {
            events.push(self.event(SwarmEventKind::NetworkIdle));
        }
        self.phase = Phase::Resting { remaining: 0 };
        self.summary.activity = ActivityState::Idle;
    }

    fn receive_direct(&mut self, text: &str, events: &mut Vec<SwarmEvent>) -> Result<(), SwarmError> {
        if self.summary.state != AgentState::Running {
            return Err(SwarmError::AgentNotRunning(self.summary.name.clone()));
        }
        self.remember(MemoryRecord::new(
            MemoryRole::User,
            MemorySource::Direct,
            text,
        ));
        events.push(self.event(SwarmEventKind::AgentMessage).with_message(text));
        Ok(())
    }

    /// Advance one beat. Returns a status line the mysis wants to broadcast.
    fn advance<R: Rng>(
        &mut self,
        next_call: &mut u64,
        rng: &mut R,
        events: &mut Vec<SwarmEvent>,
    ) -> Option<String> {
        let has_mail = matches!(self.phase, Phase::Resting { .. }) && !self.inbox.is_empty();
        if !has_mail && self.phase.tick_down() {
            return None;
        }
        match std::mem::replace(&mut self.phase, Phase::Resting { remaining: 0 }) {
            Phase::Resting { .. } => {
                let prompt = self.inbox.pop_front();
                self.phase = Phase::Thinking {
                    remaining: rng.random_range(1..4),
                    prompt,
                };
                self.set_activity(ActivityState::LlmCall, events);
                events.push(self.event(SwarmEventKind::NetworkLlm));
                None
            }
            Phase::Thinking { prompt, .. } => self.finish_thinking(prompt, next_call, rng, events),
            Phase::CallingTool { call_id, tool, .. } => {
                self.finish_tool(&call_id, tool, rng, events);
                None
            }
            Phase::Acting { .. } => {
                self.set_activity(ActivityState::Cooldown, events);
                self.phase = Phase::Cooling { remaining: 1 };
                None
            }
            Phase::Cooling { .. } => {
                self.set_activity(ActivityState::Idle, events);
                self.phase = Phase::rest(rng);
                None
            }
        }
    }

    fn finish_thinking<R: Rng>(
        &mut self,
        prompt: Option<String>,
        next_call: &mut u64,
        rng: &mut R,
        events: &mut Vec<SwarmEvent>,
    ) -> Option<String> {
        events.push(self.event(SwarmEventKind::NetworkIdle));
        if rng.random_bool(ERROR_RATE) {
            self.fail(rng, events);
            return None;
        }

        if prompt.is_none() && rng.random_bool(TOOL_CALL_RATE) {
            let tool = TOOLS.choose(rng).copied().unwrap_or(Tool::GetShip);
            *next_call += 1;
            let call_id = format!("call_{next_call}");
            let call = ToolCallRecord::new(&call_id, tool.name(), tool.arguments(rng).to_string());
            self.remember(MemoryRecord::new(
                MemoryRole::Assistant,
                MemorySource::Llm,
                encode_tool_calls(&[call]),
            ));
            events.push(self.event(SwarmEventKind::AgentResponse));
            self.set_activity(ActivityState::McpCall, events);
            events.push(self.event(SwarmEventKind::NetworkMcp));
            self.phase = Phase::CallingTool {
                remaining: rng.random_range(1..3),
                call_id,
                tool,
            };
            return None;
        }

        let mut reply = MemoryRecord::new(
            MemoryRole::Assistant,
            MemorySource::Llm,
            compose_reply(prompt.as_deref(), rng),
        );
        if rng.random_bool(REASONING_RATE) {
            reply = reply.with_reasoning(pick(REASONING, rng));
        }
        self.remember(reply);
        events.push(self.event(SwarmEventKind::AgentResponse));
        self.set_activity(ActivityState::Idle, events);
        self.phase = Phase::rest(rng);

        if rng.random_bool(BROADCAST_RATE) {
            Some(pick(STATUS_BROADCASTS, rng).to_string())
        } else {
            None
        }
    }

    fn finish_tool<R: Rng>(
        &mut self,
        call_id: &str,
        tool: Tool,
        rng: &mut R,
        events: &mut Vec<SwarmEvent>,
    ) {
        events.push(self.event(SwarmEventKind::NetworkIdle));
        self.remember(MemoryRecord::new(
            MemoryRole::Tool,
            MemorySource::Tool,
            format!("{call_id}:{}", tool.result(rng)),
        ));
        events.push(self.event(SwarmEventKind::AgentResponse));
        match tool.activity() {
            Some(activity) => {
                self.set_activity(activity, events);
                self.phase = Phase::Acting {
                    remaining: rng.random_range(2..6),
                };
            }
            None => {
                self.set_activity(ActivityState::Idle, events);
                self.phase = Phase::rest(rng);
            }
        }
    }

    fn fail<R: Rng>(&mut self, rng: &mut R, events: &mut Vec<SwarmEvent>) {
        let message = format!("{}: {}", self.summary.provider, pick(PROVIDER_FAILURES, rng));
        tracing::warn!(agent = %self.summary.id, "simulated provider failure: {message}");
        self.summary.state = AgentState::Errored;
        self.summary.activity = ActivityState::Idle;
        self.summary.last_error = Some(message.clone());
        self.phase = Phase::Resting { remaining: 0 };
        self.remember(MemoryRecord::new(
            MemoryRole::System,
            MemorySource::System,
            format!("LLM call failed: {message}"),
        ));
        events.push(self.event(SwarmEventKind::AgentError).with_message(message));
        events.push(self.event(SwarmEventKind::AgentStateChanged).with_message("errored"));
    }
}

fn compose_reply<R: Rng>(prompt: Option<&str>, rng: &mut R) -> String {
    let status = pick(REPLIES, rng);
    match prompt {
        Some(prompt) => format!("Copy that: \"{}\". {status}", prompt.trim()),
        None => status.to_string(),
    }
}

fn require_text(text: &str) -> Result<&str, SwarmError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SwarmError::Backend("message is empty".to_string()));
    }
    Ok(text)
}

#[derive(Default)]
struct SwarmState {
    /// Creation order.
    agents: Vec<AgentRecord>,
    /// Newest first.
    broadcasts: VecDeque<BroadcastRecord>,
    tick: i64,
    next_call: u64,
}

impl SwarmState {
    fn agent(&self, id: &str) -> Result<&AgentRecord, SwarmError> {
        self.agents
            .iter()
            .find(|agent| agent.summary.id == id)
            .ok_or_else(|| SwarmError::AgentNotFound(id.to_string()))
    }

    fn agent_mut(&mut self, id: &str) -> Result<&mut AgentRecord, SwarmError> {
        self.agents
            .iter_mut()
            .find(|agent| agent.summary.id == id)
            .ok_or_else(|| SwarmError::AgentNotFound(id.to_string()))
    }

    /// Store a broadcast and copy it into every mysis' memory. Broadcasts from the commander
    /// (`sender == None`) are also queued for running myses to react to.
    fn deliver_broadcast(
        &mut self,
        sender: Option<(String, String)>,
        content: &str,
        events: &mut Vec<SwarmEvent>,
    ) {
        self.broadcasts.push_front(BroadcastRecord {
            sender_id: sender.as_ref().map(|(id, _)| id.clone()),
            sender_name: sender.as_ref().map(|(_, name)| name.clone()),
            content: content.to_string(),
            created_at: Some(Utc::now()),
        });
        self.broadcasts.truncate(BROADCAST_HISTORY);

        for agent in &mut self.agents {
            let own = sender
                .as_ref()
                .is_some_and(|(id, _)| *id == agent.summary.id);
            let mut memory = if own {
                MemoryRecord::new(MemoryRole::Assistant, MemorySource::BroadcastSelf, content)
            } else {
                MemoryRecord::new(MemoryRole::User, MemorySource::Broadcast, content)
            };
            if let Some((id, name)) = &sender {
                memory = memory.with_sender(id, name);
            }
            agent.remember(memory);
            if own {
                continue;
            }
            if sender.is_none() && agent.summary.state == AgentState::Running {
                agent.inbox.push_back(content.to_string());
            }
            events.push(agent.event(SwarmEventKind::AgentMessage));
        }

        let event = match sender {
            Some((id, name)) => SwarmEvent::for_agent(SwarmEventKind::Broadcast, id, name),
            None => SwarmEvent::new(SwarmEventKind::Broadcast),
        };
        events.push(event.with_message(content));
    }

    fn advance<R: Rng>(&mut self, rng: &mut R, events: &mut Vec<SwarmEvent>) {
        self.tick += 1;
        let mut outgoing = Vec::new();
        let next_call = &mut self.next_call;
        for agent in self
            .agents
            .iter_mut()
            .filter(|agent| agent.summary.state == AgentState::Running)
        {
            if let Some(status) = agent.advance(next_call, rng, events) {
                outgoing.push((agent.summary.id.clone(), agent.summary.name.clone(), status));
            }
        }
        for (id, name, status) in outgoing {
            self.deliver_broadcast(Some((id, name)), &status, events);
        }
    }
}

pub struct LocalSwarm {
    providers: ProviderCatalog,
    events: UnboundedSender<SwarmEvent>,
    state: Mutex<SwarmState>,
    shut_down: AtomicBool,
}

impl LocalSwarm {
    pub fn new(providers: ProviderCatalog, events: UnboundedSender<SwarmEvent>) -> Self {
        Self {
            providers,
            events,
            state: Mutex::new(SwarmState::default()),
            shut_down: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SwarmState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the state under the lock, then publish the events it produced.
    fn apply<T>(&self, f: impl FnOnce(&mut SwarmState, &mut Vec<SwarmEvent>) -> T) -> T {
        let mut events = Vec::new();
        let result = {
            let mut state = self.lock();
            f(&mut state, &mut events)
        };
        for event in events {
            if self.events.send(event).is_err() {
                break;
            }
        }
        result
    }

    fn resolve_provider(&self, provider: &str) -> Result<String, SwarmError> {
        let provider = match provider.trim() {
            "" => self.providers.default_provider(),
            name => name,
        };
        if !self.providers.contains(provider) {
            return Err(SwarmError::UnknownProvider(provider.to_string()));
        }
        Ok(provider.to_string())
    }

    /// Create, start and brief `count` demo myses, spreading them over the known providers.
    pub fn seed(&self, count: usize) -> Result<Vec<AgentSummary>, SwarmError> {
        let providers = self.providers.providers();
        let mut seeded = Vec::with_capacity(count);
        for idx in 0..count {
            let name = match DEMO_NAMES.get(idx) {
                Some(name) => (*name).to_string(),
                None => format!("mysis-{}", idx + 1),
            };
            let provider = providers
                .get(idx % providers.len().max(1))
                .map_or(self.providers.default_provider(), |p| p.name.as_str());
            let agent = self.create_agent(&name, provider)?;
            self.start_agent(&agent.id)?;
            self.send_message(&agent.id, DEMO_ORDERS)?;
            seeded.push(agent);
        }
        tracing::info!(count, "seeded demo myses");
        Ok(seeded)
    }

    /// Advance every running mysis by one beat.
    pub fn step<R: Rng>(&self, rng: &mut R) {
        self.apply(|state, events| state.advance(rng, events));
    }

    /// Drive [`LocalSwarm::step`] every `period` until [`SwarmClient::shutdown`] is called.
    pub fn spawn_simulation(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let swarm = Arc::clone(self);
        tokio::spawn(async move {
            let mut rng = StdRng::from_os_rng();
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if swarm.shut_down.load(Ordering::Acquire) {
                    break;
                }
                swarm.step(&mut rng);
            }
            tracing::debug!("local swarm simulation stopped");
        })
    }
}

impl SwarmClient for LocalSwarm {
    fn list_agents(&self) -> Result<Vec<AgentSummary>, SwarmError> {
        Ok(self.lock().agents.iter().map(AgentRecord::snapshot).collect())
    }

    fn create_agent(&self, name: &str, provider: &str) -> Result<AgentSummary, SwarmError> {
        let name = name.trim();
        if name.is_empty() || name.chars().any(char::is_control) {
            return Err(SwarmError::InvalidName(name.to_string()));
        }
        let provider = self.resolve_provider(provider)?;
        let model = self.providers.default_model_for(&provider).to_string();

        self.apply(move |state, events| {
            if state.agents.iter().any(|agent| agent.summary.name == name) {
                return Err(SwarmError::InvalidName(name.to_string()));
            }
            let mut agent = AgentRecord::new(AgentSummary {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                provider,
                model: Some(model),
                created_at: Utc::now(),
                ..AgentSummary::default()
            });
            agent.remember(MemoryRecord::new(
                MemoryRole::System,
                MemorySource::System,
                format!("You are {name}, a mysis of the zoea swarm. Mine, trade and keep the swarm informed."),
            ));
            events.push(agent.event(SwarmEventKind::AgentCreated));
            let summary = agent.snapshot();
            state.agents.push(agent);
            tracing::info!(agent = %summary.id, name, "mysis created");
            Ok(summary)
        })
    }

    fn start_agent(&self, id: &str) -> Result<(), SwarmError> {
        self.apply(|state, events| {
            let agent = state.agent_mut(id)?;
            if agent.summary.state == AgentState::Running {
                return Ok(());
            }
            agent.summary.state = AgentState::Running;
            agent.summary.last_error = None;
            if agent.summary.account.is_none() {
                agent.summary.account = Some(format!("{}_pilot", agent.summary.name));
            }
            agent.interrupt(events);
            events.push(
                agent
                    .event(SwarmEventKind::AgentStateChanged)
                    .with_message("running"),
            );
            Ok(())
        })
    }

    fn stop_agent(&self, id: &str) -> Result<(), SwarmError> {
        self.apply(|state, events| {
            let agent = state.agent_mut(id)?;
            if agent.summary.state == AgentState::Stopped {
                return Ok(());
            }
            agent.interrupt(events);
            agent.summary.state = AgentState::Stopped;
            events.push(
                agent
                    .event(SwarmEventKind::AgentStateChanged)
                    .with_message("stopped"),
            );
            Ok(())
        })
    }

    fn delete_agent(&self, id: &str, force: bool) -> Result<(), SwarmError> {
        self.apply(|state, events| {
            let idx = state
                .agents
                .iter()
                .position(|agent| agent.summary.id == id)
                .ok_or_else(|| SwarmError::AgentNotFound(id.to_string()))?;
            let agent = &mut state.agents[idx];
            if !force && agent.summary.state == AgentState::Running {
                return Err(SwarmError::AgentBusy(agent.summary.name.clone()));
            }
            agent.interrupt(events);
            let agent = state.agents.remove(idx);
            events.push(agent.event(SwarmEventKind::AgentDeleted));
            tracing::info!(agent = %agent.summary.id, force, "mysis deleted");
            Ok(())
        })
    }

    fn configure_agent(&self, id: &str, provider: &str, model: &str) -> Result<(), SwarmError> {
        let provider = self.resolve_provider(provider)?;
        let model = match model.trim() {
            "" => self.providers.default_model_for(&provider),
            model => model,
        }
        .to_string();
        let label = format!("{provider}/{model}");

        self.apply(move |state, events| {
            let agent = state.agent_mut(id)?;
            agent.summary.provider = provider;
            agent.summary.model = Some(model);
            agent.remember(MemoryRecord::new(
                MemoryRole::System,
                MemorySource::System,
                format!("Now using {label}"),
            ));
            events.push(
                agent
                    .event(SwarmEventKind::AgentConfigChanged)
                    .with_message(label),
            );
            Ok(())
        })
    }

    fn send_message(&self, id: &str, text: &str) -> Result<(), SwarmError> {
        let text = require_text(text)?;
        let mut rng = rand::rng();
        self.apply(|state, events| {
            let agent = state.agent_mut(id)?;
            agent.receive_direct(text, events)?;
            events.push(agent.event(SwarmEventKind::NetworkLlm));
            agent.remember(MemoryRecord::new(
                MemoryRole::Assistant,
                MemorySource::Llm,
                compose_reply(Some(text), &mut rng),
            ));
            events.push(agent.event(SwarmEventKind::NetworkIdle));
            events.push(agent.event(SwarmEventKind::AgentResponse));
            Ok(())
        })
    }

    fn send_message_async(&self, id: &str, text: &str) -> Result<(), SwarmError> {
        let text = require_text(text)?;
        self.apply(|state, events| {
            let agent = state.agent_mut(id)?;
            agent.receive_direct(text, events)?;
            agent.inbox.push_back(text.to_string());
            Ok(())
        })
    }

    fn broadcast(&self, text: &str) -> Result<(), SwarmError> {
        let text = require_text(text)?;
        self.apply(|state, events| state.deliver_broadcast(None, text, events));
        tracing::info!("broadcast delivered");
        Ok(())
    }

    fn aggregate_tick(&self) -> i64 {
        self.lock().tick
    }

    fn get_recent_memories(&self, id: &str, limit: usize) -> Result<Vec<MemoryRecord>, SwarmError> {
        let state = self.lock();
        let agent = state.agent(id)?;
        let skip = agent.memories.len().saturating_sub(limit);
        Ok(agent.memories.iter().skip(skip).cloned().collect())
    }

    fn get_recent_broadcasts(&self, limit: usize) -> Result<Vec<BroadcastRecord>, SwarmError> {
        Ok(self.lock().broadcasts.iter().take(limit).cloned().collect())
    }

    fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        let stopped = self.apply(|state, events| {
            let mut stopped = 0usize;
            for agent in &mut state.agents {
                if agent.summary.state == AgentState::Running {
                    agent.interrupt(events);
                    agent.summary.state = AgentState::Stopped;
                    stopped += 1;
                }
            }
            stopped
        });
        tracing::info!(stopped, "local swarm shut down");
    }
}
