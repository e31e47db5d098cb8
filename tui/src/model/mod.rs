//! The dashboard state machine.
//!
//! [`Model::update`] is the only place state changes. It handles one [`AppEvent`] at a time and
//! returns the follow-up [`AppCommand`]s for the runner to execute. Renderers only read the
//! model.

mod dashboard;
mod focus;
mod input;
mod swarm_events;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use zoea_protocol::AgentSummary;
use zoea_protocol::BroadcastRecord;
use zoea_protocol::ProviderCatalog;
use zoea_protocol::SwarmError;

pub use focus::FocusView;

use crate::app_event::AppCommand;
use crate::app_event::AppEvent;
use crate::bottom_pane::InputHistory;
use crate::bottom_pane::InputSession;
use crate::network_activity::NetworkActivity;
use crate::provider_health::ProviderHealth;
use crate::swarm_client::SwarmClient;
use crate::theme::Theme;

/// Memories loaded for the focused mysis.
pub const FOCUS_MEMORY_LIMIT: usize = 200;
/// Broadcasts kept for the dashboard list.
pub const BROADCAST_LIMIT: usize = 10;

/// The active top-level view.
#[derive(Debug)]
pub enum View {
    Dashboard,
    Focus(Box<FocusView>),
}

pub struct Model {
    swarm: Arc<dyn SwarmClient>,
    providers: ProviderCatalog,
    theme: Theme,

    agents: Vec<AgentSummary>,
    broadcasts: Vec<BroadcastRecord>,
    selected: usize,
    view: View,

    input: Option<InputSession>,
    history: InputHistory,
    show_help: bool,
    verbose: bool,

    error: Option<String>,
    notice: Option<String>,

    network: NetworkActivity,
    sending: HashSet<String>,
    pending_broadcasts: usize,
    provider_health: ProviderHealth,

    tick: i64,
    frame: usize,
    width: u16,
    height: u16,
    quitting: bool,
}

impl Model {
    pub fn new(
        swarm: Arc<dyn SwarmClient>,
        providers: ProviderCatalog,
        theme: Theme,
        width: u16,
        height: u16,
    ) -> Self {
        let mut model = Self {
            swarm,
            providers,
            theme,
            agents: Vec::new(),
            broadcasts: Vec::new(),
            selected: 0,
            view: View::Dashboard,
            input: None,
            history: InputHistory::new(),
            show_help: false,
            verbose: false,
            error: None,
            notice: None,
            network: NetworkActivity::default(),
            sending: HashSet::new(),
            pending_broadcasts: 0,
            provider_health: ProviderHealth::default(),
            tick: 0,
            frame: 0,
            width,
            height,
            quitting: false,
        };
        model.refresh_all();
        model
    }

    /// Apply one event and return the commands it produced.
    pub fn update(&mut self, event: AppEvent) -> Vec<AppCommand> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Paste(text) => {
                if let Some(session) = self.input.as_mut() {
                    session.insert_str(&text);
                }
                Vec::new()
            }
            AppEvent::Resize { width, height } => {
                self.resize(width, height);
                Vec::new()
            }
            AppEvent::Tick => {
                self.on_tick(Instant::now());
                Vec::new()
            }
            AppEvent::Swarm(event) => {
                self.handle_swarm_event(event, Instant::now());
                Vec::new()
            }
            AppEvent::MessageSent { agent_id, result } => {
                self.on_message_sent(&agent_id, result);
                Vec::new()
            }
            AppEvent::BroadcastSent { result } => {
                self.on_broadcast_sent(result);
                Vec::new()
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<AppCommand> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return self.quit();
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return Vec::new();
        }
        if self.input.is_some() {
            return self.handle_input_key(key);
        }
        if key.code == KeyCode::Esc {
            self.error = None;
            self.notice = None;
            if self.is_focus() {
                self.leave_focus();
            }
            return Vec::new();
        }
        match key.code {
            KeyCode::Char('q') => return self.quit(),
            KeyCode::Char('?') => {
                self.show_help = true;
                return Vec::new();
            }
            KeyCode::Char('v') => {
                self.verbose = !self.verbose;
                self.rerender_focus();
                return Vec::new();
            }
            _ => {}
        }
        if self.is_focus() {
            self.handle_focus_key(key)
        } else {
            self.handle_dashboard_key(key)
        }
    }

    fn quit(&mut self) -> Vec<AppCommand> {
        self.quitting = true;
        self.input = None;
        vec![AppCommand::Quit]
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.relayout_focus();
    }

    fn on_tick(&mut self, now: Instant) {
        self.frame = self.frame.wrapping_add(1);
        self.provider_health.prune(now);
        self.tick = self.swarm.aggregate_tick();
    }

    /// Store a collaborator failure for the status bar.
    fn set_error(&mut self, context: &str, err: &SwarmError) {
        tracing::warn!("{context}: {err}");
        self.notice = None;
        self.error = Some(format!("{context}: {err}"));
    }

    /// Record a successful operation: clears any surfaced error.
    fn set_notice(&mut self, notice: impl Into<String>) {
        self.error = None;
        self.notice = Some(notice.into());
    }

    fn refresh_all(&mut self) {
        self.tick = self.swarm.aggregate_tick();
        self.refresh_agents();
        self.refresh_broadcasts();
    }

    /// Replace the mysis list wholesale, ordered by creation time.
    pub(crate) fn refresh_agents(&mut self) {
        let selected_id = self.selected_agent().map(|agent| agent.id.clone());
        match self.swarm.list_agents() {
            Ok(mut agents) => {
                agents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
                self.agents = agents;
            }
            Err(err) => {
                self.set_error("Failed to list myses", &err);
                return;
            }
        }
        self.selected = selected_id
            .and_then(|id| self.agents.iter().position(|agent| agent.id == id))
            .unwrap_or(self.selected)
            .min(self.agents.len().saturating_sub(1));
    }

    fn refresh_broadcasts(&mut self) {
        match self.swarm.get_recent_broadcasts(BROADCAST_LIMIT) {
            Ok(mut broadcasts) => {
                broadcasts.truncate(BROADCAST_LIMIT);
                self.broadcasts = broadcasts;
            }
            Err(err) => self.set_error("Failed to load broadcasts", &err),
        }
    }

    pub fn agents(&self) -> &[AgentSummary] {
        &self.agents
    }

    pub fn broadcasts(&self) -> &[BroadcastRecord] {
        &self.broadcasts
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_agent(&self) -> Option<&AgentSummary> {
        self.agents.get(self.selected)
    }

    pub fn agent(&self, id: &str) -> Option<&AgentSummary> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn is_focus(&self) -> bool {
        matches!(self.view, View::Focus(_))
    }

    pub fn focus(&self) -> Option<&FocusView> {
        match &self.view {
            View::Focus(focus) => Some(focus),
            View::Dashboard => None,
        }
    }

    pub fn input(&self) -> Option<&InputSession> {
        self.input.as_ref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn network(&self) -> NetworkActivity {
        self.network
    }

    /// Whether a direct message to `agent_id` is still in flight.
    pub fn is_sending(&self, agent_id: &str) -> bool {
        self.sending.contains(agent_id)
    }

    pub fn pending_broadcasts(&self) -> usize {
        self.pending_broadcasts
    }

    pub fn provider_errors(&self, now: Instant) -> usize {
        self.provider_health.recent_count(now)
    }

    pub fn providers(&self) -> &ProviderCatalog {
        &self.providers
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn tick(&self) -> i64 {
        self.tick
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }
}
