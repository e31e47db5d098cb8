//! Messages into and out of the dashboard state machine.

use crossterm::event::KeyEvent;
use derive_more::IsVariant;
use zoea_protocol::SwarmError;
use zoea_protocol::SwarmEvent;

/// Everything that can change dashboard state. The runner merges terminal input, animation
/// ticks, orchestrator events and finished background tasks into one queue of these.
#[derive(Debug, Clone, PartialEq, IsVariant)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Resize { width: u16, height: u16 },
    /// Animation frame.
    Tick,
    Swarm(SwarmEvent),
    MessageSent {
        agent_id: String,
        result: Result<(), SwarmError>,
    },
    BroadcastSent {
        result: Result<(), SwarmError>,
    },
}

/// Follow-up work requested by [`crate::Model::update`]. Send and broadcast run on a blocking
/// task and report back with the matching `AppEvent` completion.
#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum AppCommand {
    SendMessage { agent_id: String, text: String },
    Broadcast { text: String },
    Quit,
}
