use zoea_protocol::AgentSummary;
use zoea_protocol::BroadcastRecord;
use zoea_protocol::MemoryRecord;
use zoea_protocol::SwarmError;

/// The orchestrator and memory store, as seen by the dashboard.
///
/// Calls are synchronous. Anything that may wait on a model provider (`send_message_async`,
/// `broadcast`) is only ever invoked from a blocking task spawned by the runner, never from
/// [`crate::Model::update`].
pub trait SwarmClient: Send + Sync {
    fn list_agents(&self) -> Result<Vec<AgentSummary>, SwarmError>;

    fn create_agent(&self, name: &str, provider: &str) -> Result<AgentSummary, SwarmError>;

    fn start_agent(&self, id: &str) -> Result<(), SwarmError>;

    fn stop_agent(&self, id: &str) -> Result<(), SwarmError>;

    /// Delete a mysis. Without `force`, a running mysis is refused with
    /// [`SwarmError::AgentBusy`].
    fn delete_agent(&self, id: &str, force: bool) -> Result<(), SwarmError>;

    fn configure_agent(&self, id: &str, provider: &str, model: &str) -> Result<(), SwarmError>;

    /// Deliver a direct message and wait for it to be accepted.
    fn send_message(&self, id: &str, text: &str) -> Result<(), SwarmError>;

    /// Deliver a direct message without waiting for the mysis to react to it.
    fn send_message_async(&self, id: &str, text: &str) -> Result<(), SwarmError>;

    fn broadcast(&self, text: &str) -> Result<(), SwarmError>;

    /// Monotonic logical clock shown next to log timestamps.
    fn aggregate_tick(&self) -> i64;

    /// Up to `limit` most recent memories of one mysis, oldest first.
    fn get_recent_memories(&self, id: &str, limit: usize) -> Result<Vec<MemoryRecord>, SwarmError>;

    /// Up to `limit` most recent broadcasts, newest first.
    fn get_recent_broadcasts(&self, limit: usize) -> Result<Vec<BroadcastRecord>, SwarmError>;

    /// Best-effort cleanup when the dashboard quits.
    fn shutdown(&self) {}
}
