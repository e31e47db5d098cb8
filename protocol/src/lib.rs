//! Domain types shared between the swarm orchestrator and the dashboard.

pub mod agent;
pub mod error;
pub mod event;
pub mod memory;
pub mod provider;
pub mod tool_calls;

pub use agent::ActivityState;
pub use agent::AgentState;
pub use agent::AgentSummary;
pub use error::SwarmError;
pub use event::SwarmEvent;
pub use event::SwarmEventKind;
pub use memory::BroadcastRecord;
pub use memory::MemoryRecord;
pub use memory::MemoryRole;
pub use memory::MemorySource;
pub use provider::ProviderCatalog;
pub use provider::ProviderInfo;
