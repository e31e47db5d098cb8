// Forbid accidental stdout/stderr writes in the library portion of the TUI.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod exit;

mod animation;
mod ansi_escape;
mod app_event;
mod bottom_pane;
mod history_cell;
mod json_tree;
mod layout;
mod message_row;
mod model;
mod network_activity;
mod provider_health;
mod render;
mod runner;
mod swarm_client;
mod terminal;
mod text_formatting;
mod theme;
mod version;
mod viewport;

#[cfg(test)]
mod test_support;

pub use app_event::AppCommand;
pub use app_event::AppEvent;
pub use exit::AppExitInfo;
pub use exit::ExitReason;
pub use model::Model;
pub use render::render_frame;
pub use runner::DEFAULT_TICK_INTERVAL;
pub use runner::DashboardOptions;
pub use runner::run_dashboard;
pub use swarm_client::SwarmClient;
pub use theme::Theme;
pub use version::ZOEA_VERSION;
