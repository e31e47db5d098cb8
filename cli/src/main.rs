mod atomic_write;
mod config;
mod local_swarm;

use std::fs::File;
use std::fs::OpenOptions;
use std::num::NonZeroU64;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use clap::Subcommand;
use tokio::sync::mpsc::unbounded_channel;
use tracing_subscriber::EnvFilter;
use zoea_tui::DashboardOptions;
use zoea_tui::ExitReason;
use zoea_tui::SwarmClient;
use zoea_tui::Theme;

use crate::config::ConfigStore;
use crate::local_swarm::LocalSwarm;

#[derive(Parser, Debug)]
#[command(version, about = "Terminal dashboard for a swarm of autonomous myses")]
struct Cli {
    /// Config file with provider settings. Defaults to `~/.zoea/config.toml`.
    #[arg(long, env = "ZOEA_CONFIG")]
    config: Option<PathBuf>,

    /// Where to write logs. Defaults to `~/.zoea/zoea.log`; the filter comes from `RUST_LOG`.
    #[arg(long, env = "ZOEA_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Number of demo myses to seed into the local swarm.
    #[arg(long, default_value_t = 3)]
    agents: usize,

    /// Animation period of the dashboard in milliseconds (must be >= 1).
    #[arg(long, default_value = "100")]
    tick_ms: NonZeroU64,

    /// How often the local swarm advances its myses, in milliseconds (must be >= 1).
    #[arg(long, default_value = "700")]
    sim_ms: NonZeroU64,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Write a starter config file unless one already exists.
    Init,
    /// Set the provider (and optionally the model) used for new myses.
    SetDefault {
        provider: String,
        model: Option<String>,
    },
}

fn parse_cli() -> Cli {
    let matches = Cli::command().version(zoea_tui::ZOEA_VERSION).get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    let store = match &cli.config {
        Some(path) => ConfigStore::new(path.clone()),
        None => ConfigStore::new_default()?,
    };

    match &cli.command {
        Some(CliCommand::Init) => {
            if store.write_default()? {
                println!("Wrote {}", store.path().display());
            } else {
                println!("{} already exists, left untouched", store.path().display());
            }
            return Ok(());
        }
        Some(CliCommand::SetDefault { provider, model }) => {
            store
                .set_default_provider(provider, model.as_deref())
                .with_context(|| format!("update {}", store.path().display()))?;
            println!("Default provider set to {provider}");
            return Ok(());
        }
        None => {}
    }

    init_logging(cli.log_file.clone().or_else(default_log_path).as_deref());

    let providers = store.load_providers()?;
    tracing::info!(
        config = %store.path().display(),
        providers = %providers.provider_names().collect::<Vec<_>>().join(","),
        default_provider = providers.default_provider(),
        "configuration loaded"
    );

    let (event_tx, event_rx) = unbounded_channel();
    let swarm = Arc::new(LocalSwarm::new(providers.clone(), event_tx));
    swarm.seed(cli.agents).context("seed demo myses")?;
    let simulation = swarm.spawn_simulation(Duration::from_millis(cli.sim_ms.get()));

    let options = DashboardOptions {
        providers,
        theme: Theme::new(),
        tick_interval: Duration::from_millis(cli.tick_ms.get()),
    };
    let client: Arc<dyn SwarmClient> = swarm;
    let exit = zoea_tui::run_dashboard(client, event_rx, options).await;
    simulation.abort();
    let exit = exit?;

    match exit.exit_reason {
        ExitReason::UserRequested => {
            println!("{} myses, aggregate tick {}", exit.agent_count, exit.tick);
        }
        ExitReason::InputClosed => {
            eprintln!("terminal input closed; {} myses left stopped", exit.agent_count);
        }
    }
    Ok(())
}

fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".zoea").join("zoea.log"))
}

/// Send tracing output to `path`. The dashboard owns the terminal, so when the file cannot be
/// opened logging is simply left off.
fn init_logging(path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };
    let Ok(file) = open_log_file(path) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let initialized = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    if initialized.is_ok() {
        tracing::debug!(path = %path.display(), "logging initialized");
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["zoea"]).expect("parse args");
        assert_eq!(cli.agents, 3);
        assert_eq!(cli.tick_ms.get(), 100);
        assert!(cli.command.is_none());
    }

    #[test]
    fn tick_must_be_at_least_one_millisecond() {
        assert!(Cli::try_parse_from(["zoea", "--tick-ms", "0"]).is_err());
        assert!(Cli::try_parse_from(["zoea", "--tick-ms", "16"]).is_ok());
    }

    #[test]
    fn set_default_parses_optional_model() {
        let cli = Cli::try_parse_from(["zoea", "set-default", "opencode_zen"]).expect("parse args");
        let Some(CliCommand::SetDefault { provider, model }) = cli.command else {
            panic!("expected set-default command, got: {:?}", cli.command);
        };
        assert_eq!(provider, "opencode_zen");
        assert_eq!(model, None);
    }

    #[test]
    fn log_file_parent_is_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("zoea.log");
        open_log_file(&path).expect("open log");
        assert!(path.exists());
    }
}
