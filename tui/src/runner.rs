//! The async event loop that owns the terminal.
//!
//! Terminal input, swarm events, completions of detached sends and the animation timer are
//! merged into one serial stream of [`AppEvent`]s. Only this loop touches the [`Model`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::Event;
use crossterm::event::EventStream;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use zoea_protocol::ProviderCatalog;
use zoea_protocol::SwarmEvent;

use crate::app_event::AppCommand;
use crate::app_event::AppEvent;
use crate::exit::AppExitInfo;
use crate::exit::ExitReason;
use crate::model::Model;
use crate::swarm_client::SwarmClient;
use crate::terminal;
use crate::terminal::Tui;
use crate::theme::Theme;

/// Animation period used when none is configured.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub providers: ProviderCatalog,
    pub theme: Theme,
    pub tick_interval: Duration,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            providers: ProviderCatalog::default(),
            theme: Theme::new(),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Run the dashboard until the user quits.
///
/// The terminal is restored and [`SwarmClient::shutdown`] is called on every exit path; sends
/// still in flight are not aborted.
pub async fn run_dashboard(
    swarm: Arc<dyn SwarmClient>,
    events: UnboundedReceiver<SwarmEvent>,
    options: DashboardOptions,
) -> anyhow::Result<AppExitInfo> {
    let mut tui = terminal::init()?;
    let result = event_loop(&mut tui, Arc::clone(&swarm), events, options).await;

    let cleanup = Arc::clone(&swarm);
    if let Err(err) = tokio::task::spawn_blocking(move || cleanup.shutdown()).await {
        tracing::warn!("swarm shutdown task failed: {err}");
    }
    terminal::restore()?;
    result
}

async fn event_loop(
    tui: &mut Tui,
    swarm: Arc<dyn SwarmClient>,
    mut swarm_events: UnboundedReceiver<SwarmEvent>,
    options: DashboardOptions,
) -> anyhow::Result<AppExitInfo> {
    let size = tui.size().context("failed to read terminal size")?;
    let mut model = Model::new(
        Arc::clone(&swarm),
        options.providers,
        options.theme,
        size.width,
        size.height,
    );
    let (completion_tx, mut completions) = unbounded_channel::<AppEvent>();
    let mut input = EventStream::new();
    let mut ticker = tokio::time::interval(options.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!(agents = model.agents().len(), "dashboard started");

    loop {
        draw(tui, &model)?;

        let event = tokio::select! {
            maybe_input = input.next() => match maybe_input {
                Some(Ok(event)) => translate_terminal_event(event),
                Some(Err(err)) => {
                    tracing::warn!("terminal input read error: {err}");
                    None
                }
                None => return Ok(exit_info(&model, ExitReason::InputClosed)),
            },
            Some(event) = swarm_events.recv() => Some(AppEvent::Swarm(event)),
            Some(event) = completions.recv() => Some(event),
            _ = ticker.tick() => Some(AppEvent::Tick),
        };
        let Some(event) = event else {
            continue;
        };

        for command in model.update(event) {
            if execute_command(command, &swarm, &completion_tx) {
                tracing::info!("dashboard quit requested");
                return Ok(exit_info(&model, ExitReason::UserRequested));
            }
        }
    }
}

fn draw(tui: &mut Tui, model: &Model) -> anyhow::Result<()> {
    tui.draw(|frame| {
        let area = frame.area();
        model.render(area, frame.buffer_mut());
        if let Some(position) = model.cursor_position(area) {
            frame.set_cursor_position(position);
        }
    })
    .context("failed to draw frame")?;
    Ok(())
}

fn translate_terminal_event(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) => Some(AppEvent::Key(key)),
        Event::Paste(text) => Some(AppEvent::Paste(text)),
        Event::Resize(width, height) => Some(AppEvent::Resize { width, height }),
        Event::FocusGained | Event::FocusLost | Event::Mouse(_) => None,
    }
}

/// Run one command. Sends are detached onto the blocking pool and report back through
/// `completions`. Returns `true` when the command asks the loop to stop.
pub(crate) fn execute_command(
    command: AppCommand,
    swarm: &Arc<dyn SwarmClient>,
    completions: &UnboundedSender<AppEvent>,
) -> bool {
    match command {
        AppCommand::SendMessage { agent_id, text } => {
            let swarm = Arc::clone(swarm);
            let tx = completions.clone();
            tokio::task::spawn_blocking(move || {
                let result = swarm.send_message_async(&agent_id, &text);
                if let Err(err) = &result {
                    tracing::warn!(agent = %agent_id, "message failed: {err}");
                }
                let _ = tx.send(AppEvent::MessageSent { agent_id, result });
            });
            false
        }
        AppCommand::Broadcast { text } => {
            let swarm = Arc::clone(swarm);
            let tx = completions.clone();
            tokio::task::spawn_blocking(move || {
                let result = swarm.broadcast(&text);
                if let Err(err) = &result {
                    tracing::warn!("broadcast failed: {err}");
                }
                let _ = tx.send(AppEvent::BroadcastSent { result });
            });
            false
        }
        AppCommand::Quit => true,
    }
}

fn exit_info(model: &Model, exit_reason: ExitReason) -> AppExitInfo {
    AppExitInfo {
        agent_count: model.agents().len(),
        tick: model.tick(),
        exit_reason,
    }
}
