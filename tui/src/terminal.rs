//! Raw-mode terminal setup and teardown.
//!
//! The panic hook restores the terminal before the report is printed so a crash never leaves the
//! shell in raw mode or on the alternate screen.

use std::io::Stdout;
use std::io::stdout;
use std::sync::Once;

use anyhow::Context;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::EnableBracketedPaste;
use crossterm::execute;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

static PANIC_HOOK: Once = Once::new();

/// Enter raw mode and the alternate screen with bracketed paste enabled.
pub fn init() -> anyhow::Result<Tui> {
    install_panic_hook();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout(), EnterAlternateScreen, EnableBracketedPaste)
        .context("failed to enter alternate screen")?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout())).context("failed to create terminal")?;
    terminal.clear()?;
    Ok(terminal)
}

/// Undo [`init`]. Safe to call more than once.
pub fn restore() -> anyhow::Result<()> {
    execute!(
        stdout(),
        DisableBracketedPaste,
        LeaveAlternateScreen,
        crossterm::cursor::Show
    )
    .context("failed to leave alternate screen")?;
    disable_raw_mode().context("failed to disable raw mode")?;
    Ok(())
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
        let panic_hook = panic_hook.into_panic_hook();
        if let Err(err) = eyre_hook.install() {
            tracing::debug!("error report hook already installed: {err}");
        }
        std::panic::set_hook(Box::new(move |info| {
            if let Err(err) = restore() {
                tracing::error!("failed to restore terminal after panic: {err:#}");
            }
            panic_hook(info);
        }));
    });
}
