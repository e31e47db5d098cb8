//! Colors, styles and glyphs used by every renderer.
//!
//! A [`Theme`] is built once at startup and handed to renderers by reference; nothing in here is
//! mutated at runtime.

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use zoea_protocol::AgentState;

pub const BRAND_RGB: &str = "#F694FF";
pub const ACCENT_RGB: &str = "#F5A742";
pub const SWARM_RGB: &str = "#6CC4FF";

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Box-drawing and marker glyphs.
#[derive(Debug, Clone)]
pub struct Glyphs {
    pub branch: &'static str,
    pub last_branch: &'static str,
    pub vertical: &'static str,
    pub blank: &'static str,
    pub bullet: &'static str,
    pub warning: &'static str,
    pub rule: &'static str,
    pub scrollbar_thumb: &'static str,
    pub scrollbar_track: &'static str,
    pub selection: &'static str,
    pub bounce_block: &'static str,
    pub spinner: &'static [&'static str],
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            branch: "├─ ",
            last_branch: "└─ ",
            vertical: "│  ",
            blank: "   ",
            bullet: "•",
            warning: "⚠",
            rule: "─",
            scrollbar_thumb: "█",
            scrollbar_track: "│",
            selection: "▶",
            bounce_block: "■",
            spinner: SPINNER_FRAMES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub brand: Style,
    pub accent: Style,
    pub title: Style,
    pub dim: Style,
    pub selected: Style,
    pub error: Style,
    pub warning: Style,
    pub role_system: Style,
    pub role_user: Style,
    pub role_swarm: Style,
    pub role_assistant: Style,
    pub role_tool: Style,
    pub role_unknown: Style,
    pub reasoning: Style,
    pub json_key: Style,
    pub json_string: Style,
    pub json_number: Style,
    pub json_literal: Style,
    pub state_idle: Style,
    pub state_running: Style,
    pub state_stopped: Style,
    pub state_errored: Style,
    pub network_llm: Style,
    pub network_mcp: Style,
    pub glyphs: Glyphs,
}

impl Theme {
    pub fn new() -> Self {
        let brand = hex_color(BRAND_RGB, Color::Magenta);
        let accent = hex_color(ACCENT_RGB, Color::Yellow);
        let swarm = hex_color(SWARM_RGB, Color::Cyan);
        let dim = Style::new().add_modifier(Modifier::DIM);
        Self {
            brand: Style::new().fg(brand),
            accent: Style::new().fg(accent),
            title: Style::new().fg(brand).add_modifier(Modifier::BOLD),
            dim,
            selected: Style::new().add_modifier(Modifier::REVERSED),
            error: Style::new().fg(Color::Red),
            warning: Style::new().fg(Color::Yellow),
            role_system: Style::new().fg(Color::Yellow),
            role_user: Style::new().fg(Color::Green).add_modifier(Modifier::BOLD),
            role_swarm: Style::new().fg(swarm).add_modifier(Modifier::BOLD),
            role_assistant: Style::new().fg(brand).add_modifier(Modifier::BOLD),
            role_tool: Style::new().fg(accent).add_modifier(Modifier::BOLD),
            role_unknown: dim,
            reasoning: dim.add_modifier(Modifier::ITALIC),
            json_key: Style::new().fg(swarm),
            json_string: Style::new().fg(Color::Green),
            json_number: Style::new().fg(accent),
            json_literal: Style::new().fg(brand),
            state_idle: dim,
            state_running: Style::new().fg(Color::Green),
            state_stopped: Style::new().fg(Color::DarkGray),
            state_errored: Style::new().fg(Color::Red).add_modifier(Modifier::BOLD),
            network_llm: Style::new().fg(brand),
            network_mcp: Style::new().fg(accent),
            glyphs: Glyphs::default(),
        }
    }

    pub fn state_style(&self, state: AgentState) -> Style {
        match state {
            AgentState::Idle => self.state_idle,
            AgentState::Running => self.state_running,
            AgentState::Stopped => self.state_stopped,
            AgentState::Errored => self.state_errored,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_color(value: &str, fallback: Color) -> Color {
    parse_hex_rgb(value)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(fallback)
}

fn parse_hex_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let value = value.strip_prefix('#').unwrap_or(value);
    if value.len() != 6 || !value.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&value[0..2], 16).ok()?;
    let g = u8::from_str_radix(&value[2..4], 16).ok()?;
    let b = u8::from_str_radix(&value[4..6], 16).ok()?;
    Some((r, g, b))
}
