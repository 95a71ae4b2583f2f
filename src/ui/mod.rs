//! UI rendering module for the agricultural dashboard
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components, plus the plain-text report
//! printed in one-shot mode.

pub mod dashboard;
pub mod help_overlay;
pub mod location_prompt;
pub mod text_report;
pub mod widgets;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};
use crate::harvest::HarvestTier;

pub use dashboard::render as render_dashboard;
pub use help_overlay::render as render_help_overlay;
pub use location_prompt::render as render_location_prompt;
pub use text_report::render_text;

/// Renders the UI based on the current application state
pub fn render(frame: &mut Frame, app: &App) {
    match &app.state {
        AppState::Loading => render_loading(frame, app),
        AppState::Dashboard => render_dashboard(frame, app),
        AppState::EditingLocation(input) => {
            if app.report.is_some() {
                render_dashboard(frame, app);
            }
            render_location_prompt(frame, input, app.notice.as_deref());
        }
    }

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Renders a loading message while the first report is fetched
fn render_loading(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new(format!("Loading weather for {}...", app.location.label))
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Color for a harvest tier badge
pub fn tier_color(tier: HarvestTier) -> Color {
    match tier {
        HarvestTier::Ready => Color::Green,
        HarvestTier::Acceptable => Color::Yellow,
        HarvestTier::Problematic => Color::Red,
    }
}

/// Color for temperature (warmer = more red, cooler = more blue)
pub fn temperature_color(temp: f64) -> Color {
    if temp >= 30.0 {
        Color::Red
    } else if temp >= 25.0 {
        Color::LightRed
    } else if temp >= 20.0 {
        Color::Yellow
    } else if temp >= 15.0 {
        Color::Green
    } else if temp >= 10.0 {
        Color::Cyan
    } else {
        Color::Blue
    }
}

/// Collects a rendered buffer into one string for assertions
#[cfg(test)]
pub(crate) fn buffer_text(terminal: &ratatui::Terminal<ratatui::backend::TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
