//! Dashboard screen rendering
//!
//! Renders the main view: a header with the location and local time, the
//! notice bar, today's conditions next to tomorrow's outlook, one card per
//! selected crop and a footer with key hints and data freshness.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::widgets::ForecastSparkline;
use super::{temperature_color, tier_color};
use crate::app::{App, CropAssessment};
use crate::data::{WeatherObservation, WeatherReport};
use crate::outlook::TomorrowOutlook;

/// Shown on a crop card when the status could not be turned into advice
pub const RECOMMENDATION_UNAVAILABLE: &str = "recommendation unavailable";

/// Renders the dashboard
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `app` - The application state holding the report and crop selection
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let notice_height = if app.notice.is_some() { 1 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),             // Header
            Constraint::Length(notice_height), // Notice bar
            Constraint::Length(9),             // Weather panels
            Constraint::Min(3),                // Crop cards
            Constraint::Length(1),             // Footer
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    if let Some(notice) = &app.notice {
        render_notice(frame, notice, chunks[1]);
    }

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    match &app.report {
        Some(report) => {
            render_current(frame, &report.current, panels[0]);
            render_tomorrow(frame, report, app.tomorrow.as_ref(), panels[1]);
        }
        None => {
            render_placeholder(frame, " Today ", panels[0]);
            render_placeholder(frame, " Tomorrow ", panels[1]);
        }
    }

    render_crops(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "AGRARDASH",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            app.location.label.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    if let Some(report) = &app.report {
        let reported = report.location.display_name();
        if !reported.is_empty() && reported != app.location.label {
            spans.push(Span::styled(
                format!("  ({})", reported),
                Style::default().fg(Color::Gray),
            ));
        }
        if let Some(localtime) = report.location.localtime {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("Local time {}", localtime.format("%a %d %b, %H:%M")),
                Style::default().fg(Color::Gray),
            ));
        }
    }

    let separator = "─".repeat(area.width as usize);
    let lines = vec![
        Line::from(spans),
        Line::from(Span::styled(separator, Style::default().fg(Color::DarkGray))),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_notice(frame: &mut Frame, notice: &str, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!("\u{26A0} {}", notice), // ⚠
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Creates a label/value line for the weather panels
fn detail_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<13}", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn render_current(frame: &mut Frame, current: &WeatherObservation, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            current.condition_text.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        detail_line(
            "Temperature",
            format!("{:.1}°C", current.temperature_c),
            temperature_color(current.temperature_c),
        ),
        detail_line("Humidity", format!("{:.0}%", current.humidity_percent), Color::White),
        detail_line("Precip.", format!("{:.1} mm", current.precipitation_mm), Color::White),
        detail_line("Wind", format!("{:.0} km/h", current.wind_kph), Color::White),
    ];
    if let Some(uv) = current.uv_index {
        lines.push(detail_line("UV index", format!("{:.0}", uv), Color::White));
    }

    let block = Block::default()
        .title(" Today ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_tomorrow(
    frame: &mut Frame,
    report: &WeatherReport,
    outlook: Option<&TomorrowOutlook>,
    area: Rect,
) {
    let Some(outlook) = outlook else {
        render_placeholder(frame, " Tomorrow ", area);
        return;
    };

    let title = if outlook.is_estimate() {
        " Tomorrow (estimate) "
    } else {
        " Tomorrow "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let heading = match outlook.date {
        Some(date) => format!("{}  {}", date.format("%a %d %b"), outlook.label),
        None => outlook.label.clone(),
    };
    let lines = vec![
        Line::from(Span::styled(heading, Style::default().add_modifier(Modifier::BOLD))),
        detail_line(
            "High / Low",
            format!("{:.0}° / {:.0}°", outlook.max_temp_c, outlook.min_temp_c),
            temperature_color(outlook.max_temp_c),
        ),
        detail_line("Humidity", format!("{:.0}%", outlook.humidity_percent), Color::White),
        detail_line(
            "Rain chance",
            format!("{}%", outlook.chance_of_rain_percent),
            Color::White,
        ),
        detail_line("Precip.", format!("{:.1} mm", outlook.precipitation_mm), Color::White),
    ];
    frame.render_widget(Paragraph::new(lines), rows[0]);

    let days = report.forecast_days();
    if days.len() > 1 {
        let label = "Forecast  ";
        let spark = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(label.len() as u16), Constraint::Min(1)])
            .split(rows[1]);
        frame.render_widget(
            Paragraph::new(Span::styled(label, Style::default().fg(Color::Gray))),
            spark[0],
        );

        let highs: Vec<f64> = days.iter().map(|d| d.max_temp_c).collect();
        let mut sparkline = ForecastSparkline::new(&highs);
        if let Some(index) = days.iter().position(|d| Some(d.date) == outlook.date) {
            sparkline = sparkline.highlight(index);
        }
        frame.render_widget(sparkline, spark[1]);
    }
}

fn render_placeholder(frame: &mut Frame, title: &str, area: Rect) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let text = Paragraph::new(Span::styled(
        "No weather data",
        Style::default().fg(Color::DarkGray),
    ))
    .block(block);
    frame.render_widget(text, area);
}

/// Builds the two lines of a crop card
fn crop_card(assessment: &CropAssessment) -> [Line<'static>; 2] {
    let crop = assessment.crop;
    let tier = assessment.status.tier;

    let (advice, advice_color) = match &assessment.recommendation {
        Some(rec) => (format!("{}: {}", rec.when_label, rec.reason_text), Color::White),
        None => (RECOMMENDATION_UNAVAILABLE.to_string(), Color::DarkGray),
    };

    let first = Line::from(vec![
        Span::raw(format!("{} ", crop.icon)),
        Span::styled(
            format!("{:<12}", crop.display_name),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("[{}]", tier.label()),
            Style::default()
                .fg(tier_color(tier))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(advice, Style::default().fg(advice_color)),
    ]);

    let mut second = vec![Span::styled("    Tomorrow: ", Style::default().fg(Color::Gray))];
    match assessment.tomorrow {
        Some(tomorrow) => second.push(Span::styled(
            tomorrow.label(),
            Style::default().fg(tier_color(tomorrow)),
        )),
        None => second.push(Span::styled("--", Style::default().fg(Color::DarkGray))),
    }
    second.push(Span::styled(
        format!("  {}", crop.comment),
        Style::default().fg(Color::DarkGray),
    ));

    [first, Line::from(second)]
}

fn render_crops(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" Crops: {} ", app.selection.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let assessments = app.assessments();
    let lines: Vec<Line> = if assessments.is_empty() {
        vec![Line::from(Span::styled(
            "No weather data available. Press r to retry or l to change location.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        assessments.iter().flat_map(crop_card).collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the key hints with data freshness
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Crop  "),
        Span::styled("l", Style::default().fg(Color::Yellow)),
        Span::raw(" Location  "),
        Span::styled("r/R", Style::default().fg(Color::Yellow)),
        Span::raw(" Reload  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ];

    if app.is_fetching() {
        spans.push(Span::styled(" │ Updating...", Style::default().fg(Color::Cyan)));
    } else if let Some(last_refresh) = app.last_refresh {
        let elapsed = Local::now() - last_refresh;
        let mins_ago = elapsed.num_minutes();
        let freshness_text = if mins_ago < 1 {
            " │ Data: just now".to_string()
        } else if mins_ago < 60 {
            format!(" │ Data: {}m ago", mins_ago)
        } else {
            format!(" │ Data: {}h ago", elapsed.num_hours())
        };
        spans.push(Span::styled(freshness_text, Style::default().fg(Color::DarkGray)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{load, test_app, test_app_with};
    use crate::app::AppState;
    use crate::data::fixtures::{forecast_day, observation, report};
    use crate::data::GatewayError;
    use crate::harvest::{HarvestIssue, HarvestStatus, HarvestTier};
    use crate::data::get_crop_by_id;
    use chrono::NaiveDate;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        crate::ui::buffer_text(&terminal)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    #[test]
    fn test_ready_crop_card() {
        let (mut app, _temp_dir) = test_app_with(&["--crop", "weizen"]);
        load(&mut app, report(observation(24.0, 55.0, 1.0), None));

        let content = draw(&app);

        assert!(content.contains("Crops: Weizen"));
        assert!(content.contains("[Ready]"));
        assert!(content.contains("optimal today: all conditions met"));
        assert!(content.contains("Tomorrow:"));
    }

    #[test]
    fn test_problematic_crop_card_lists_two_reasons() {
        let (mut app, _temp_dir) = test_app_with(&["--crop", "weizen"]);
        load(&mut app, report(observation(30.0, 70.0, 10.0), None));

        let content = draw(&app);

        assert!(content.contains("[Problematic]"));
        assert!(content.contains("waiting recommended: too hot: 30°C; humidity too high: 70%"));
        assert!(!content.contains("precipitation too high"));
    }

    #[test]
    fn test_current_panel_values() {
        let (mut app, _temp_dir) = test_app();
        load(&mut app, report(observation(24.0, 55.0, 1.0), None));

        let content = draw(&app);

        assert!(content.contains("24.0°C"));
        assert!(content.contains("55%"));
        assert!(content.contains("1.0 mm"));
        assert!(content.contains("Partly cloudy"));
    }

    #[test]
    fn test_estimated_tomorrow_is_marked() {
        let (mut app, _temp_dir) = test_app();
        load(&mut app, report(observation(20.0, 50.0, 0.0), None));

        let content = draw(&app);

        assert!(content.contains("Tomorrow (estimate)"));
        assert!(content.contains("similar to today"));
        assert!(content.contains("20%"));
    }

    #[test]
    fn test_forecast_tomorrow_with_sparkline() {
        let (mut app, _temp_dir) = test_app();
        load(
            &mut app,
            report(
                observation(20.0, 50.0, 0.0),
                Some(vec![
                    forecast_day(date(15), 25.0, 14.0),
                    forecast_day(date(16), 22.0, 12.0),
                    forecast_day(date(17), 28.0, 15.0),
                ]),
            ),
        );

        let content = draw(&app);

        assert!(!content.contains("(estimate)"));
        assert!(content.contains("Patchy rain possible"));
        assert!(content.contains("22° / 12°"));
        assert!(content.contains("Forecast"));
        assert!(content.contains('█'));
    }

    #[test]
    fn test_notice_bar_shown() {
        let (mut app, _temp_dir) = test_app();
        let request = app.request_load(false).unwrap();
        app.apply_fetch(
            request,
            Err(GatewayError::Status {
                status: 500,
                message: "boom".to_string(),
            }),
        );
        assert_eq!(app.state, AppState::Dashboard);

        let content = draw(&app);

        assert!(content.contains("Could not load weather data for Berlin. Press r to retry."));
        assert!(content.contains("No weather data"));
        assert!(!content.contains("boom"));
    }

    #[test]
    fn test_all_crops_rendered() {
        let (mut app, _temp_dir) = test_app();
        load(&mut app, report(observation(20.0, 50.0, 0.0), None));

        let content = draw(&app);

        for name in ["Weizen", "Gerste", "Roggen", "Hafer", "Raps", "Mais", "Kartoffel"] {
            assert!(content.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_header_shows_location_and_local_time() {
        let (mut app, _temp_dir) = test_app();
        load(&mut app, report(observation(20.0, 50.0, 0.0), None));

        let content = draw(&app);

        assert!(content.contains("AGRARDASH"));
        assert!(content.contains("Berlin, Germany"));
        assert!(content.contains("Mon 15 Jul, 14:00"));
        assert!(content.contains("Data: just now"));
    }

    #[test]
    fn test_unavailable_recommendation_text() {
        let card = crop_card(&CropAssessment {
            crop: get_crop_by_id("mais").unwrap(),
            status: HarvestStatus {
                tier: HarvestTier::Acceptable,
                issues: vec![HarvestIssue::TooHot(31.0)],
            },
            recommendation: None,
            tomorrow: None,
        });

        let text: String = card[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains(RECOMMENDATION_UNAVAILABLE));
        let second: String = card[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(second.contains("--"));
    }
}
