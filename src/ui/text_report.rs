//! Plain-text report for one-shot mode

use std::fmt::Write;

use crate::app::App;

use super::dashboard::RECOMMENDATION_UNAVAILABLE;

/// Formats the dashboard contents as plain text
///
/// Without a report only the notice (if any) is returned.
pub fn render_text(app: &App) -> String {
    let mut out = String::new();

    let Some(report) = &app.report else {
        if let Some(notice) = &app.notice {
            out.push_str(notice);
            out.push('\n');
        }
        return out;
    };

    // Writing to a String cannot fail
    let _ = writeln!(out, "Weather for {}", app.location.label);
    let reported = report.location.display_name();
    if !reported.is_empty() && reported != app.location.label {
        let _ = writeln!(out, "Reported as {}", reported);
    }
    if let Some(localtime) = report.location.localtime {
        let _ = writeln!(out, "Local time {}", localtime.format("%Y-%m-%d %H:%M"));
    }

    let current = &report.current;
    let _ = writeln!(
        out,
        "Today: {}, {:.1}°C, humidity {:.0}%, precipitation {:.1} mm, wind {:.0} km/h",
        current.condition_text,
        current.temperature_c,
        current.humidity_percent,
        current.precipitation_mm,
        current.wind_kph
    );

    if let Some(outlook) = &app.tomorrow {
        let marker = if outlook.is_estimate() { " (estimate)" } else { "" };
        let _ = writeln!(
            out,
            "Tomorrow{}: {}, high {:.0}°C, low {:.0}°C, humidity {:.0}%, rain chance {}%",
            marker,
            outlook.label,
            outlook.max_temp_c,
            outlook.min_temp_c,
            outlook.humidity_percent,
            outlook.chance_of_rain_percent
        );
    }

    out.push('\n');
    for assessment in app.assessments() {
        let advice = match &assessment.recommendation {
            Some(rec) => format!("{}: {}", rec.when_label, rec.reason_text),
            None => RECOMMENDATION_UNAVAILABLE.to_string(),
        };
        let tomorrow = assessment
            .tomorrow
            .map(|tier| tier.label())
            .unwrap_or("--");
        let _ = writeln!(
            out,
            "{:<12} [{}] {} (tomorrow: {})",
            assessment.crop.display_name,
            assessment.status.tier.label(),
            advice,
            tomorrow
        );
    }

    out
}
