//! Tomorrow's outlook for the dashboard
//!
//! Picks tomorrow's entry from the forecast, or estimates one from today's
//! conditions when the weather service sent no forecast for tomorrow.

use chrono::NaiveDate;
use rand::Rng;

use crate::data::{ForecastDay, WeatherObservation, WeatherReport};

/// Largest temperature deviation (°C) applied to an estimate
pub const ESTIMATE_TEMP_JITTER: f64 = 2.0;
/// Humidity added to today's value for an estimate
pub const ESTIMATE_HUMIDITY_INCREASE: f64 = 5.0;
/// Chance of rain assumed for an estimate
pub const ESTIMATE_RAIN_CHANCE: u8 = 20;
/// Label shown for estimates
pub const ESTIMATE_LABEL: &str = "similar to today";

/// Where an outlook came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlookSource {
    /// Taken from the weather service's forecast
    Forecast,
    /// Synthesized from today's observation
    Estimated,
}

/// Expected conditions for tomorrow
#[derive(Debug, Clone, PartialEq)]
pub struct TomorrowOutlook {
    /// Tomorrow's date, if today's date is known
    pub date: Option<NaiveDate>,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub humidity_percent: f64,
    pub chance_of_rain_percent: u8,
    pub precipitation_mm: f64,
    pub condition_text: String,
    pub condition_icon: String,
    /// Short description: the forecast condition or "similar to today"
    pub label: String,
    pub source: OutlookSource,
}

impl TomorrowOutlook {
    /// Whether this outlook was estimated rather than forecast
    pub fn is_estimate(&self) -> bool {
        self.source == OutlookSource::Estimated
    }

    /// Builds an outlook from a genuine forecast day
    ///
    /// Missing average humidity falls back to today's value.
    pub fn from_forecast(day: &ForecastDay, current: &WeatherObservation) -> Self {
        Self {
            date: Some(day.date),
            max_temp_c: day.max_temp_c,
            min_temp_c: day.min_temp_c,
            humidity_percent: day.avg_humidity_percent.unwrap_or(current.humidity_percent),
            chance_of_rain_percent: day.chance_of_rain_percent,
            precipitation_mm: day.total_precip_mm,
            condition_text: day.condition_text.clone(),
            condition_icon: day.condition_icon.clone(),
            label: day.condition_text.clone(),
            source: OutlookSource::Forecast,
        }
    }

    /// Estimates tomorrow from today's observation
    ///
    /// Temperature is today's ± up to 2 °C drawn from `rng`, humidity rises by
    /// 5 points (capped at 100), rain chance is 20% and no precipitation is
    /// expected.
    pub fn estimate<R: Rng>(
        current: &WeatherObservation,
        today: Option<NaiveDate>,
        rng: &mut R,
    ) -> Self {
        let temp = current.temperature_c
            + rng.gen_range(-ESTIMATE_TEMP_JITTER..=ESTIMATE_TEMP_JITTER);
        Self {
            date: today.and_then(|d| d.succ_opt()),
            max_temp_c: temp,
            min_temp_c: temp,
            humidity_percent: (current.humidity_percent + ESTIMATE_HUMIDITY_INCREASE).min(100.0),
            chance_of_rain_percent: ESTIMATE_RAIN_CHANCE,
            precipitation_mm: 0.0,
            condition_text: current.condition_text.clone(),
            condition_icon: current.condition_icon.clone(),
            label: ESTIMATE_LABEL.to_string(),
            source: OutlookSource::Estimated,
        }
    }

    /// Conditions to evaluate tomorrow's harvest against
    ///
    /// Uses the day's maximum temperature; wind is carried over from `current`
    /// since the forecast does not provide it.
    pub fn as_observation(&self, current: &WeatherObservation) -> WeatherObservation {
        WeatherObservation {
            temperature_c: self.max_temp_c,
            humidity_percent: self.humidity_percent,
            precipitation_mm: self.precipitation_mm,
            wind_kph: current.wind_kph,
            condition_text: self.condition_text.clone(),
            condition_icon: self.condition_icon.clone(),
            uv_index: None,
        }
    }
}

/// Finds tomorrow's forecast entry
///
/// With a known "today" this is the first day after it; otherwise the second
/// entry, since the service lists today first.
fn find_tomorrow(report: &WeatherReport) -> Option<&ForecastDay> {
    let days = report.forecast_days();
    match report.today() {
        Some(today) => days.iter().find(|day| day.date > today),
        None => days.get(1),
    }
}

/// Projects tomorrow's conditions for a report
///
/// Returns the forecast entry for tomorrow when present, otherwise an
/// estimate flagged [`OutlookSource::Estimated`].
pub fn project_tomorrow<R: Rng>(report: &WeatherReport, rng: &mut R) -> TomorrowOutlook {
    match find_tomorrow(report) {
        Some(day) => TomorrowOutlook::from_forecast(day, &report.current),
        None => {
            tracing::debug!(location = %report.location.name, "no forecast for tomorrow, estimating");
            TomorrowOutlook::estimate(&report.current, report.today(), rng)
        }
    }
}
