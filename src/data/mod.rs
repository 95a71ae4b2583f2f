//! Core data models for the agricultural dashboard
//!
//! This module contains the weather types shared by the gateway client, the
//! location cache and the harvest evaluator, plus the static crop and
//! location tables.

pub mod crops;
pub mod location;
pub mod weather;

pub use crops::{all_crop_ids, all_crops, get_crop_by_id, CropProfile, CropSelection};
pub use location::{normalize_location, Location, LocationError};
pub use weather::{GatewayEndpoint, GatewayError, WeatherClient, WeatherGateway};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Point-in-time weather conditions at the selected location
///
/// Produced once per gateway response and replaced wholesale on the next
/// successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Air temperature in Celsius
    pub temperature_c: f64,
    /// Relative humidity percentage (0-100)
    pub humidity_percent: f64,
    /// Accumulated recent precipitation in millimetres
    pub precipitation_mm: f64,
    /// Wind speed in km/h
    pub wind_kph: f64,
    /// Human-readable condition, e.g. "Partly cloudy"
    pub condition_text: String,
    /// Icon reference as delivered by the weather service
    pub condition_icon: String,
    /// UV index, if reported
    #[serde(default)]
    pub uv_index: Option<f64>,
}

/// Forecast for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    /// Chance of rain (0-100)
    pub chance_of_rain_percent: u8,
    pub total_precip_mm: f64,
    pub condition_text: String,
    pub condition_icon: String,
    /// Average relative humidity over the day, if reported
    #[serde(default)]
    pub avg_humidity_percent: Option<f64>,
}

/// Location metadata as resolved by the weather service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    pub region: String,
    pub country: String,
    /// Local time at the location when the report was produced
    pub localtime: Option<NaiveDateTime>,
}

impl LocationInfo {
    /// Returns "name, country", omitting empty parts
    pub fn display_name(&self) -> String {
        match (self.name.is_empty(), self.country.is_empty()) {
            (false, false) => format!("{}, {}", self.name, self.country),
            (false, true) => self.name.clone(),
            (true, false) => self.country.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Everything one gateway response yields for a location
///
/// This is the payload stored in the location cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: LocationInfo,
    pub current: WeatherObservation,
    /// Multi-day forecast, absent when the service omitted it
    pub forecast: Option<Vec<ForecastDay>>,
}

impl WeatherReport {
    /// Returns the forecast days, treating an absent forecast as empty
    pub fn forecast_days(&self) -> &[ForecastDay] {
        self.forecast.as_deref().unwrap_or(&[])
    }

    /// The date the report considers "today"
    ///
    /// Taken from the location's local time, falling back to the first
    /// forecast day.
    pub fn today(&self) -> Option<NaiveDate> {
        self.location
            .localtime
            .map(|t| t.date())
            .or_else(|| self.forecast_days().first().map(|d| d.date))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared builders for tests across the crate

    use super::*;

    pub fn observation(temperature_c: f64, humidity_percent: f64, precipitation_mm: f64) -> WeatherObservation {
        WeatherObservation {
            temperature_c,
            humidity_percent,
            precipitation_mm,
            wind_kph: 12.0,
            condition_text: "Partly cloudy".to_string(),
            condition_icon: "//cdn.weatherapi.com/weather/64x64/day/116.png".to_string(),
            uv_index: Some(4.0),
        }
    }

    pub fn forecast_day(date: NaiveDate, max: f64, min: f64) -> ForecastDay {
        ForecastDay {
            date,
            max_temp_c: max,
            min_temp_c: min,
            chance_of_rain_percent: 40,
            total_precip_mm: 1.2,
            condition_text: "Patchy rain possible".to_string(),
            condition_icon: "//cdn.weatherapi.com/weather/64x64/day/176.png".to_string(),
            avg_humidity_percent: Some(68.0),
        }
    }

    pub fn report(current: WeatherObservation, forecast: Option<Vec<ForecastDay>>) -> WeatherReport {
        WeatherReport {
            location: LocationInfo {
                name: "Berlin".to_string(),
                region: "Berlin".to_string(),
                country: "Germany".to_string(),
                localtime: NaiveDate::from_ymd_opt(2024, 7, 15)
                    .and_then(|d| d.and_hms_opt(14, 0, 0)),
            },
            current,
            forecast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_report_serialization_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let report = report(
            observation(22.5, 65.0, 0.3),
            Some(vec![forecast_day(date, 26.0, 14.0)]),
        );

        let json = serde_json::to_string(&report).expect("Failed to serialize report");
        let deserialized: WeatherReport =
            serde_json::from_str(&json).expect("Failed to deserialize report");

        assert_eq!(deserialized, report);
    }

    #[test]
    fn test_forecast_days_empty_when_absent() {
        let report = report(observation(20.0, 50.0, 0.0), None);
        assert!(report.forecast_days().is_empty());
    }

    #[test]
    fn test_today_prefers_localtime() {
        let other = NaiveDate::from_ymd_opt(2024, 7, 20).unwrap();
        let report = report(
            observation(20.0, 50.0, 0.0),
            Some(vec![forecast_day(other, 25.0, 12.0)]),
        );
        assert_eq!(report.today(), NaiveDate::from_ymd_opt(2024, 7, 15));
    }

    #[test]
    fn test_today_falls_back_to_first_forecast_day() {
        let first = NaiveDate::from_ymd_opt(2024, 7, 20).unwrap();
        let mut report = report(
            observation(20.0, 50.0, 0.0),
            Some(vec![forecast_day(first, 25.0, 12.0)]),
        );
        report.location.localtime = None;
        assert_eq!(report.today(), Some(first));
    }

    #[test]
    fn test_location_display_name() {
        let mut info = report(observation(20.0, 50.0, 0.0), None).location;
        assert_eq!(info.display_name(), "Berlin, Germany");
        info.country.clear();
        assert_eq!(info.display_name(), "Berlin");
    }
}
