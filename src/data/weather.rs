//! WeatherAPI gateway client
//!
//! This module fetches current conditions and the multi-day forecast from
//! weatherapi.com, either directly with an API key or through the serverless
//! proxy, and reshapes the response into our [`WeatherReport`].

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{ForecastDay, LocationInfo, WeatherObservation, WeatherReport};

/// Base URL for the WeatherAPI REST endpoints
pub const WEATHER_API_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Serverless proxy used when no API key is configured
pub const DEFAULT_PROXY_URL: &str = "https://agrardashboard.netlify.app/.netlify/functions/weather";

/// Number of forecast days requested by default
pub const DEFAULT_FORECAST_DAYS: u8 = 7;

/// Longest raw payload kept in a malformed-response error
const MAX_RAW_PAYLOAD_LEN: usize = 2048;

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Weather service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response is missing required fields or is not valid JSON
    #[error("Malformed weather response: {reason}")]
    Malformed { reason: String, raw: String },
}

impl GatewayError {
    /// Whether the failure happened on the way to or from the service
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::RequestFailed(_) | GatewayError::Status { .. })
    }

    /// The single message shown to the user for any gateway failure
    ///
    /// Identical for every variant so no response details leak.
    pub fn user_message(location_label: &str) -> String {
        format!("Could not load weather data for {}.", location_label)
    }

    fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        let mut end = raw.len().min(MAX_RAW_PAYLOAD_LEN);
        while !raw.is_char_boundary(end) {
            end -= 1;
        }
        GatewayError::Malformed {
            reason: reason.into(),
            raw: raw[..end].to_string(),
        }
    }
}

/// Source of weather reports for a location query
///
/// The dashboard only talks to this trait so tests can substitute a fake.
#[async_trait]
pub trait WeatherGateway: Send + Sync {
    /// Fetches current conditions and, if available, the forecast
    async fn fetch(&self, query: &str) -> Result<WeatherReport, GatewayError>;
}

/// Where weather requests are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEndpoint {
    /// weatherapi.com with an API key
    Direct { base_url: String, api_key: String },
    /// The serverless proxy, which holds the API key itself
    Proxy { url: String },
}

impl Default for GatewayEndpoint {
    fn default() -> Self {
        GatewayEndpoint::Proxy {
            url: DEFAULT_PROXY_URL.to_string(),
        }
    }
}

/// Client for fetching weather data from WeatherAPI
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    endpoint: GatewayEndpoint,
    forecast_days: u8,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new(GatewayEndpoint::default())
    }
}

impl WeatherClient {
    /// Create a new WeatherClient for the given endpoint
    pub fn new(endpoint: GatewayEndpoint) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            forecast_days: DEFAULT_FORECAST_DAYS,
        }
    }

    /// Create a new WeatherClient with a custom HTTP client
    pub fn with_client(client: Client, endpoint: GatewayEndpoint) -> Self {
        Self {
            client,
            endpoint,
            forecast_days: DEFAULT_FORECAST_DAYS,
        }
    }

    /// Set the number of forecast days to request
    pub fn with_forecast_days(mut self, days: u8) -> Self {
        self.forecast_days = days;
        self
    }

    /// Builds the GET request for a location query
    fn build_request(&self, query: &str) -> reqwest::RequestBuilder {
        match &self.endpoint {
            GatewayEndpoint::Direct { base_url, api_key } => {
                let url = format!("{}/forecast.json", base_url.trim_end_matches('/'));
                let days = self.forecast_days.to_string();
                self.client.get(url).query(&[
                    ("key", api_key.as_str()),
                    ("q", query),
                    ("days", days.as_str()),
                    ("aqi", "no"),
                    ("alerts", "no"),
                ])
            }
            GatewayEndpoint::Proxy { url } => {
                let days = self.forecast_days.to_string();
                self.client
                    .get(url)
                    .query(&[("city", query), ("days", days.as_str())])
            }
        }
    }
}

#[async_trait]
impl WeatherGateway for WeatherClient {
    /// Fetch weather data for a location query
    ///
    /// # Arguments
    /// * `query` - City name, postal code or "city,country"
    ///
    /// # Returns
    /// * `Ok(WeatherReport)` - Current conditions and optional forecast
    /// * `Err(GatewayError)` - Transport failure or malformed response
    async fn fetch(&self, query: &str) -> Result<WeatherReport, GatewayError> {
        tracing::debug!(query, "requesting weather");

        let response = self.build_request(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        parse_response(&text)
    }
}

/// Extracts a readable message from an error body
///
/// Handles the WeatherAPI shape `{"error": {"message": ".."}}` and the proxy
/// shape `{"error": ".."}`, falling back to the raw body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorField {
        Detailed { message: String },
        Plain(String),
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorField,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: ErrorField::Detailed { message },
        })
        | Ok(ErrorBody {
            error: ErrorField::Plain(message),
        }) => message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().chars().take(200).collect(),
    }
}

/// Parse a successful WeatherAPI response body into a WeatherReport
///
/// A missing `location` or `current` object, or a body that is not valid
/// JSON, is a malformed response. Forecast days whose minimum temperature
/// exceeds the maximum, or whose date cannot be parsed, are skipped.
pub fn parse_response(body: &str) -> Result<WeatherReport, GatewayError> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::malformed(e.to_string(), body))?;

    let location = response
        .location
        .ok_or_else(|| GatewayError::malformed("missing field `location`", body))?;
    let current = response
        .current
        .ok_or_else(|| GatewayError::malformed("missing field `current`", body))?;

    let forecast = response.forecast.map(|forecast| {
        forecast
            .forecastday
            .into_iter()
            .filter_map(parse_forecast_day)
            .collect::<Vec<_>>()
    });

    Ok(WeatherReport {
        location: LocationInfo {
            name: location.name,
            region: location.region,
            country: location.country,
            localtime: location.localtime.as_deref().and_then(parse_localtime),
        },
        current: WeatherObservation {
            temperature_c: current.temp_c,
            humidity_percent: current.humidity,
            precipitation_mm: current.precip_mm.max(0.0),
            wind_kph: current.wind_kph.max(0.0),
            condition_text: current.condition.text,
            condition_icon: current.condition.icon,
            uv_index: current.uv,
        },
        forecast,
    })
}

/// Converts one API forecast day, dropping entries that break invariants
fn parse_forecast_day(entry: ApiForecastDay) -> Option<ForecastDay> {
    let date = match NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            tracing::warn!(date = %entry.date, "skipping forecast day with invalid date");
            return None;
        }
    };

    let day = entry.day;
    if day.mintemp_c > day.maxtemp_c {
        tracing::warn!(%date, min = day.mintemp_c, max = day.maxtemp_c, "skipping forecast day with min above max");
        return None;
    }

    Some(ForecastDay {
        date,
        max_temp_c: day.maxtemp_c,
        min_temp_c: day.mintemp_c,
        chance_of_rain_percent: day.daily_chance_of_rain.clamp(0.0, 100.0).round() as u8,
        total_precip_mm: day.totalprecip_mm.max(0.0),
        condition_text: day.condition.text,
        condition_icon: day.condition.icon,
        avg_humidity_percent: day.avghumidity,
    })
}

/// Parse WeatherAPI local time (e.g. "2024-07-15 14:00" or "2024-07-15 9:05")
fn parse_localtime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M").ok()
}

/// WeatherAPI response structure
#[derive(Debug, Deserialize)]
struct ApiResponse {
    location: Option<ApiLocation>,
    current: Option<ApiCurrent>,
    forecast: Option<ApiForecast>,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    localtime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temp_c: f64,
    humidity: f64,
    wind_kph: f64,
    #[serde(default)]
    precip_mm: f64,
    #[serde(default)]
    condition: ApiCondition,
    #[serde(default)]
    uv: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiCondition {
    #[serde(default)]
    text: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    #[serde(default)]
    forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastDay {
    date: String,
    day: ApiDay,
}

#[derive(Debug, Deserialize)]
struct ApiDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    #[serde(default)]
    daily_chance_of_rain: f64,
    #[serde(default)]
    totalprecip_mm: f64,
    #[serde(default)]
    avghumidity: Option<f64>,
    #[serde(default)]
    condition: ApiCondition,
}
