//! Command-line interface parsing for the agricultural dashboard
//!
//! This module handles parsing of CLI arguments (with environment variable
//! fallbacks) using clap, and converts them into a validated
//! [`StartupConfig`].

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::cache::DEFAULT_TTL;
use crate::data::weather::{DEFAULT_FORECAST_DAYS, DEFAULT_PROXY_URL, WEATHER_API_BASE_URL};
use crate::data::{normalize_location, CropSelection, GatewayEndpoint, Location, LocationError};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified crop is not in the crop table
    #[error("Invalid crop: '{0}'. Valid crops: {1}, or 'all'")]
    InvalidCrop(String, String),

    /// The location could not be normalized
    #[error("Invalid location: {0}")]
    InvalidLocation(#[from] LocationError),
}

/// Agrar Dashboard - Weather and harvest readiness for your crops
#[derive(Parser, Debug)]
#[command(name = "agrardash")]
#[command(about = "Weather-based harvest recommendations for field crops")]
#[command(version)]
pub struct Cli {
    /// Location: city, postal code, or "city, country"
    ///
    /// Examples:
    ///   agrardash --location Berlin
    ///   agrardash --location 80331
    ///   agrardash --location "Graz, AT"
    #[arg(short, long, env = "AGRARDASH_LOCATION", default_value = "Berlin")]
    pub location: String,

    /// Crop to evaluate, or "all"
    #[arg(short, long, value_name = "CROP", default_value = "all")]
    pub crop: String,

    /// WeatherAPI key; without it requests go through the proxy
    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// WeatherAPI base URL
    #[arg(long, env = "WEATHER_API_BASE", default_value = WEATHER_API_BASE_URL)]
    pub api_base: String,

    /// Serverless proxy URL used when no API key is set
    #[arg(long, env = "AGRARDASH_PROXY_URL", default_value = DEFAULT_PROXY_URL)]
    pub proxy_url: String,

    /// Number of forecast days to request (1-10)
    #[arg(long, default_value_t = DEFAULT_FORECAST_DAYS, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub forecast_days: u8,

    /// How long fetched weather stays fresh, in seconds
    #[arg(long, default_value_t = DEFAULT_TTL.as_secs())]
    pub cache_ttl_secs: u64,

    /// Auto-refresh interval, in seconds
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_secs: u64,

    /// Print a plain-text report and exit instead of starting the dashboard
    #[arg(long)]
    pub once: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Initial location
    pub location: Location,
    /// Initial crop selection
    pub selection: CropSelection,
    /// Where weather requests go
    pub endpoint: GatewayEndpoint,
    /// Forecast days to request
    pub forecast_days: u8,
    /// Cache time-to-live
    pub cache_ttl: Duration,
    /// Auto-refresh interval
    pub refresh_interval: Duration,
    /// Print once and exit
    pub once: bool,
}

/// Parses a crop argument into a selection.
///
/// # Returns
/// * `Ok(CropSelection)` for a known crop id or `all`
/// * `Err(CliError::InvalidCrop)` otherwise
pub fn parse_crop_arg(s: &str) -> Result<CropSelection, CliError> {
    CropSelection::parse(s).ok_or_else(|| {
        let valid = crate::data::all_crop_ids()
            .into_iter()
            .collect::<Vec<_>>()
            .join(", ");
        CliError::InvalidCrop(s.to_string(), valid)
    })
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the crop or location is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let location = normalize_location(&cli.location)?;
        let selection = parse_crop_arg(&cli.crop)?;

        let endpoint = match cli.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => GatewayEndpoint::Direct {
                base_url: cli.api_base.clone(),
                api_key: key.to_string(),
            },
            _ => GatewayEndpoint::Proxy {
                url: cli.proxy_url.clone(),
            },
        };

        Ok(StartupConfig {
            location,
            selection,
            endpoint,
            forecast_days: cli.forecast_days,
            cache_ttl: Duration::from_secs(cli.cache_ttl_secs),
            refresh_interval: Duration::from_secs(cli.refresh_secs),
            once: cli.once,
        })
    }
}
