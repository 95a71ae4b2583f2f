//! Per-location weather cache with a fixed time-to-live
//!
//! Wraps [`CacheManager`] with the freshness rules the dashboard relies on:
//! an entry is served only while it is younger than the TTL and was stored
//! under exactly the requested location key. Anything else is a miss.

use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;

use super::CacheManager;
use crate::data::WeatherReport;

/// Default time-to-live for cached weather (10 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_millis(600_000);

/// Prefix separating weather entries from other files in the cache directory
const KEY_PREFIX: &str = "weather_";

/// Stores the last successful weather report for each location
#[derive(Debug, Clone)]
pub struct LocationCache {
    store: CacheManager,
}

impl Default for LocationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationCache {
    /// Creates a cache in the XDG cache directory (temp dir as fallback)
    pub fn new() -> Self {
        Self {
            store: CacheManager::new_or_temp(),
        }
    }

    /// Creates a cache backed by an existing manager
    pub fn with_manager(store: CacheManager) -> Self {
        Self { store }
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        self.store.dir()
    }

    fn file_key(location_key: &str) -> String {
        format!("{}{}", KEY_PREFIX, location_key)
    }

    /// Returns the cached report if it is fresh at the current time
    pub fn get(&self, location_key: &str, ttl: Duration) -> Option<WeatherReport> {
        self.get_at(location_key, ttl, Utc::now().timestamp_millis())
    }

    /// Returns the cached report if it is fresh at `now_ms`
    ///
    /// # Returns
    /// * `Some(WeatherReport)` if an entry exists for exactly this key and
    ///   `now_ms - fetched_at < ttl`
    /// * `None` for missing, corrupt, expired or mismatched entries
    pub fn get_at(&self, location_key: &str, ttl: Duration, now_ms: i64) -> Option<WeatherReport> {
        let cached = self
            .store
            .read::<WeatherReport>(&Self::file_key(location_key))?;

        if cached.key != Self::file_key(location_key) {
            tracing::debug!(requested = location_key, stored = %cached.key, "cache key mismatch");
            return None;
        }

        let Some(age_ms) = cached.age_ms(now_ms) else {
            tracing::debug!(
                location_key,
                fetched_at = cached.fetched_at_epoch_ms,
                now_ms,
                "cache entry timestamp out of range"
            );
            return None;
        };

        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        if age_ms >= ttl_ms {
            tracing::debug!(location_key, age_ms, "cache entry expired");
            return None;
        }

        Some(cached.data)
    }

    /// Replaces any entry for the location, stamped with the current time
    pub fn put(&self, location_key: &str, payload: &WeatherReport) -> io::Result<()> {
        self.store.write(&Self::file_key(location_key), payload)
    }

    /// Replaces any entry for the location, stamped with `now_ms`
    pub fn put_at(&self, location_key: &str, payload: &WeatherReport, now_ms: i64) -> io::Result<()> {
        self.store
            .write_at(&Self::file_key(location_key), payload, now_ms)
    }

    /// Removes the entry for the location, if any
    pub fn invalidate(&self, location_key: &str) -> io::Result<()> {
        self.store.remove(&Self::file_key(location_key))
    }
}
