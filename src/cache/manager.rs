//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores serializable data in JSON files
//! together with the key it was written under and the write time in epoch
//! milliseconds. Freshness policy is left to the caller.

use chrono::Utc;
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Project name used for the XDG cache directory
const PROJECT_NAME: &str = "agrardash";

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The key the entry was written under
    location_key: String,
    /// The cached data
    payload: T,
    /// When the data was cached
    fetched_at_epoch_ms: i64,
}

/// Result of reading from cache
#[derive(Debug)]
pub struct CachedData<T> {
    /// The key stored inside the entry
    pub key: String,
    /// The cached data
    pub data: T,
    /// When the data was cached, in epoch milliseconds
    pub fetched_at_epoch_ms: i64,
}

impl<T> CachedData<T> {
    /// Age of the entry at `now_ms`
    ///
    /// `None` when the stored timestamp lies after `now_ms` or is too far
    /// away to subtract.
    pub fn age_ms(&self, now_ms: i64) -> Option<i64> {
        now_ms
            .checked_sub(self.fetched_at_epoch_ms)
            .filter(|age| *age >= 0)
    }
}

/// Manages reading and writing cached data to disk
///
/// The cache manager stores data as JSON files in an XDG-compliant cache
/// directory (`~/.cache/agrardash/` on Linux).
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", PROJECT_NAME)?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a CacheManager in the XDG directory, or in the system temp
    /// directory when no home directory exists
    pub fn new_or_temp() -> Self {
        Self::new().unwrap_or_else(|| Self::with_dir(std::env::temp_dir().join(PROJECT_NAME)))
    }

    /// Creates a new CacheManager with a custom cache directory
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory where cache files are stored
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    ///
    /// Characters outside `[A-Za-z0-9_-]` become `_`, so distinct keys may
    /// share a file; readers compare the stored key.
    fn cache_path(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.cache_dir.join(format!("{}.json", file_stem))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes data to the cache, stamped with the current time
    pub fn write<T: Serialize>(&self, key: &str, data: &T) -> io::Result<()> {
        self.write_at(key, data, Utc::now().timestamp_millis())
    }

    /// Writes data to the cache with an explicit timestamp
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the cache entry (e.g., "weather_berlin")
    /// * `data` - The data to cache (must implement Serialize)
    /// * `now_ms` - Write time in epoch milliseconds
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation or file writing fails
    pub fn write_at<T: Serialize>(&self, key: &str, data: &T, now_ms: i64) -> io::Result<()> {
        self.ensure_dir()?;

        let entry = CacheEntry {
            location_key: key.to_string(),
            payload: data,
            fetched_at_epoch_ms: now_ms,
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        // Readers never observe a partially written entry
        let path = self.cache_path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(tmp_path, path)
    }

    /// Reads data from the cache
    ///
    /// Returns `None` if the entry doesn't exist or cannot be parsed. Corrupt
    /// entries are never reported as errors.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let path = self.cache_path(key);
        let content = fs::read_to_string(&path).ok()?;
        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "ignoring unreadable cache entry");
                return None;
            }
        };

        Some(CachedData {
            key: entry.location_key,
            data: entry.payload,
            fetched_at_epoch_ms: entry.fetched_at_epoch_ms,
        })
    }

    /// Removes the entry for a key; a missing entry is not an error
    pub fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.cache_path(key)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    #[test]
    fn test_write_creates_file_in_cache_directory() {
        let (cache, temp_dir) = create_test_cache();
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        cache.write("test_key", &data).expect("Write should succeed");

        let expected_path = temp_dir.path().join("test_key.json");
        assert!(expected_path.exists(), "Cache file should exist");
        assert!(!temp_dir.path().join("test_key.json.tmp").exists());

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("\"location_key\""));
        assert!(content.contains("\"payload\""));
        assert!(content.contains("\"fetched_at_epoch_ms\""));
        assert!(content.contains("42"));
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let (cache, _temp_dir) = create_test_cache();

        let result: Option<CachedData<TestData>> = cache.read("nonexistent_key");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_read_returns_none_for_corrupt_file() {
        let (cache, temp_dir) = create_test_cache();
        fs::write(temp_dir.path().join("corrupt.json"), "{ not json").unwrap();

        let result: Option<CachedData<TestData>> = cache.read("corrupt");

        assert!(result.is_none(), "Corrupt entries read as missing");
    }

    #[test]
    fn test_read_returns_none_for_wrong_shape() {
        let (cache, _temp_dir) = create_test_cache();
        cache.write("shape", &vec![1, 2, 3]).unwrap();

        let result: Option<CachedData<TestData>> = cache.read("shape");

        assert!(result.is_none());
    }

    #[test]
    fn test_cache_survives_serialization_roundtrip() {
        let (cache, _temp_dir) = create_test_cache();
        let original = TestData {
            name: "roundtrip".to_string(),
            value: 12345,
        };

        cache.write_at("roundtrip_key", &original, 1_000).expect("Write should succeed");

        let result: CachedData<TestData> = cache.read("roundtrip_key").expect("Should read cache");

        assert_eq!(result.data, original, "Data should survive roundtrip");
        assert_eq!(result.key, "roundtrip_key");
        assert_eq!(result.fetched_at_epoch_ms, 1_000);
        assert_eq!(result.age_ms(1_500), Some(500));
    }

    #[test]
    fn test_age_out_of_range_is_none() {
        let entry = CachedData {
            key: "k".to_string(),
            data: (),
            fetched_at_epoch_ms: 2_000,
        };
        assert_eq!(entry.age_ms(2_000), Some(0));
        assert_eq!(entry.age_ms(1_999), None);

        let ancient = CachedData {
            key: "k".to_string(),
            data: (),
            fetched_at_epoch_ms: i64::MIN,
        };
        assert_eq!(ancient.age_ms(1_000), None);
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let cache = CacheManager::with_dir(nested_path.clone());

        let data = TestData {
            name: "nested".to_string(),
            value: 1,
        };

        cache.write("nested_key", &data).expect("Write should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("nested_key.json").exists(), "Cache file should exist");
    }

    #[test]
    fn test_fetched_at_timestamp_is_recorded() {
        let (cache, _temp_dir) = create_test_cache();
        let data = TestData {
            name: "timestamp".to_string(),
            value: 999,
        };

        let before = Utc::now().timestamp_millis();
        cache.write("timestamp_key", &data).expect("Write should succeed");
        let after = Utc::now().timestamp_millis();

        let result: CachedData<TestData> = cache.read("timestamp_key").expect("Should read cache");

        assert!(result.fetched_at_epoch_ms >= before);
        assert!(result.fetched_at_epoch_ms <= after);
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheManager::new() {
            let path_str = cache.cache_dir.to_string_lossy();
            assert!(
                path_str.contains("agrardash"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }

    #[test]
    fn test_cache_path_sanitizes_keys() {
        let (cache, temp_dir) = create_test_cache();
        assert_eq!(
            cache.cache_path("weather_10115,germany"),
            temp_dir.path().join("weather_10115_germany.json")
        );
        assert_eq!(
            cache.cache_path("../etc/passwd"),
            temp_dir.path().join("___etc_passwd.json")
        );
    }

    #[test]
    fn test_overwrite_existing_cache() {
        let (cache, _temp_dir) = create_test_cache();
        let data1 = TestData {
            name: "first".to_string(),
            value: 1,
        };
        let data2 = TestData {
            name: "second".to_string(),
            value: 2,
        };

        cache.write("overwrite_key", &data1).expect("First write should succeed");
        cache.write("overwrite_key", &data2).expect("Second write should succeed");

        let result: CachedData<TestData> = cache.read("overwrite_key").expect("Should read cache");

        assert_eq!(result.data, data2, "Cache should contain latest data");
    }

    #[test]
    fn test_remove_deletes_entry_and_tolerates_missing() {
        let (cache, _temp_dir) = create_test_cache();
        let data = TestData {
            name: "gone".to_string(),
            value: 0,
        };

        cache.write("remove_key", &data).unwrap();
        cache.remove("remove_key").expect("Remove should succeed");

        let result: Option<CachedData<TestData>> = cache.read("remove_key");
        assert!(result.is_none());
        cache.remove("remove_key").expect("Removing twice is fine");
    }
}
