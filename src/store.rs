//! Price cache persistence
//!
//! The cache maps product name to the last observed price. It is loaded at
//! the start of a check and fully rewritten at the end of it.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

use crate::error::{Result, TrackerError};

/// Product name -> last observed price (`None` when the page had no price)
pub type PriceCache = BTreeMap<String, Option<Decimal>>;

/// Storage backend for the price cache
pub trait PriceStore {
    /// Load the whole cache. A store that has never been written is empty.
    fn load(&self) -> Result<PriceCache>;

    /// Replace the stored cache with `cache`
    fn save(&self, cache: &PriceCache) -> Result<()>;
}

impl<T: PriceStore + ?Sized> PriceStore for &T {
    fn load(&self) -> Result<PriceCache> {
        (**self).load()
    }

    fn save(&self, cache: &PriceCache) -> Result<()> {
        (**self).save(cache)
    }
}

/// JSON file on disk, pretty-printed
#[derive(Debug, Clone)]
pub struct FilePriceStore {
    path: PathBuf,
}

impl FilePriceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_error(&self, e: impl fmt::Display) -> TrackerError {
        TrackerError::CacheWrite(format!("{}: {}", self.path.display(), e))
    }
}

impl PriceStore for FilePriceStore {
    fn load(&self) -> Result<PriceCache> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No price cache at {}", self.path.display());
                return Ok(PriceCache::new());
            }
            Err(e) => {
                return Err(TrackerError::CacheRead(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            TrackerError::CacheRead(format!(
                "malformed price cache {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, cache: &PriceCache) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let json = serde_json::to_string_pretty(cache).map_err(|e| self.write_error(e))?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        fs::write(&tmp_path, json).map_err(|e| self.write_error(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.write_error(e))?;

        debug!(
            "Wrote {} cached prices to {}",
            cache.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// In-process store, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryPriceStore {
    cache: Mutex<PriceCache>,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prices(cache: PriceCache) -> Self {
        Self {
            cache: Mutex::new(cache),
        }
    }
}

impl PriceStore for MemoryPriceStore {
    fn load(&self) -> Result<PriceCache> {
        self.cache
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| TrackerError::CacheRead("memory store lock poisoned".to_string()))
    }

    fn save(&self, cache: &PriceCache) -> Result<()> {
        let mut guard = self
            .cache
            .lock()
            .map_err(|_| TrackerError::CacheWrite("memory store lock poisoned".to_string()))?;
        *guard = cache.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_cache() {
        let dir = TempDir::new().unwrap();
        let store = FilePriceStore::new(dir.path().join("last_prices.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FilePriceStore::new(dir.path().join("nested").join("last_prices.json"));

        let mut cache = PriceCache::new();
        cache.insert("Sample Widget".to_string(), Some(dec!(10.0)));
        cache.insert("Gift Card".to_string(), None);
        store.save(&cache).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.get("Sample Widget"), Some(&Some(dec!(10))));
        assert_eq!(loaded.get("Gift Card"), Some(&None));
        assert!(!dir.path().join("nested").join("last_prices.json.tmp").exists());
    }

    #[test]
    fn test_file_is_pretty_json_object_of_numbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_prices.json");
        let store = FilePriceStore::new(&path);

        let mut cache = PriceCache::new();
        cache.insert("Sample Widget".to_string(), Some(dec!(19.99)));
        store.save(&cache).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["Sample Widget"].as_f64(), Some(19.99));
    }

    #[test]
    fn test_malformed_file_is_cache_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_prices.json");
        fs::write(&path, "{not json").unwrap();

        let err = FilePriceStore::new(&path).load().unwrap_err();
        assert!(matches!(err, TrackerError::CacheRead(_)));

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(FilePriceStore::new(&path).load().is_err());
    }

    #[test]
    fn test_prices_keep_every_digit_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_prices.json");
        let store = FilePriceStore::new(&path);

        let mut cache = PriceCache::new();
        cache.insert("W".to_string(), Some(dec!(19.999999999999999999)));
        cache.insert("Lamp".to_string(), Some(dec!(4.81)));
        store.save(&cache).unwrap();

        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains("19.999999999999999999"));
        assert_eq!(store.load().unwrap(), cache);
    }

    #[test]
    fn test_one_bad_entry_rejects_the_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_prices.json");
        fs::write(&path, r#"{"A": 10, "B": "n/a"}"#).unwrap();

        let err = FilePriceStore::new(&path).load().unwrap_err();
        assert!(matches!(err, TrackerError::CacheRead(_)));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryPriceStore::new();
        assert!(store.load().unwrap().is_empty());

        let mut cache = PriceCache::new();
        cache.insert("Lamp".to_string(), Some(dec!(5)));
        store.save(&cache).unwrap();
        assert_eq!(store.load().unwrap(), cache);
    }
}
