//! Runtime configuration read from the environment.
//!
//! | variable                                | default                       |
//! |-----------------------------------------|-------------------------------|
//! | `SETTINGS_SEARCH_DIR`                   | `<data dir>/settingsSearch`   |
//! | `SETTINGS_SEARCH_BACKEND`               | `file` (`sqlite`, `memory`)   |
//! | `SETTINGS_SEARCH_CORPUS`                | unset (JSON file to search)   |
//! | `SETTINGS_SEARCH_KEYWORDS`              | unset (JSON keyword table)    |
//! | `SETTINGS_SEARCH_API`                   | unset (admin API base url)    |
//! | `SETTINGS_SEARCH_TOKEN`                 | unset (bearer token)          |
//! | `SETTINGS_SEARCH_THRESHOLD`             | `0.4`                         |
//! | `SETTINGS_SEARCH_FUZZY`                 | `true`                        |
//! | `SETTINGS_SEARCH_CATEGORY`              | `all`                         |
//! | `SETTINGS_SEARCH_DEBOUNCE_MS`           | `300`                         |
//! | `SETTINGS_SEARCH_DUPLICATE_WINDOW_SECS` | `5`                           |
//! | `SETTINGS_SEARCH_SAVE_INTERVAL_MS`      | `1000`                        |
//! | `date_format`                           | `%d.%m.%Y`                    |

use jiff::SignedDuration;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::StorageError;
use crate::history::HistoryOptions;
use crate::search::{ALL_CATEGORIES, DEFAULT_THRESHOLD};
use crate::storage::{default_storage_dir, FileStore, KeyValueStore, MemoryStore, SqliteStore};
use crate::utils::{get_env_bool_or, get_env_parsed, get_env_with_default, DEFAULT_DATE_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    File,
    Sqlite,
    Memory,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(Backend::File),
            "sqlite" | "db" => Ok(Backend::Sqlite),
            "memory" | "none" => Ok(Backend::Memory),
            other => Err(format!("unknown storage backend {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub storage_dir: Option<PathBuf>,
    pub backend: Backend,
    pub corpus_file: Option<PathBuf>,
    pub keywords_file: Option<PathBuf>,
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub threshold: f64,
    pub fuzzy: bool,
    pub category: String,
    pub debounce: SignedDuration,
    pub duplicate_window: SignedDuration,
    pub save_interval: SignedDuration,
    pub date_format: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            storage_dir: default_storage_dir(),
            backend: Backend::File,
            corpus_file: None,
            keywords_file: None,
            api_url: None,
            api_token: None,
            threshold: DEFAULT_THRESHOLD,
            fuzzy: true,
            category: ALL_CATEGORIES.to_string(),
            debounce: SignedDuration::from_millis(300),
            duplicate_window: SignedDuration::from_secs(5),
            save_interval: SignedDuration::from_secs(1),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        let defaults = SearchConfig::default();
        let threshold: f64 = get_env_parsed("SETTINGS_SEARCH_THRESHOLD", defaults.threshold);

        SearchConfig {
            storage_dir: optional_var("SETTINGS_SEARCH_DIR")
                .map(PathBuf::from)
                .or(defaults.storage_dir),
            backend: get_env_parsed("SETTINGS_SEARCH_BACKEND", defaults.backend),
            corpus_file: optional_var("SETTINGS_SEARCH_CORPUS").map(PathBuf::from),
            keywords_file: optional_var("SETTINGS_SEARCH_KEYWORDS").map(PathBuf::from),
            api_url: optional_var("SETTINGS_SEARCH_API"),
            api_token: optional_var("SETTINGS_SEARCH_TOKEN"),
            threshold: if (0.0..=1.0).contains(&threshold) {
                threshold
            } else {
                log::warn!("SETTINGS_SEARCH_THRESHOLD must be within 0..=1, using {}", defaults.threshold);
                defaults.threshold
            },
            fuzzy: get_env_bool_or("SETTINGS_SEARCH_FUZZY", defaults.fuzzy),
            category: optional_var("SETTINGS_SEARCH_CATEGORY").unwrap_or(defaults.category),
            debounce: SignedDuration::from_millis(get_env_parsed("SETTINGS_SEARCH_DEBOUNCE_MS", 300)),
            duplicate_window: SignedDuration::from_secs(get_env_parsed("SETTINGS_SEARCH_DUPLICATE_WINDOW_SECS", 5)),
            save_interval: SignedDuration::from_millis(get_env_parsed("SETTINGS_SEARCH_SAVE_INTERVAL_MS", 1000)),
            date_format: get_env_with_default("date_format", DEFAULT_DATE_FORMAT),
        }
    }

    pub fn history_options(&self) -> HistoryOptions {
        HistoryOptions {
            duplicate_window: self.duplicate_window,
            save_interval: self.save_interval,
        }
    }

    /// Open the configured store.
    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>, StorageError> {
        let dir = || self.storage_dir.clone().ok_or(StorageError::NoDirectory);
        let store: Box<dyn KeyValueStore> = match self.backend {
            Backend::File => Box::new(FileStore::new(dir()?)?),
            Backend::Sqlite => Box::new(SqliteStore::open(&dir()?.join("search.db"))?),
            Backend::Memory => Box::new(MemoryStore::new()),
        };
        Ok(store)
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn backend_names_parse() {
        assert_eq!("SQLite".parse::<Backend>(), Ok(Backend::Sqlite));
        assert_eq!("json".parse::<Backend>(), Ok(Backend::File));
        assert!("redis".parse::<Backend>().is_err());
    }

    #[test]
    fn defaults_match_the_documented_table() {
        let config = SearchConfig::default();
        assert_eq!(config.threshold, 0.4);
        assert_eq!(config.debounce, SignedDuration::from_millis(300));
        assert_eq!(config.history_options(), HistoryOptions::default());
    }

    #[test]
    fn each_backend_opens() {
        let dir = tempdir().unwrap();
        for backend in [Backend::File, Backend::Sqlite, Backend::Memory] {
            let config = SearchConfig {
                storage_dir: Some(dir.path().to_path_buf()),
                backend,
                ..SearchConfig::default()
            };
            let mut store = config.open_store().unwrap();
            store.set("k", "v").unwrap();
            assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        }
    }

    #[test]
    fn missing_directory_is_reported() {
        let config = SearchConfig {
            storage_dir: None,
            ..SearchConfig::default()
        };
        assert!(matches!(config.open_store(), Err(StorageError::NoDirectory)));
        let memory = SearchConfig {
            storage_dir: None,
            backend: Backend::Memory,
            ..SearchConfig::default()
        };
        assert!(memory.open_store().is_ok());
    }
}
