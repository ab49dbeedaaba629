//! Search history store: recent queries and per-term statistics.
//!
//! Provides:
//! - `SearchHistory`, loaded from a `KeyValueStore` and written back through
//!   a `SaveThrottle`
//! - `SearchHistoryEntry`, `PopularTermStat`, `SearchSettings`
//! - export/import of the whole state as one JSON document
//!
//! Storage problems never reach the caller: they are logged and the store
//! carries on with whatever it has in memory.

use jiff::{SignedDuration, Timestamp};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use crate::analytics::{summarize, SearchAnalytics};
use crate::clock::Clock;
use crate::debounce::SaveThrottle;
use crate::error::StorageError;
use crate::search::SearchResult;
use crate::storage::{KeyValueStore, HISTORY_KEY, POPULAR_TERMS_KEY, SETTINGS_KEY};
use crate::suggest::{suggest, Suggestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Fuzzy,
    Exact,
}

impl SearchMode {
    pub fn from_fuzzy(fuzzy: bool) -> Self {
        if fuzzy {
            SearchMode::Fuzzy
        } else {
            SearchMode::Exact
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: String,
    pub term: String,
    pub original_term: String,
    pub timestamp: Timestamp,
    pub result_count: usize,
    pub search_mode: SearchMode,
    pub categories: BTreeSet<String>,
    pub successful: bool,
}

impl SearchHistoryEntry {
    fn new(original: &str, term: String, results: &[SearchResult], mode: SearchMode, now: Timestamp) -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(9)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();

        SearchHistoryEntry {
            id: format!("{}-{}", now.as_millisecond(), suffix),
            term,
            original_term: original.trim().to_string(),
            timestamp: now,
            result_count: results.len(),
            search_mode: mode,
            categories: results.iter().map(|r| r.record.category.clone()).collect(),
            successful: !results.is_empty(),
        }
    }
}

/// Cumulative statistics for one normalized term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularTermStat {
    pub count: u64,
    pub success_count: u64,
    pub first_used: Timestamp,
    pub last_used: Timestamp,
}

impl PopularTermStat {
    pub fn success_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.count as f64
        }
    }
}

/// A ranked view of one popular term
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularTerm {
    pub term: String,
    pub count: u64,
    pub success_count: u64,
    pub success_rate: f64,
    pub last_used: Timestamp,
}

/// User preferences for the history store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
    pub max_history_size: usize,
    pub max_suggestions: usize,
    pub enable_history: bool,
    pub enable_analytics: bool,
    pub retention_days: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            max_history_size: 50,
            max_suggestions: 8,
            enable_history: true,
            enable_analytics: true,
            retention_days: 30,
        }
    }
}

/// Timing knobs that are not user preferences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryOptions {
    /// Re-recording the newest term inside this window adds no entry.
    pub duplicate_window: SignedDuration,
    /// Minimum gap between two storage writes.
    pub save_interval: SignedDuration,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        HistoryOptions {
            duplicate_window: SignedDuration::from_secs(5),
            save_interval: SignedDuration::from_secs(1),
        }
    }
}

/// Everything the store knows, as one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub settings: SearchSettings,
    pub history: Vec<SearchHistoryEntry>,
    pub popular_terms: BTreeMap<String, PopularTermStat>,
    pub analytics: SearchAnalytics,
    pub export_date: Timestamp,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportData {
    settings: Option<SearchSettings>,
    history: Option<Vec<SearchHistoryEntry>>,
    popular_terms: Option<BTreeMap<String, PopularTermStat>>,
}

pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

pub struct SearchHistory {
    storage: Box<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    options: HistoryOptions,
    settings: SearchSettings,
    entries: Vec<SearchHistoryEntry>,
    popular: BTreeMap<String, PopularTermStat>,
    throttle: SaveThrottle,
}

impl SearchHistory {
    /// Read the persisted state, dropping entries past the retention window.
    pub fn load(storage: Box<dyn KeyValueStore>, clock: Arc<dyn Clock>, options: HistoryOptions) -> Self {
        let settings: SearchSettings = read_json(storage.as_ref(), SETTINGS_KEY).unwrap_or_default();
        let mut entries: Vec<SearchHistoryEntry> = read_json(storage.as_ref(), HISTORY_KEY).unwrap_or_default();
        let popular: BTreeMap<String, PopularTermStat> =
            read_json(storage.as_ref(), POPULAR_TERMS_KEY).unwrap_or_default();

        let now = clock.now();
        let retention = SignedDuration::from_hours(24 * i64::from(settings.retention_days));
        let before = entries.len();
        entries.retain(|e| now.duration_since(e.timestamp) <= retention);
        entries.truncate(settings.max_history_size);
        if entries.len() != before {
            log::debug!("Dropped {} expired history entries", before - entries.len());
        }

        log::trace!(
            "Loaded search history: {} entries, {} popular terms",
            entries.len(),
            popular.len()
        );

        SearchHistory {
            storage,
            clock,
            throttle: SaveThrottle::new(options.save_interval),
            options,
            settings,
            entries,
            popular,
        }
    }

    /// Record a finished search.
    pub fn add_search(&mut self, term: &str, results: &[SearchResult], mode: SearchMode) {
        let normalized = normalize_term(term);
        if !self.settings.enable_history || normalized.is_empty() {
            return;
        }

        let now = self.clock.now();
        let repeated = self.entries.first().is_some_and(|newest| {
            newest.term == normalized && now.duration_since(newest.timestamp) < self.options.duplicate_window
        });

        if repeated {
            log::trace!("Skipping repeated search for {:?}", normalized);
        } else {
            self.entries.retain(|e| e.term != normalized);
            self.entries
                .insert(0, SearchHistoryEntry::new(term, normalized.clone(), results, mode, now));
            self.entries.truncate(self.settings.max_history_size);
        }

        if self.settings.enable_analytics {
            let stat = self
                .popular
                .entry(normalized)
                .or_insert_with(|| PopularTermStat {
                    count: 0,
                    success_count: 0,
                    first_used: now,
                    last_used: now,
                });
            stat.count += 1;
            if !results.is_empty() {
                stat.success_count += 1;
            }
            stat.last_used = now;
        }

        self.persist();
    }

    pub fn get_recent_searches(&self, limit: usize) -> &[SearchHistoryEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    /// Terms by success rate, then count, then name.
    pub fn get_popular_terms(&self, limit: usize) -> Vec<PopularTerm> {
        let mut ranked = self.ranked_popular();
        ranked.truncate(limit);
        ranked
    }

    pub fn get_suggestions(&self, current: &str, limit: usize) -> Vec<Suggestion> {
        suggest(&self.entries, &self.ranked_popular(), current, limit)
    }

    /// Remove one entry; term statistics are left as they are.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear_history(&mut self) {
        self.entries.clear();
        self.save_now();
    }

    pub fn clear_popular_terms(&mut self) {
        self.popular.clear();
        self.save_now();
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.popular.clear();
        self.save_now();
    }

    pub fn get_analytics(&self) -> SearchAnalytics {
        summarize(&self.entries, &self.popular, self.clock.now())
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Replace the preferences and write them straight away.
    pub fn update_settings(&mut self, settings: SearchSettings) {
        self.settings = settings;
        if self.entries.len() > self.settings.max_history_size {
            self.entries.truncate(self.settings.max_history_size);
            self.persist();
        }
        write_json(self.storage.as_mut(), SETTINGS_KEY, &self.settings);
    }

    pub fn export_data(&self) -> ExportData {
        ExportData {
            settings: self.settings.clone(),
            history: self.entries.clone(),
            popular_terms: self.popular.clone(),
            analytics: self.get_analytics(),
            export_date: self.clock.now(),
        }
    }

    /// Suggested download name, e.g. `settings-search-export-2026-10-17.json`.
    pub fn export_file_name(&self) -> String {
        let millis = self.clock.now().as_millisecond();
        let date = chrono::DateTime::from_timestamp_millis(millis)
            .map(|utc| utc.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown-date".to_string());
        format!("settings-search-export-{}.json", date)
    }

    /// Overwrite each top-level field present in `data`. Returns false and
    /// changes nothing when the payload does not have the export shape.
    pub fn import_data(&mut self, data: &serde_json::Value) -> bool {
        let parsed: ImportData = match serde_json::from_value(data.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::error!("Rejected search history import: {}", e);
                return false;
            }
        };

        if let Some(settings) = parsed.settings {
            self.settings = settings;
        }
        if let Some(history) = parsed.history {
            let mut seen = HashSet::new();
            self.entries = history
                .into_iter()
                .filter(|entry| seen.insert(normalize_term(&entry.term)))
                .collect();
        }
        self.entries.truncate(self.settings.max_history_size);
        if let Some(popular) = parsed.popular_terms {
            self.popular = popular;
        }
        self.save_now();
        true
    }

    pub fn import_str(&mut self, json: &str) -> bool {
        match serde_json::from_str::<serde_json::Value>(json) {
            Ok(value) => self.import_data(&value),
            Err(e) => {
                log::error!("Search history import is not JSON: {}", e);
                false
            }
        }
    }

    /// Write owed changes once the save interval has passed.
    pub fn tick(&mut self) {
        if self.throttle.due(self.clock.now()) {
            self.save_now();
        }
    }

    /// Write owed changes now.
    pub fn flush(&mut self) {
        if self.throttle.is_dirty() {
            self.save_now();
        }
    }

    fn ranked_popular(&self) -> Vec<PopularTerm> {
        let mut ranked: Vec<PopularTerm> = self
            .popular
            .iter()
            .map(|(term, stat)| PopularTerm {
                term: term.clone(),
                count: stat.count,
                success_count: stat.success_count,
                success_rate: stat.success_rate(),
                last_used: stat.last_used,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.success_rate
                .total_cmp(&a.success_rate)
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| a.term.cmp(&b.term))
        });
        ranked
    }

    fn persist(&mut self) {
        if self.throttle.request(self.clock.now()) {
            self.write_state();
        }
    }

    fn save_now(&mut self) {
        self.throttle.mark_written(self.clock.now());
        self.write_state();
    }

    /// Empty collections are removed rather than stored.
    fn write_state(&mut self) {
        write_json(self.storage.as_mut(), SETTINGS_KEY, &self.settings);
        if self.entries.is_empty() {
            remove_key(self.storage.as_mut(), HISTORY_KEY);
        } else {
            write_json(self.storage.as_mut(), HISTORY_KEY, &self.entries);
        }
        if self.popular.is_empty() {
            remove_key(self.storage.as_mut(), POPULAR_TERMS_KEY);
        } else {
            write_json(self.storage.as_mut(), POPULAR_TERMS_KEY, &self.popular);
        }
    }
}

impl Drop for SearchHistory {
    fn drop(&mut self) {
        self.flush();
    }
}

fn write_json<T: Serialize + ?Sized>(storage: &mut dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })
        .and_then(|raw| storage.set(key, &raw));
    if let Err(e) = result {
        log::warn!("Could not save {}: {}", key, e);
    }
}

fn remove_key(storage: &mut dyn KeyValueStore, key: &str) {
    if let Err(e) = storage.remove(key) {
        log::warn!("Could not remove {}: {}", key, e);
    }
}

fn read_json<T: DeserializeOwned>(storage: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Could not read {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(source) => {
            let e = StorageError::Serialization {
                key: key.to_string(),
                source,
            };
            log::warn!("Ignoring stored value: {}", e);
            None
        }
    }
}
