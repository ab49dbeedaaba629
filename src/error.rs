//! Error types for each concern of the crate.
//!
//! Library entry points that face the UI (`SearchEngine::search`, the
//! `SearchHistory` operations) log these and degrade to a safe default;
//! the lower layers return them so callers can decide.

use thiserror::Error;

/// Failures of the local key-value store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite storage failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("could not (de)serialize {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("quota exceeded writing {key}: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("no storage directory available")]
    NoDirectory,
}

/// Failures inside the match engine. Never escape `SearchEngine::search`.
#[derive(Error, Debug, PartialEq)]
pub enum SearchError {
    #[error("malformed setting record {key:?}: {reason}")]
    MalformedRecord { key: String, reason: &'static str },
}

/// Failures loading the settings corpus from its upstream source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("endpoint {url} answered {status}")]
    Status { url: String, status: u16 },

    #[error("could not parse settings payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unrecognized settings payload shape")]
    UnknownShape,
}

/// Failures of the on-disk corpus snapshot.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}
