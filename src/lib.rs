//! Fuzzy search over admin settings, with a local search history.
//!
//! - `search`: the match engine over a keyword-enriched corpus
//! - `history`, `suggest`, `analytics`: recent and popular searches
//! - `render`: category sections and highlight segments
//! - `session`: debounced search box tying engine and history together
//! - `storage`, `cache`, `source`: persistence and corpus loading

pub mod analytics;
pub mod cache;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fuzzy;
pub mod history;
pub mod keywords;
pub mod output;
pub mod render;
pub mod search;
pub mod session;
pub mod settings;
pub mod source;
pub mod storage;
pub mod suggest;
pub mod utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SearchConfig;
pub use history::{SearchHistory, SearchMode, SearchSettings};
pub use keywords::{default_mappings, KeywordIndex};
pub use search::{SearchEngine, SearchResult, ALL_CATEGORIES, DEFAULT_THRESHOLD};
pub use session::SearchSession;
pub use settings::{SettingRecord, SettingValue, Weight};
