// src/main.rs
use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use settings_search::clock::{Clock, SystemClock};
use settings_search::output::{output_results, popular_items, print_json, recent_items};
use settings_search::storage::{KeyValueStore, MemoryStore};
use settings_search::{
    cache, default_mappings, source, KeywordIndex, SearchConfig, SearchEngine, SearchHistory,
    SearchSession, SettingRecord,
};

const DEFAULT_LIMIT: usize = 10;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let start = Instant::now();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("search");
    let argument = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
    log::debug!("command {} argument {:?}", command, argument);

    let config = SearchConfig::from_env();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = config.open_store().unwrap_or_else(|e| {
        log::warn!("Search history storage unavailable ({}), keeping it in memory", e);
        Box::new(MemoryStore::new()) as Box<dyn KeyValueStore>
    });
    let mut history = SearchHistory::load(store, clock.clone(), config.history_options());

    match command {
        "search" | "exact" => {
            let records = load_records(&config);
            let engine = SearchEngine::new(&records, &keyword_index(&config), config.threshold);
            let fuzzy = command == "search" && config.fuzzy;

            let mut session = SearchSession::new(engine, history, clock, config.debounce, fuzzy);
            session.set_category(&config.category);
            session.set_query(&argument);
            session.run_now();
            output_results(&argument, session.results())?;
            session.history_mut().flush();
        }
        "categories" => {
            let records = load_records(&config);
            let engine = SearchEngine::new(&records, &KeywordIndex::default(), config.threshold);
            print_json(&engine.categories())?;
        }
        "suggest" => {
            let limit = history.settings().max_suggestions;
            print_json(&history.get_suggestions(&argument, limit))?;
        }
        "recent" => {
            let entries = history.get_recent_searches(parse_limit(&argument));
            print_json(&recent_items(entries, &config.date_format))?;
        }
        "popular" => {
            let terms = history.get_popular_terms(parse_limit(&argument));
            print_json(&popular_items(&terms, &config.date_format))?;
        }
        "analytics" => print_json(&history.get_analytics())?,
        "export" => {
            let data = history.export_data();
            if argument.is_empty() {
                print_json(&data)?;
            } else {
                let path = Path::new(&argument).join(history.export_file_name());
                fs::write(&path, serde_json::to_string_pretty(&data)?)?;
                println!("{}", path.display());
            }
        }
        "import" => {
            let raw = fs::read_to_string(&argument)?;
            let imported = history.import_str(&raw);
            print_json(&serde_json::json!({ "imported": imported }))?;
        }
        "remove" => {
            let removed = history.remove_item(&argument);
            history.flush();
            print_json(&serde_json::json!({ "removed": removed }))?;
        }
        "clear" => {
            match argument.as_str() {
                "history" => history.clear_history(),
                "popular" => history.clear_popular_terms(),
                _ => history.clear_all(),
            }
            print_json(&serde_json::json!({ "cleared": true }))?;
        }
        other => return Err(format!("unknown command {:?}", other).into()),
    }

    log::debug!("{} completed in {:?}", command, start.elapsed());
    Ok(())
}

/// Corpus from the configured file or API, else the last cached snapshot.
fn load_records(config: &SearchConfig) -> Vec<SettingRecord> {
    let loaded = if let Some(path) = &config.corpus_file {
        Some(source::load_corpus_file(path))
    } else {
        config
            .api_url
            .as_deref()
            .map(|url| source::fetch_corpus(url, config.api_token.as_deref()))
    };

    let cache_dir = config.storage_dir.clone().or_else(cache::get_cache_dir);

    match loaded {
        Some(Ok(records)) => {
            if let Some(dir) = &cache_dir {
                if let Err(e) = cache::save_corpus(dir, &records) {
                    log::warn!("Could not cache settings: {}", e);
                }
            }
            records
        }
        Some(Err(e)) => {
            log::error!("Could not load settings ({}), using cached copy", e);
            cached_records(cache_dir.as_deref())
        }
        None => cached_records(cache_dir.as_deref()),
    }
}

/// The configured keyword table, or the built-in one.
fn keyword_index(config: &SearchConfig) -> KeywordIndex {
    let custom = config.keywords_file.as_deref().and_then(|path| {
        fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| KeywordIndex::from_json(&raw).map_err(|e| e.to_string()))
            .map_err(|e| log::error!("Keyword table {} unusable ({}), using built-in table", path.display(), e))
            .ok()
    });

    match custom {
        Some(index) if index.is_empty() => {
            log::warn!("Keyword table is empty, acronyms and synonyms will not match");
            index
        }
        Some(index) => index,
        None => KeywordIndex::compile(&default_mappings()),
    }
}

fn cached_records(dir: Option<&Path>) -> Vec<SettingRecord> {
    let Some(dir) = dir else {
        return Vec::new();
    };
    cache::load_corpus(dir).unwrap_or_else(|e| {
        log::error!("Settings cache unreadable: {}", e);
        Vec::new()
    })
}

fn parse_limit(argument: &str) -> usize {
    argument.trim().parse().unwrap_or(DEFAULT_LIMIT)
}
