//! Snapshot of the last settings corpus that loaded successfully.
use crate::error::CacheError;
use crate::settings::SettingRecord;
use crate::storage::default_storage_dir;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const CORPUS_FILE: &str = "corpus.cache";

/// Get the directory where the snapshot lives
pub fn get_cache_dir() -> Option<PathBuf> {
    let cache_dir = default_storage_dir()?;

    if !cache_dir.exists() {
        fs::create_dir_all(&cache_dir).ok()?;
    }

    Some(cache_dir)
}

/// Save the corpus snapshot
pub fn save_corpus(dir: &Path, records: &[SettingRecord]) -> Result<(), CacheError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let encoded = bincode::serialize(records)?;
    let mut file = File::create(dir.join(CORPUS_FILE))?;
    file.write_all(&encoded)?;
    log::debug!("Cached {} settings in {}", records.len(), dir.display());
    Ok(())
}

/// Load the corpus snapshot, empty when none was saved
pub fn load_corpus(dir: &Path) -> Result<Vec<SettingRecord>, CacheError> {
    let cache_file = dir.join(CORPUS_FILE);
    if !cache_file.exists() {
        return Ok(Vec::new());
    }
    let mut file = File::open(cache_file)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    let records: Vec<SettingRecord> = bincode::deserialize(&buffer)?;
    Ok(records)
}
