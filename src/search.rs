//! Settings match engine.
//!
//! Defines:
//! - `SearchEngine`, holding the keyword-enriched corpus
//! - `SearchResult` with optional score and per-field match spans
//! - `SearchField` and the field weights used by fuzzy ranking
//! - `filter_results` / `matches` for exact substring mode

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::SearchError;
use crate::fuzzy::{approximate_find, fold_str, Span};
use crate::keywords::KeywordIndex;
use crate::settings::SettingRecord;

/// Category filter value that disables filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Default similarity threshold: 0.0 is exact, 1.0 matches anything.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Floor for a perfect field score, so field weights still separate exact hits.
const EXACT_FLOOR: f64 = 0.001;

/// Fields consulted by fuzzy matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Key,
    Description,
    Category,
    Keywords,
    Synonyms,
}

impl SearchField {
    pub const ALL: [SearchField; 6] = [
        SearchField::Title,
        SearchField::Key,
        SearchField::Description,
        SearchField::Category,
        SearchField::Keywords,
        SearchField::Synonyms,
    ];

    pub fn weight(&self) -> f64 {
        match self {
            SearchField::Title => 0.4,
            SearchField::Key => 0.3,
            SearchField::Description => 0.25,
            SearchField::Category => 0.15,
            SearchField::Keywords => 0.2,
            SearchField::Synonyms => 0.25,
        }
    }

    /// Text values of this field on a record. Set-valued fields yield one per element.
    pub fn values<'a>(&self, record: &'a SettingRecord) -> Vec<&'a str> {
        match self {
            SearchField::Title => vec![record.search.title.as_str()],
            SearchField::Key => vec![record.key.as_str()],
            SearchField::Description => vec![record.description.as_str()],
            SearchField::Category => vec![record.category.as_str()],
            SearchField::Keywords => record.search.keywords.iter().map(String::as_str).collect(),
            SearchField::Synonyms => record.search.synonyms.iter().map(String::as_str).collect(),
        }
    }
}

/// Where a fuzzy query landed inside one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatch {
    pub field: SearchField,
    pub value: String,
    pub score: f64,
    pub spans: Vec<Span>,
}

/// One ranked setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub record: SettingRecord,
    /// Lower is better; only set in fuzzy mode.
    pub score: Option<f64>,
    pub matches: Vec<FieldMatch>,
}

impl SearchResult {
    fn unranked(record: SettingRecord) -> Self {
        SearchResult {
            record,
            score: None,
            matches: Vec::new(),
        }
    }

    pub fn field_match(&self, field: SearchField) -> Option<&FieldMatch> {
        self.matches.iter().find(|m| m.field == field)
    }
}

/// Corpus plus the settings the engine ranks with
#[derive(Debug, Clone)]
pub struct SearchEngine {
    corpus: Vec<SettingRecord>,
    threshold: f64,
}

impl SearchEngine {
    /// Enrich `records` from the keyword index once; every later search reuses it.
    pub fn new(records: &[SettingRecord], index: &KeywordIndex, threshold: f64) -> Self {
        let corpus = index.enrich(records);
        log::debug!("Search engine ready over {} settings", corpus.len());
        SearchEngine { corpus, threshold }
    }

    pub fn corpus(&self) -> &[SettingRecord] {
        &self.corpus
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.corpus
            .iter()
            .map(|r| r.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rank the corpus against `query`.
    ///
    /// Never fails: a malformed record is logged and the whole corpus is
    /// returned unfiltered.
    pub fn search(&self, query: &str, category: &str, fuzzy: bool) -> Vec<SearchResult> {
        match self.try_search(query, category, fuzzy) {
            Ok(results) => results,
            Err(e) => {
                log::error!("Search for {:?} failed, showing all settings: {}", query, e);
                self.corpus.iter().cloned().map(SearchResult::unranked).collect()
            }
        }
    }

    pub fn try_search(
        &self,
        query: &str,
        category: &str,
        fuzzy: bool,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let query = query.trim();
        let all_categories = category == ALL_CATEGORIES;

        if query.is_empty() && all_categories {
            return Ok(self.corpus.iter().cloned().map(SearchResult::unranked).collect());
        }

        for record in &self.corpus {
            record.validate()?;
        }

        let mut results: Vec<SearchResult> = if query.is_empty() {
            self.corpus.iter().cloned().map(SearchResult::unranked).collect()
        } else if fuzzy {
            let pattern = fold_str(query);
            self.corpus
                .par_iter()
                .filter_map(|record| self.score_record(&pattern, record))
                .collect()
        } else {
            filter_results(&self.corpus, query)
                .into_iter()
                .map(SearchResult::unranked)
                .collect()
        };

        if !all_categories {
            results.retain(|r| r.record.category == category);
        }

        sort_results(&mut results);
        Ok(results)
    }

    fn score_record(&self, pattern: &[char], record: &SettingRecord) -> Option<SearchResult> {
        let mut matches = Vec::new();

        for field in SearchField::ALL {
            let best = field
                .values(record)
                .into_iter()
                .filter_map(|value| {
                    approximate_find(pattern, value)
                        .filter(|hit| hit.score <= self.threshold)
                        .map(|hit| (value, hit))
                })
                .min_by(|a, b| a.1.score.total_cmp(&b.1.score));

            if let Some((value, hit)) = best {
                matches.push(FieldMatch {
                    field,
                    value: value.to_string(),
                    score: hit.score,
                    spans: hit.spans,
                });
            }
        }

        let score = matches
            .iter()
            .map(|m| m.score.max(EXACT_FLOOR) * (1.0 - m.field.weight()))
            .min_by(f64::total_cmp)?;

        Some(SearchResult {
            record: record.clone(),
            score: Some(score),
            matches,
        })
    }
}

/// Scored results ascending by score; unscored by weight, then title.
fn sort_results(results: &mut [SearchResult]) {
    let scored = results.iter().all(|r| r.score.is_some()) && !results.is_empty();
    if scored {
        results.sort_by(|a, b| {
            let (a, b) = (a.score.unwrap_or(f64::MAX), b.score.unwrap_or(f64::MAX));
            a.total_cmp(&b)
        });
    } else {
        results.sort_by(|a, b| {
            b.record
                .search
                .weight
                .cmp(&a.record.search.weight)
                .then_with(|| {
                    a.record
                        .title()
                        .to_lowercase()
                        .cmp(&b.record.title().to_lowercase())
                })
        });
    }
}

/// Case-insensitive substring test
pub fn matches(query: &str, text: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    text.to_lowercase().contains(&query.to_lowercase())
}

/// Records whose searchable text contains `query`
pub fn filter_results(records: &[SettingRecord], query: &str) -> Vec<SettingRecord> {
    if query.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| matches(query, &record.searchable_text()))
        .cloned()
        .collect()
}
