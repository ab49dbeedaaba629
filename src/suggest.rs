//! Autocomplete suggestions drawn from recent and popular searches.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::history::{normalize_term, PopularTerm, SearchHistoryEntry};
use crate::utils::plural;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Recent,
    Popular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub term: String,
    pub kind: SuggestionKind,
    pub reason: String,
}

impl Suggestion {
    fn recent(entry: &SearchHistoryEntry) -> Self {
        Suggestion {
            term: entry.term.clone(),
            kind: SuggestionKind::Recent,
            reason: format!("Recent search ({})", plural(entry.result_count, "result", "results")),
        }
    }

    fn popular(term: &PopularTerm) -> Self {
        Suggestion {
            term: term.term.clone(),
            kind: SuggestionKind::Popular,
            reason: format!("Popular ({})", plural(term.count as usize, "search", "searches")),
        }
    }
}

/// Suggestions for what the user has typed so far.
///
/// `recent` is most-recent-first and `popular` already ranked. A blank input
/// yields the top popular terms. Otherwise each source contributes up to
/// half of `limit` terms that contain, but are not equal to, the input;
/// recent ones come first and a term appears once.
pub fn suggest(
    recent: &[SearchHistoryEntry],
    popular: &[PopularTerm],
    current: &str,
    limit: usize,
) -> Vec<Suggestion> {
    let needle = normalize_term(current);
    if needle.is_empty() {
        return popular.iter().take(limit).map(Suggestion::popular).collect();
    }

    let half = limit.div_ceil(2);
    let candidate = |term: &str| term != needle && term.contains(&needle);

    let from_recent = recent
        .iter()
        .filter(|entry| candidate(&entry.term))
        .take(half)
        .map(Suggestion::recent);
    let from_popular = popular
        .iter()
        .filter(|term| candidate(&term.term))
        .take(half)
        .map(Suggestion::popular);

    let mut seen = HashSet::new();
    from_recent
        .chain(from_popular)
        .filter(|s| seen.insert(s.term.clone()))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SearchMode;
    use jiff::Timestamp;
    use std::collections::BTreeSet;

    fn entry(term: &str, result_count: usize) -> SearchHistoryEntry {
        SearchHistoryEntry {
            id: format!("id-{term}"),
            term: term.to_string(),
            original_term: term.to_string(),
            timestamp: Timestamp::UNIX_EPOCH,
            result_count,
            search_mode: SearchMode::Fuzzy,
            categories: BTreeSet::new(),
            successful: result_count > 0,
        }
    }

    fn popular(term: &str, count: u64) -> PopularTerm {
        PopularTerm {
            term: term.to_string(),
            count,
            success_count: count,
            success_rate: 1.0,
            last_used: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn blank_input_lists_popular_terms() {
        let suggestions = suggest(&[entry("peat", 3)], &[popular("islay", 8), popular("sherry", 2)], "  ", 1);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].term, "islay");
        assert_eq!(suggestions[0].kind, SuggestionKind::Popular);
        assert_eq!(suggestions[0].reason, "Popular (8 searches)");
    }

    #[test]
    fn both_sources_contribute_and_are_labelled() {
        let suggestions = suggest(
            &[entry("dark mode", 12)],
            &[popular("dark mode", 4), popular("dark roast", 1)],
            "DAR",
            8,
        );
        assert_eq!(
            suggestions,
            vec![
                Suggestion {
                    term: "dark mode".into(),
                    kind: SuggestionKind::Recent,
                    reason: "Recent search (12 results)".into(),
                },
                Suggestion {
                    term: "dark roast".into(),
                    kind: SuggestionKind::Popular,
                    reason: "Popular (1 search)".into(),
                },
            ]
        );
    }

    #[test]
    fn exact_input_is_not_suggested_back() {
        let suggestions = suggest(&[entry("peat", 1), entry("peated", 2)], &[popular("peat", 5)], "peat", 8);
        let terms: Vec<_> = suggestions.iter().map(|s| s.term.as_str()).collect();
        assert_eq!(terms, ["peated"]);
    }

    #[test]
    fn each_source_is_capped_at_half_the_limit() {
        let recent: Vec<_> = ["ab1", "ab2", "ab3"].iter().map(|t| entry(t, 1)).collect();
        let ranked: Vec<_> = ["ab4", "ab5", "ab6"].iter().map(|t| popular(t, 1)).collect();
        let terms: Vec<_> = suggest(&recent, &ranked, "ab", 4)
            .into_iter()
            .map(|s| s.term)
            .collect();
        assert_eq!(terms, ["ab1", "ab2", "ab4", "ab5"]);
    }
}
