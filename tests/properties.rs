mod common;

use jiff::SignedDuration;
use proptest::prelude::*;
use settings_search::storage::MemoryStore;
use settings_search::{
    default_mappings, KeywordIndex, SearchEngine, SearchMode, ALL_CATEGORIES, DEFAULT_THRESHOLD,
};

fn engine() -> SearchEngine {
    SearchEngine::new(&common::corpus(), &KeywordIndex::compile(&default_mappings()), DEFAULT_THRESHOLD)
}

proptest! {
    #[test]
    fn exact_results_are_exactly_the_substring_matches(query in "[a-z ]{1,6}") {
        let engine = engine();
        let needle = query.trim().to_lowercase();
        prop_assume!(!needle.is_empty());

        let results = engine.search(&query, ALL_CATEGORIES, false);
        for result in &results {
            prop_assert!(result.record.searchable_text().contains(&needle));
        }
        let expected = engine
            .corpus()
            .iter()
            .filter(|r| r.searchable_text().contains(&needle))
            .count();
        prop_assert_eq!(results.len(), expected);
    }

    #[test]
    fn fuzzy_scores_stay_under_threshold_in_order(query in "[a-z]{2,8}") {
        let results = engine().search(&query, ALL_CATEGORIES, true);
        let scores: Vec<f64> = results.iter().map(|r| r.score.unwrap()).collect();
        for score in &scores {
            prop_assert!(*score >= 0.0 && *score <= DEFAULT_THRESHOLD);
        }
        prop_assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn category_filter_never_leaks(query in "[a-z]{0,5}", fuzzy in any::<bool>()) {
        for result in engine().search(&query, "security", fuzzy) {
            prop_assert_eq!(result.record.category.as_str(), "security");
        }
    }

    #[test]
    fn history_never_exceeds_its_cap(terms in prop::collection::vec("[a-z]{1,4}", 1..80)) {
        let clock = common::clock();
        let mut history = common::history(MemoryStore::new(), &clock);
        let cap = history.settings().max_history_size;

        for term in &terms {
            history.add_search(term, &[], SearchMode::Fuzzy);
            clock.advance(SignedDuration::from_secs(1));
        }

        let recent = history.get_recent_searches(usize::MAX);
        prop_assert!(recent.len() <= cap);
        let mut seen = std::collections::HashSet::new();
        prop_assert!(recent.iter().all(|e| seen.insert(e.term.clone())));
        prop_assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn recording_twice_inside_the_window_is_idempotent(term in "[a-z]{1,10}", gap_ms in 0i64..5000) {
        let clock = common::clock();
        let mut history = common::history(MemoryStore::new(), &clock);

        history.add_search(&term, &[], SearchMode::Exact);
        let once = history.get_recent_searches(50).to_vec();
        clock.advance(SignedDuration::from_millis(gap_ms));
        history.add_search(&term, &[], SearchMode::Exact);

        prop_assert_eq!(history.get_recent_searches(50), once.as_slice());
    }

    #[test]
    fn suggestions_respect_the_limit(current in "[a-z]{0,2}", limit in 1usize..10) {
        let clock = common::clock();
        let mut history = common::history(MemoryStore::new(), &clock);
        for term in ["dark mode", "dram", "peat", "islay", "sherry cask", "cask strength"] {
            history.add_search(term, &[], SearchMode::Fuzzy);
            clock.advance(SignedDuration::from_secs(6));
        }

        let suggestions = history.get_suggestions(&current, limit);
        prop_assert!(suggestions.len() <= limit);
        if !current.is_empty() {
            prop_assert!(suggestions.iter().all(|s| s.term.contains(&current) && s.term != current));
        }
    }
}
