//! Aggregate figures over the search history.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::history::{PopularTermStat, SearchHistoryEntry};

const TOP_CATEGORIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalytics {
    pub total_searches: u64,
    pub successful_searches: u64,
    pub success_rate: f64,
    pub unique_terms: usize,
    pub searches_last_7_days: usize,
    pub searches_last_30_days: usize,
    pub top_categories: Vec<CategoryCount>,
    pub average_result_count: f64,
}

/// Totals come from the cumulative term statistics; the windows, categories
/// and result averages from the retained history entries.
pub fn summarize(
    entries: &[SearchHistoryEntry],
    popular: &BTreeMap<String, PopularTermStat>,
    now: Timestamp,
) -> SearchAnalytics {
    let total_searches: u64 = popular.values().map(|s| s.count).sum();
    let successful_searches: u64 = popular.values().map(|s| s.success_count).sum();
    let success_rate = if total_searches == 0 {
        0.0
    } else {
        successful_searches as f64 / total_searches as f64
    };

    let within = |days: i64| {
        let window = SignedDuration::from_hours(24 * days);
        entries
            .iter()
            .filter(|e| now.duration_since(e.timestamp) <= window)
            .count()
    };

    let mut category_counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        for category in &entry.categories {
            *category_counts.entry(category.as_str()).or_default() += 1;
        }
    }
    let mut top_categories: Vec<CategoryCount> = category_counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    top_categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    top_categories.truncate(TOP_CATEGORIES);

    let average_result_count = if entries.is_empty() {
        0.0
    } else {
        entries.iter().map(|e| e.result_count).sum::<usize>() as f64 / entries.len() as f64
    };

    SearchAnalytics {
        total_searches,
        successful_searches,
        success_rate,
        unique_terms: popular.len(),
        searches_last_7_days: within(7),
        searches_last_30_days: within(30),
        top_categories,
        average_result_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SearchMode;
    use std::collections::BTreeSet;

    const DAY: i64 = 86_400;

    fn entry(term: &str, age_days: i64, result_count: usize, categories: &[&str], now: Timestamp) -> SearchHistoryEntry {
        SearchHistoryEntry {
            id: term.to_string(),
            term: term.to_string(),
            original_term: term.to_string(),
            timestamp: Timestamp::from_second(now.as_second() - age_days * DAY).unwrap(),
            result_count,
            search_mode: SearchMode::Exact,
            categories: categories.iter().map(|c| c.to_string()).collect::<BTreeSet<_>>(),
            successful: result_count > 0,
        }
    }

    fn stat(count: u64, success_count: u64) -> PopularTermStat {
        PopularTermStat {
            count,
            success_count,
            first_used: Timestamp::UNIX_EPOCH,
            last_used: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn empty_history_is_all_zero() {
        let analytics = summarize(&[], &BTreeMap::new(), Timestamp::UNIX_EPOCH);
        assert_eq!(analytics, SearchAnalytics::default());
    }

    #[test]
    fn figures_combine_stats_and_entries() {
        let now = Timestamp::from_second(1_760_000_000).unwrap();
        let entries = vec![
            entry("smtp", 1, 4, &["email"], now),
            entry("2fa", 10, 2, &["security", "email"], now),
            entry("theme", 20, 0, &[], now),
        ];
        let popular = BTreeMap::from([
            ("smtp".to_string(), stat(3, 3)),
            ("2fa".to_string(), stat(1, 1)),
            ("theme".to_string(), stat(4, 0)),
        ]);

        let analytics = summarize(&entries, &popular, now);
        assert_eq!(analytics.total_searches, 8);
        assert_eq!(analytics.successful_searches, 4);
        assert!((analytics.success_rate - 0.5).abs() < 1e-9);
        assert_eq!(analytics.unique_terms, 3);
        assert_eq!(analytics.searches_last_7_days, 1);
        assert_eq!(analytics.searches_last_30_days, 3);
        assert_eq!(
            analytics.top_categories,
            vec![
                CategoryCount { category: "email".into(), count: 2 },
                CategoryCount { category: "security".into(), count: 1 },
            ]
        );
        assert!((analytics.average_result_count - 2.0).abs() < 1e-9);
    }
}
