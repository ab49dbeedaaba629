// src/output.rs
use crate::history::{PopularTerm, SearchHistoryEntry};
use crate::render::{group_by_category, highlight_field, Segment};
use crate::search::{SearchField, SearchResult};
use crate::utils::{format_timestamp, plural};
use serde::Serialize;
use std::error::Error;

/// One setting as the admin console lists it
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub key: String,
    pub title: String,
    pub description: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub title_segments: Vec<Segment>,
    pub description_segments: Vec<Segment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ResultSection {
    pub category: String,
    pub items: Vec<ResultItem>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub sections: Vec<ResultSection>,
}

impl SearchResponse {
    pub fn new(query: &str, results: &[SearchResult]) -> Self {
        let sections = group_by_category(results)
            .into_iter()
            .map(|group| ResultSection {
                category: group.category.to_string(),
                items: group.items.into_iter().map(|r| ResultItem::new(r, query)).collect(),
            })
            .collect();

        SearchResponse {
            query: query.to_string(),
            total: results.len(),
            sections,
        }
    }
}

impl ResultItem {
    fn new(result: &SearchResult, query: &str) -> Self {
        let matched_keyword = result
            .field_match(SearchField::Keywords)
            .or_else(|| result.field_match(SearchField::Synonyms))
            .map(|m| m.value.clone());

        ResultItem {
            key: result.record.key.clone(),
            title: result.record.title().to_string(),
            description: result.record.description.clone(),
            value: result.record.value.to_string(),
            score: result.score,
            title_segments: highlight_field(result, SearchField::Title, query),
            description_segments: highlight_field(result, SearchField::Description, query),
            matched_keyword,
        }
    }
}

/// A past search or popular term with a human readable subtitle
#[derive(Serialize, Debug)]
pub struct ListItem<'a, T: Serialize> {
    #[serde(flatten)]
    pub item: &'a T,
    pub subtitle: String,
}

pub fn recent_items<'a>(
    entries: &'a [SearchHistoryEntry],
    date_format: &str,
) -> Vec<ListItem<'a, SearchHistoryEntry>> {
    entries
        .iter()
        .map(|entry| ListItem {
            item: entry,
            subtitle: format!(
                "Searched: {} ({})",
                format_timestamp(entry.timestamp, date_format),
                plural(entry.result_count, "result", "results")
            ),
        })
        .collect()
}

pub fn popular_items<'a>(terms: &'a [PopularTerm], date_format: &str) -> Vec<ListItem<'a, PopularTerm>> {
    terms
        .iter()
        .map(|term| ListItem {
            item: term,
            subtitle: format!(
                "Last used: {} ({}, {:.0}% found something)",
                format_timestamp(term.last_used, date_format),
                plural(term.count as usize, "search", "searches"),
                term.success_rate * 100.0
            ),
        })
        .collect()
}

/// Print any serializable value as one line of JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Print search results grouped by category
pub fn output_results(query: &str, results: &[SearchResult]) -> Result<(), Box<dyn Error>> {
    print_json(&SearchResponse::new(query, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::{default_mappings, KeywordIndex};
    use crate::search::{SearchEngine, ALL_CATEGORIES, DEFAULT_THRESHOLD};
    use crate::settings::{SettingRecord, SettingValue};

    #[test]
    fn response_groups_and_highlights() {
        let records = vec![
            SettingRecord::new("enable_two_factor_auth", SettingValue::Boolean(true), "security", "Second factor at login")
                .with_title("Two-Factor Authentication"),
            SettingRecord::new("smtp_host", SettingValue::Text("mail".into()), "email", "Outgoing mail server")
                .with_title("SMTP Host"),
        ];
        let engine = SearchEngine::new(&records, &KeywordIndex::compile(&default_mappings()), DEFAULT_THRESHOLD);
        let results = engine.search("mfa", ALL_CATEGORIES, true);
        let response = SearchResponse::new("mfa", &results);

        assert_eq!(response.total, results.len());
        let security = response
            .sections
            .iter()
            .find(|s| s.category == "security")
            .expect("two factor setting is found");
        assert_eq!(security.items[0].matched_keyword.as_deref(), Some("mfa"));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["sections"][0]["items"][0]["titleSegments"].is_array());
    }

    #[test]
    fn popular_items_carry_a_subtitle() {
        let terms = vec![PopularTerm {
            term: "peat".into(),
            count: 2,
            success_count: 1,
            success_rate: 0.5,
            last_used: jiff::Timestamp::from_second(1_760_000_000).unwrap(),
        }];
        let items = popular_items(&terms, "%Y");
        assert_eq!(items[0].subtitle, "Last used: 2025 (2 searches, 50% found something)");

        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(json[0]["term"], "peat");
        assert_eq!(json[0]["successRate"], 0.5);
    }
}
