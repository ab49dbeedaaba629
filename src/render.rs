//! Presentation helpers: category sections and highlight segments.
//!
//! Highlighting produces plain `Segment` values; whatever draws them decides
//! what a marked segment looks like.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::fuzzy::{fold, fold_str, Span};
use crate::search::{SearchField, SearchResult};

/// A run of text, marked when it belongs to a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub is_match: bool,
}

/// Results sharing a category, in rank order
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub items: Vec<&'a SearchResult>,
}

/// Sections sorted by category name; items keep the order they were ranked in.
pub fn group_by_category(results: &[SearchResult]) -> Vec<CategoryGroup<'_>> {
    let mut groups: BTreeMap<&str, Vec<&SearchResult>> = BTreeMap::new();
    for result in results {
        groups.entry(result.record.category.as_str()).or_default().push(result);
    }

    groups
        .into_iter()
        .map(|(category, items)| CategoryGroup { category, items })
        .collect()
}

/// Split `text` into marked and unmarked segments.
///
/// With `spans` only those ranges are marked. Without them every
/// case-insensitive occurrence of each query token longer than one char is
/// marked; overlapping occurrences merge into one marked run.
pub fn highlight(text: &str, spans: Option<&[Span]>, query: &str) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    let mut mask = vec![false; chars.len()];

    match spans {
        Some(spans) if !spans.is_empty() => {
            for span in spans {
                let end = span.end.min(chars.len());
                for hit in mask.iter_mut().take(end).skip(span.start) {
                    *hit = true;
                }
            }
        }
        _ => mark_tokens(&chars, &mut mask, query),
    }

    segments(&chars, &mask)
}

/// Highlight one field of a result, using its fuzzy spans when they exist.
///
/// Only single-valued fields carry spans that line up with the displayed text.
pub fn highlight_field(result: &SearchResult, field: SearchField, query: &str) -> Vec<Segment> {
    let text = match field {
        SearchField::Title => result.record.search.title.as_str(),
        SearchField::Key => result.record.key.as_str(),
        SearchField::Description => result.record.description.as_str(),
        SearchField::Category => result.record.category.as_str(),
        SearchField::Keywords | SearchField::Synonyms => {
            return match result.field_match(field) {
                Some(m) => highlight(&m.value, Some(&m.spans), query),
                None => Vec::new(),
            };
        }
    };

    let spans = result.field_match(field).map(|m| m.spans.as_slice());
    highlight(text, spans, query)
}

fn mark_tokens(chars: &[char], mask: &mut [bool], query: &str) {
    let folded: Vec<char> = chars.iter().map(|c| fold(*c)).collect();

    for token in query.split_whitespace() {
        let token = fold_str(token);
        if token.len() <= 1 || token.len() > folded.len() {
            continue;
        }
        for start in 0..=(folded.len() - token.len()) {
            if folded[start..start + token.len()] == token[..] {
                for hit in &mut mask[start..start + token.len()] {
                    *hit = true;
                }
            }
        }
    }
}

fn segments(chars: &[char], mask: &[bool]) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    for (c, &is_match) in chars.iter().zip(mask) {
        match out.last_mut() {
            Some(last) if last.is_match == is_match => last.text.push(*c),
            _ => out.push(Segment {
                text: c.to_string(),
                is_match,
            }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SettingRecord, SettingValue};

    fn seg(text: &str, is_match: bool) -> Segment {
        Segment {
            text: text.to_string(),
            is_match,
        }
    }

    fn result(key: &str, category: &str) -> SearchResult {
        SearchResult {
            record: SettingRecord::new(key, SettingValue::Boolean(true), category, ""),
            score: None,
            matches: Vec::new(),
        }
    }

    #[test]
    fn sections_are_alphabetical_and_items_keep_rank() {
        let ranked = vec![
            result("smtp_host", "email"),
            result("session_timeout", "security"),
            result("smtp_port", "email"),
            result("default_theme", "appearance"),
        ];
        let groups = group_by_category(&ranked);

        let names: Vec<_> = groups.iter().map(|g| g.category).collect();
        assert_eq!(names, ["appearance", "email", "security"]);

        let email: Vec<_> = groups[1].items.iter().map(|r| r.record.key.as_str()).collect();
        assert_eq!(email, ["smtp_host", "smtp_port"]);
    }

    #[test]
    fn spans_mark_exact_ranges() {
        let spans = [Span { start: 0, end: 5 }];
        assert_eq!(
            highlight("Email Notifications", Some(&spans), "emial"),
            vec![seg("Email", true), seg(" Notifications", false)]
        );
    }

    #[test]
    fn token_fallback_marks_every_occurrence() {
        let segments = highlight("Peat smoke and more peat", None, "PEAT a");
        assert_eq!(
            segments,
            vec![seg("Peat", true), seg(" smoke and more ", false), seg("peat", true)]
        );
    }

    #[test]
    fn overlapping_tokens_are_all_highlighted() {
        let segments = highlight("highland", None, "high land");
        assert_eq!(segments, vec![seg("highland", true)]);
    }

    #[test]
    fn no_match_yields_one_plain_segment() {
        assert_eq!(highlight("Islay", None, "speyside"), vec![seg("Islay", false)]);
        assert!(highlight("", None, "x").is_empty());
    }

    #[test]
    fn field_highlight_prefers_fuzzy_spans() {
        let mut r = result("smtp_host", "email");
        r.record.search.title = "SMTP Host".to_string();
        r.matches.push(crate::search::FieldMatch {
            field: SearchField::Title,
            value: "SMTP Host".to_string(),
            score: 0.0,
            spans: vec![Span { start: 5, end: 9 }],
        });

        assert_eq!(
            highlight_field(&r, SearchField::Title, "smtp"),
            vec![seg("SMTP ", false), seg("Host", true)]
        );
        assert_eq!(
            highlight_field(&r, SearchField::Key, "smtp"),
            vec![seg("smtp", true), seg("_host", false)]
        );
    }
}
