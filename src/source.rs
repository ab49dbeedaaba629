//! Loads the settings corpus from the admin API or a JSON file.
//!
//! - `parse_corpus` accepts the enhanced payload (records with search
//!   metadata) and the basic one (bare key/value rows or a key -> value map)
//! - `fetch_corpus` asks the enhanced endpoint first and falls back to the
//!   basic endpoint when it is unavailable

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::error::SourceError;
use crate::settings::{title_from_key, DataType, SearchMetadata, SettingRecord, SettingValue, Weight};
use crate::utils::endpoint_url;

pub const ENHANCED_ENDPOINT: &str = "/api/admin/settings/enhanced";
pub const BASIC_ENDPOINT: &str = "/api/admin/settings";

const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSetting {
    key: String,
    #[serde(default)]
    value: Value,
    #[serde(default, alias = "type")]
    data_type: Option<DataType>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "search")]
    search_metadata: Option<WireMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMetadata {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    weight: Option<Weight>,
}

/// Parse either payload shape into records.
pub fn parse_corpus(body: &str) -> Result<Vec<SettingRecord>, SourceError> {
    let payload: Value = serde_json::from_str(body)?;

    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(mut map) => {
            if let Some(Value::Array(rows)) = map.remove("settings").or_else(|| map.remove("data")) {
                rows
            } else if map.values().all(|v| !v.is_array() && !v.is_object()) {
                return Ok(map
                    .into_iter()
                    .map(|(key, value)| into_record(key, value, None, None, None, None))
                    .collect());
            } else {
                return Err(SourceError::UnknownShape);
            }
        }
        _ => return Err(SourceError::UnknownShape),
    };

    rows.into_iter()
        .map(|row| {
            let wire: WireSetting = serde_json::from_value(row)?;
            Ok(into_record(
                wire.key,
                wire.value,
                wire.data_type,
                wire.category,
                wire.description,
                wire.search_metadata,
            ))
        })
        .collect()
}

fn into_record(
    key: String,
    raw: Value,
    declared: Option<DataType>,
    category: Option<String>,
    description: Option<String>,
    meta: Option<WireMetadata>,
) -> SettingRecord {
    let value = convert_value(&key, raw, declared);
    let meta = meta.unwrap_or_default();
    let title = meta
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| title_from_key(&key));

    SettingRecord {
        data_type: value.data_type(),
        value,
        category: category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        description: description.unwrap_or_default(),
        search: SearchMetadata {
            title,
            keywords: meta.keywords.into_iter().collect(),
            synonyms: meta.synonyms.into_iter().collect(),
            weight: meta.weight.unwrap_or_default(),
        },
        key,
    }
}

/// Settings tables often store everything as text; honour the declared type.
fn convert_value(key: &str, raw: Value, declared: Option<DataType>) -> SettingValue {
    let converted = match (declared, &raw) {
        (Some(DataType::Boolean) | None, Value::Bool(b)) => Some(SettingValue::Boolean(*b)),
        (Some(DataType::Boolean), Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(SettingValue::Boolean(true)),
            "false" | "0" | "no" | "off" => Some(SettingValue::Boolean(false)),
            _ => None,
        },
        (Some(DataType::Number) | None, Value::Number(n)) => n.as_f64().map(SettingValue::Number),
        (Some(DataType::Number), Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(SettingValue::Number),
        (_, Value::String(s)) => Some(SettingValue::Text(s.clone())),
        (_, Value::Null) => Some(SettingValue::Text(String::new())),
        _ => None,
    };

    converted.unwrap_or_else(|| {
        if declared.is_some() {
            log::warn!("Setting {key} does not hold a {declared:?} value, keeping it as text");
        }
        SettingValue::Text(match raw {
            Value::String(s) => s,
            other => other.to_string(),
        })
    })
}

pub fn load_corpus_file(path: &Path) -> Result<Vec<SettingRecord>, SourceError> {
    parse_corpus(&std::fs::read_to_string(path)?)
}

/// Fetch from the enhanced endpoint, falling back to the basic one.
pub fn fetch_corpus(base_url: &str, token: Option<&str>) -> Result<Vec<SettingRecord>, SourceError> {
    let client = Client::builder().user_agent("settings_search").build()?;

    match fetch_from(&client, base_url, ENHANCED_ENDPOINT, token) {
        Ok(records) => Ok(records),
        Err(e) => {
            log::warn!("Enhanced settings unavailable ({}), using basic settings", e);
            fetch_from(&client, base_url, BASIC_ENDPOINT, token)
        }
    }
}

fn fetch_from(
    client: &Client,
    base_url: &str,
    path: &str,
    token: Option<&str>,
) -> Result<Vec<SettingRecord>, SourceError> {
    let url = endpoint_url(base_url, path)?;
    log::debug!("Fetching settings from {}", url);

    let mut request = client.get(url.clone());
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let response = request.send()?;
    if !response.status().is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }
    parse_corpus(&response.text()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enhanced_payload_keeps_metadata() {
        let body = r#"{"settings": [{
            "key": "enable_two_factor_auth",
            "value": false,
            "dataType": "boolean",
            "category": "security",
            "description": "Require a second factor",
            "searchMetadata": {"title": "Two-Factor Authentication", "keywords": ["login"], "synonyms": [], "weight": "high"}
        }]}"#;

        let records = parse_corpus(body).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title(), "Two-Factor Authentication");
        assert_eq!(record.value, SettingValue::Boolean(false));
        assert_eq!(record.search.weight, Weight::High);
        assert!(record.search.keywords.contains("login"));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn basic_rows_get_derived_metadata() {
        let body = r#"[
            {"key": "session_timeout_minutes", "value": "30", "type": "number", "category": "security"},
            {"key": "maintenance_mode", "value": "true", "type": "boolean"},
            {"key": "club_motto", "value": "Slainte"}
        ]"#;

        let records = parse_corpus(body).unwrap();
        assert_eq!(records[0].value, SettingValue::Number(30.0));
        assert_eq!(records[0].title(), "Session Timeout Minutes");
        assert_eq!(records[1].value, SettingValue::Boolean(true));
        assert_eq!(records[1].category, "general");
        assert_eq!(records[2].data_type, DataType::String);
        assert_eq!(records[2].search.weight, Weight::Medium);
    }

    #[test]
    fn key_value_map_is_accepted() {
        let records = parse_corpus(r#"{"rate_limit_enabled": true, "rate_limit_burst": 20}"#).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.value == SettingValue::Number(20.0)));
    }

    #[test]
    fn mistyped_values_fall_back_to_text() {
        let records = parse_corpus(r#"[{"key": "backup_enabled", "value": "sometimes", "dataType": "boolean"}]"#).unwrap();
        assert_eq!(records[0].value, SettingValue::Text("sometimes".into()));
        assert_eq!(records[0].data_type, DataType::String);
    }

    #[test]
    fn unknown_shapes_are_rejected() {
        assert!(matches!(parse_corpus("42"), Err(SourceError::UnknownShape)));
        assert!(matches!(parse_corpus(r#"{"nested": {"a": 1}}"#), Err(SourceError::UnknownShape)));
        assert!(matches!(parse_corpus("not json"), Err(SourceError::Parse(_))));
    }

    #[test]
    fn unreachable_api_reports_an_error() {
        assert!(fetch_corpus("not a url", None).is_err());
    }
}
