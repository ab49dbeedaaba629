//! Admin setting records and the metadata used to index them.
//!
//! Defines:
//! - `SettingRecord`, the unit the search engine ranks
//! - `SettingValue` / `DataType` for the typed value
//! - `SearchMetadata` and `Weight` carrying title, keywords and ranking weight

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::SearchError;

/// Declared type of a setting value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Boolean,
    Number,
    String,
}

/// Current value of a setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl SettingValue {
    pub fn data_type(&self) -> DataType {
        match self {
            SettingValue::Boolean(_) => DataType::Boolean,
            SettingValue::Number(_) => DataType::Number,
            SettingValue::Text(_) => DataType::String,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Boolean(b) => write!(f, "{}", b),
            SettingValue::Number(n) => write!(f, "{}", n),
            SettingValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Ranking weight used when no similarity score is available.
///
/// Variant order matters: `High` compares greatest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub title: String,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    #[serde(default)]
    pub synonyms: BTreeSet<String>,
    #[serde(default)]
    pub weight: Weight,
}

/// One configurable admin setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingRecord {
    pub key: String,
    pub value: SettingValue,
    pub data_type: DataType,
    pub category: String,
    pub description: String,
    pub search: SearchMetadata,
}

impl SettingRecord {
    /// Build a record whose title is derived from the key.
    pub fn new(
        key: impl Into<String>,
        value: SettingValue,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let title = title_from_key(&key);
        SettingRecord {
            data_type: value.data_type(),
            value,
            category: category.into(),
            description: description.into(),
            search: SearchMetadata {
                title,
                ..SearchMetadata::default()
            },
            key,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.search.title = title.into();
        self
    }

    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.search.weight = weight;
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search.synonyms.extend(synonyms.into_iter().map(Into::into));
        self
    }

    pub fn title(&self) -> &str {
        &self.search.title
    }

    /// Lowercased text the exact (substring) mode matches against.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            &self.search.title,
            &self.description,
            &self.key,
            &self.category,
        ];
        parts.extend(self.search.keywords.iter().map(String::as_str));
        parts.extend(self.search.synonyms.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }

    /// Checks the fields the engine relies on.
    pub fn validate(&self) -> Result<(), SearchError> {
        let malformed = |reason| SearchError::MalformedRecord {
            key: self.key.clone(),
            reason,
        };

        if self.key.trim().is_empty() {
            return Err(malformed("empty key"));
        }
        if self.search.title.trim().is_empty() {
            return Err(malformed("empty title"));
        }
        if self.value.data_type() != self.data_type {
            return Err(malformed("value does not match declared data type"));
        }
        if let SettingValue::Number(n) = self.value {
            if !n.is_finite() {
                return Err(malformed("non-finite number"));
            }
        }
        Ok(())
    }
}

/// "enable_two_factor_auth" -> "Enable Two Factor Auth"
pub fn title_from_key(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c == '.')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
