//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use jiff::Timestamp;
use settings_search::history::HistoryOptions;
use settings_search::storage::KeyValueStore;
use settings_search::{ManualClock, SearchHistory, SettingRecord, SettingValue, Weight};
use std::sync::Arc;

pub fn start() -> Timestamp {
    Timestamp::from_second(1_760_000_000).unwrap()
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(start()))
}

pub fn history(store: impl KeyValueStore + 'static, clock: &Arc<ManualClock>) -> SearchHistory {
    SearchHistory::load(Box::new(store), clock.clone(), HistoryOptions::default())
}

/// A slice of the club's admin settings
pub fn corpus() -> Vec<SettingRecord> {
    vec![
        SettingRecord::new(
            "enable_two_factor_auth",
            SettingValue::Boolean(false),
            "security",
            "Ask members for a one-time code at login",
        )
        .with_title("Two-Factor Authentication")
        .with_weight(Weight::High),
        SettingRecord::new(
            "email_notifications_enabled",
            SettingValue::Boolean(true),
            "email",
            "Send members a message when a tasting is announced",
        )
        .with_title("Email Notifications"),
        SettingRecord::new("smtp_host", SettingValue::Text("smtp.club.local".into()), "email", "Outgoing mail server")
            .with_title("SMTP Host"),
        SettingRecord::new("session_timeout_minutes", SettingValue::Number(30.0), "security", "Idle minutes before logout")
            .with_title("Session Timeout"),
        SettingRecord::new("default_currency", SettingValue::Text("GBP".into()), "commerce", "Currency for bottle prices")
            .with_title("Default Currency")
            .with_weight(Weight::Low),
        SettingRecord::new("rsvp_deadline_hours", SettingValue::Number(48.0), "events", "Hours before a tasting that RSVPs close")
            .with_title("RSVP Deadline"),
        SettingRecord::new("default_theme", SettingValue::Text("dark".into()), "appearance", "Theme for new members")
            .with_title("Default Theme")
            .with_keywords(["dark mode"]),
        SettingRecord::new("reviews_enabled", SettingValue::Boolean(true), "reviews", "Let members rate and review bottles")
            .with_title("Reviews")
            .with_weight(Weight::High),
    ]
}
