//! Concept-to-setting keyword table and the enrichment it drives.
//!
//! The table is plain data: each `KeywordMapping` names the words an admin
//! might type, the setting keys those words mean, and extra synonyms. It is
//! compiled once into a `KeywordIndex` so enrichment is a lookup per record.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::settings::SettingRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMapping {
    pub terms: Vec<String>,
    pub targets: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl KeywordMapping {
    fn new(terms: &[&str], targets: &[&str], synonyms: &[&str]) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        KeywordMapping {
            terms: owned(terms),
            targets: owned(targets),
            synonyms: owned(synonyms),
        }
    }
}

/// Mappings for the settings the admin console ships with.
pub fn default_mappings() -> Vec<KeywordMapping> {
    vec![
        KeywordMapping::new(
            &["2fa", "mfa", "totp", "two factor", "multi factor", "authenticator", "otp"],
            &["enable_two_factor_auth", "require_two_factor_for_admins"],
            &["two-step verification", "second factor"],
        ),
        KeywordMapping::new(
            &["email", "mail", "smtp", "outgoing mail", "sender"],
            &["smtp_host", "smtp_port", "smtp_username", "smtp_password", "email_from_address", "email_notifications_enabled"],
            &["e-mail", "mailer", "mail server"],
        ),
        KeywordMapping::new(
            &["password", "passphrase", "credentials", "pwd"],
            &["password_min_length", "password_require_symbols", "password_expiry_days"],
            &["passcode", "login secret"],
        ),
        KeywordMapping::new(
            &["session", "timeout", "idle", "logout", "jwt", "token lifetime"],
            &["session_timeout_minutes", "jwt_expiry_hours", "remember_me_days"],
            &["auto logout", "sign out"],
        ),
        KeywordMapping::new(
            &["rate limit", "throttle", "throttling", "requests per minute", "abuse", "ddos"],
            &["rate_limit_enabled", "rate_limit_requests_per_minute", "rate_limit_burst"],
            &["request cap", "flood protection"],
        ),
        KeywordMapping::new(
            &["webhook", "callback", "hook", "integration", "event delivery"],
            &["webhooks_enabled", "webhook_retry_attempts", "webhook_signing_secret"],
            &["http callback", "outbound notification"],
        ),
        KeywordMapping::new(
            &["currency", "money", "price", "exchange rate", "usd", "eur", "gbp"],
            &["default_currency", "currency_auto_convert", "exchange_rate_source"],
            &["pricing", "monetary unit"],
        ),
        KeywordMapping::new(
            &["maintenance", "downtime", "offline", "read only"],
            &["maintenance_mode", "maintenance_message"],
            &["service window", "site offline"],
        ),
        KeywordMapping::new(
            &["backup", "snapshot", "restore", "dump", "export database"],
            &["backup_enabled", "backup_frequency_hours", "backup_retention_days"],
            &["archive", "recovery point"],
        ),
        KeywordMapping::new(
            &["notification", "alert", "push", "reminder", "digest"],
            &["email_notifications_enabled", "push_notifications_enabled", "event_reminder_hours", "weekly_digest_enabled"],
            &["notify", "heads up"],
        ),
        KeywordMapping::new(
            &["theme", "dark mode", "light mode", "appearance", "color scheme"],
            &["default_theme", "allow_user_theme"],
            &["look and feel", "skin"],
        ),
        KeywordMapping::new(
            &["event", "rsvp", "tasting", "attendance", "capacity", "waitlist"],
            &["events_enabled", "rsvp_deadline_hours", "event_default_capacity", "event_waitlist_enabled"],
            &["gathering", "meetup", "tasting night"],
        ),
        KeywordMapping::new(
            &["review", "rating", "stars", "tasting notes", "moderation"],
            &["reviews_enabled", "review_moderation_required", "rating_scale_max"],
            &["feedback", "score"],
        ),
        KeywordMapping::new(
            &["wishlist", "wish list", "favorites", "saved bottles"],
            &["wishlists_enabled", "wishlist_max_items", "wishlist_public_by_default"],
            &["bucket list", "want list"],
        ),
        KeywordMapping::new(
            &["membership", "member", "subscription", "dues", "renewal", "tier"],
            &["membership_fee", "membership_renewal_reminder_days", "membership_auto_approve"],
            &["club fee", "annual dues"],
        ),
        KeywordMapping::new(
            &["upload", "image", "photo", "file size", "attachment"],
            &["max_upload_size_mb", "allowed_image_types"],
            &["picture", "media"],
        ),
        KeywordMapping::new(
            &["cache", "caching", "ttl", "performance"],
            &["cache_enabled", "cache_ttl_seconds"],
            &["speed", "memoization"],
        ),
        KeywordMapping::new(
            &["api key", "api", "token", "access key", "developer"],
            &["api_access_enabled", "api_key_rotation_days"],
            &["integration key", "programmatic access"],
        ),
        KeywordMapping::new(
            &["analytics", "tracking", "statistics", "metrics", "insights"],
            &["analytics_enabled", "analytics_retention_days"],
            &["reporting", "usage data"],
        ),
        KeywordMapping::new(
            &["privacy", "gdpr", "consent", "cookies", "data retention"],
            &["cookie_consent_required", "data_retention_days", "privacy_policy_url"],
            &["personal data", "compliance"],
        ),
        KeywordMapping::new(
            &["age", "age verification", "legal drinking age", "21+", "18+"],
            &["age_verification_required", "minimum_member_age"],
            &["age gate", "drinking age"],
        ),
    ]
}

/// Compiled lookup over a mapping table
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    by_target: HashMap<String, Enrichment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Enrichment {
    keywords: BTreeSet<String>,
    synonyms: BTreeSet<String>,
}

impl KeywordIndex {
    pub fn compile(mappings: &[KeywordMapping]) -> Self {
        let mut index = KeywordIndex::default();

        for mapping in mappings {
            for target in &mapping.targets {
                let entry = index.by_target.entry(target.clone()).or_default();
                entry.keywords.extend(mapping.terms.iter().map(|t| normalize(t)));
                entry.synonyms.extend(mapping.synonyms.iter().map(|s| normalize(s)));
            }
        }

        log::debug!("Compiled keyword index over {} target settings", index.by_target.len());
        index
    }

    /// Parse a JSON mapping table and compile it.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mappings: Vec<KeywordMapping> = serde_json::from_str(json)?;
        Ok(Self::compile(&mappings))
    }

    /// Union the mapped keywords and synonyms into each record's metadata.
    pub fn enrich(&self, records: &[SettingRecord]) -> Vec<SettingRecord> {
        records
            .iter()
            .map(|record| {
                let mut record = record.clone();
                if let Some(extra) = self.by_target.get(&record.key) {
                    record.search.keywords.extend(extra.keywords.iter().cloned());
                    record.search.synonyms.extend(extra.synonyms.iter().cloned());
                }
                record
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}
