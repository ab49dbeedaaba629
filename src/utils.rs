use chrono::{DateTime, Local};
use jiff::Timestamp;
use std::fmt::{Display, Write};
use std::str::FromStr;
use url::Url;

pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Read an env var as bool (“1” or “true” = true).
pub fn get_env_bool(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Read an env var as bool, or return `default` when it is unset.
pub fn get_env_bool_or(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(_) => get_env_bool(name),
        Err(_) => default,
    }
}

/// Read an env var or return `default`.
pub fn get_env_with_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse an env var, falling back to `default` when unset or invalid.
pub fn get_env_parsed<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            log::warn!("Invalid {name} value {raw:?}: {e}, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Join an API path onto a base url ("http://host/admin/" + "/api/x").
pub fn endpoint_url(base: &str, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(base)?.join(path)
}

/// "1 result" / "3 results"
pub fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Local date of `ts` in a chrono `format`; an invalid format falls back to the default.
pub fn format_timestamp(ts: Timestamp, format: &str) -> String {
    let Some(local) = DateTime::from_timestamp_millis(ts.as_millisecond()).map(|utc| utc.with_timezone(&Local))
    else {
        return ts.to_string();
    };

    let mut out = String::new();
    if write!(out, "{}", local.format(format)).is_err() {
        log::warn!("Invalid date_format {format:?}, using {DEFAULT_DATE_FORMAT}");
        out.clear();
        let _ = write!(out, "{}", local.format(DEFAULT_DATE_FORMAT));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_format_with_fallback() {
        let ts = Timestamp::from_second(1_760_000_000).unwrap();
        let year = format_timestamp(ts, "%Y");
        assert_eq!(year, "2025");
        assert_eq!(format_timestamp(ts, "%Q").len(), "09.10.2025".len());
    }

    #[test]
    fn endpoint_joins_absolute_paths_onto_host() {
        let url = endpoint_url("http://club.local:8080/admin/", "/api/admin/settings").unwrap();
        assert_eq!(url.as_str(), "http://club.local:8080/api/admin/settings");
        assert!(endpoint_url("not a url", "/x").is_err());
    }

    #[test]
    fn plural_handles_one() {
        assert_eq!(plural(1, "result", "results"), "1 result");
        assert_eq!(plural(0, "search", "searches"), "0 searches");
        assert_eq!(plural(12, "result", "results"), "12 results");
    }
}
