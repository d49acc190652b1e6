//! Configuration for the puzzletty runtime.
//!
//! Every value has a compile-time default and can be overridden at runtime
//! via a dedicated environment variable.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default base URL of the puzzle backend.
const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Default HTTP timeout for backend requests (in seconds).
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default engine search depth for analysis requests.
const DEFAULT_ANALYSIS_DEPTH: u32 = 15;

/// Default engine time budget per analysis request (in milliseconds).
const DEFAULT_ANALYSIS_TIME_MS: u64 = 2000;

/// Default directory for the rolling log files.
const DEFAULT_LOG_DIR: &str = "logs";

/// Get the puzzle backend base URL.
///
/// Priority:
/// 1. `PUZZLETTY_API_URL` env variable if set
/// 2. `http://localhost:3001/api` as fallback
pub fn get_api_url() -> String {
    non_empty_env("PUZZLETTY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// User id stats are reported under. Reporting is off when unset.
pub fn get_user_id() -> Option<String> {
    non_empty_env("PUZZLETTY_USER_ID")
}

/// Bearer token sent with backend requests, if any.
pub fn get_auth_token() -> Option<String> {
    non_empty_env("PUZZLETTY_AUTH_TOKEN")
}

/// Get the HTTP request timeout.
///
/// Priority:
/// 1. `PUZZLETTY_HTTP_TIMEOUT_SECS` env variable if set (falls back to default
///    if the value cannot be parsed as a `u64`)
/// 2. `10` seconds as fallback
pub fn get_http_timeout() -> Duration {
    Duration::from_secs(parse_or_default(
        std::env::var("PUZZLETTY_HTTP_TIMEOUT_SECS").ok(),
        DEFAULT_HTTP_TIMEOUT_SECS,
    ))
}

/// Get the engine depth for analysis (`PUZZLETTY_ANALYSIS_DEPTH`, default 15).
pub fn get_analysis_depth() -> u32 {
    parse_or_default(
        std::env::var("PUZZLETTY_ANALYSIS_DEPTH").ok(),
        DEFAULT_ANALYSIS_DEPTH,
    )
}

/// Get the engine time budget (`PUZZLETTY_ANALYSIS_TIME_MS`, default 2000).
pub fn get_analysis_time_ms() -> u64 {
    parse_or_default(
        std::env::var("PUZZLETTY_ANALYSIS_TIME_MS").ok(),
        DEFAULT_ANALYSIS_TIME_MS,
    )
}

/// Get the directory the daily log files are written to.
///
/// Priority:
/// 1. `PUZZLETTY_LOG_DIR` env variable if set
/// 2. `logs` (relative to the working directory) as fallback
pub fn get_log_dir() -> PathBuf {
    non_empty_env("PUZZLETTY_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or_default<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_api_url() {
        let url = get_api_url();
        match std::env::var("PUZZLETTY_API_URL") {
            Ok(val) if !val.trim().is_empty() => assert_eq!(url, val.trim()),
            _ => assert_eq!(url, DEFAULT_API_URL),
        }
    }

    #[test]
    fn test_get_log_dir() {
        let dir = get_log_dir();
        match std::env::var("PUZZLETTY_LOG_DIR") {
            Ok(val) if !val.trim().is_empty() => assert_eq!(dir, PathBuf::from(val.trim())),
            _ => assert_eq!(dir, PathBuf::from(DEFAULT_LOG_DIR)),
        }
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or_default(Some("30".into()), 10u64), 30);
        assert_eq!(parse_or_default(Some(" 22 ".into()), 15u32), 22);
        assert_eq!(parse_or_default(Some("soon".into()), 10u64), 10);
        assert_eq!(parse_or_default(Some("-1".into()), 2000u64), 2000);
        assert_eq!(parse_or_default(None, 15u32), 15);
    }

    #[test]
    fn test_analysis_defaults() {
        if std::env::var("PUZZLETTY_ANALYSIS_DEPTH").is_err() {
            assert_eq!(get_analysis_depth(), DEFAULT_ANALYSIS_DEPTH);
        }
        if std::env::var("PUZZLETTY_ANALYSIS_TIME_MS").is_err() {
            assert_eq!(get_analysis_time_ms(), DEFAULT_ANALYSIS_TIME_MS);
        }
        if std::env::var("PUZZLETTY_HTTP_TIMEOUT_SECS").is_err() {
            assert_eq!(get_http_timeout(), Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
        }
    }
}
