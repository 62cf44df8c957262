//! Environment variable utilities
//!
//! Generic `env_get<T>` for parsing tuning knobs with defaults.
//!
//! ```ignore
//! use smartpool_core::env::{env_get, env_get_bool};
//!
//! let level: u8 = env_get("SP_LOG_LEVEL", 2);
//! let flush: bool = env_get_bool("SP_FLUSH_LOG", false);
//! ```

use std::str::FromStr;

/// Get an environment variable parsed as `T`, or return the default.
///
/// Unset or unparseable values both fall back to the default.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get an environment variable as a boolean.
///
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true; any other
/// set value is false. Unset returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default_when_unset() {
        std::env::remove_var("SP_TEST_UNSET");
        let v: u32 = env_get("SP_TEST_UNSET", 7);
        assert_eq!(v, 7);
    }

    #[test]
    fn test_env_get_parses_value() {
        std::env::set_var("SP_TEST_PARSE", "42");
        let v: u32 = env_get("SP_TEST_PARSE", 7);
        assert_eq!(v, 42);
        std::env::remove_var("SP_TEST_PARSE");
    }

    #[test]
    fn test_env_get_default_on_garbage() {
        std::env::set_var("SP_TEST_GARBAGE", "not-a-number");
        let v: u32 = env_get("SP_TEST_GARBAGE", 7);
        assert_eq!(v, 7);
        std::env::remove_var("SP_TEST_GARBAGE");
    }

    #[test]
    fn test_env_get_bool_variants() {
        std::env::set_var("SP_TEST_BOOL", "yes");
        assert!(env_get_bool("SP_TEST_BOOL", false));

        std::env::set_var("SP_TEST_BOOL", "0");
        assert!(!env_get_bool("SP_TEST_BOOL", true));
        std::env::remove_var("SP_TEST_BOOL");
    }
}
