//! Environment configuration helpers

use std::str::FromStr;
use thiserror::Error;

/// Error raised when an environment variable holds an unusable value
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid value for {key}: {value:?} ({reason})")]
pub struct EnvError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

/// Load variables from a `.env` file in the working directory or its parents.
///
/// A missing file is not an error; variables already set in the process
/// environment are never overwritten.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
    }
}

/// Read a variable, treating unset and blank values alike
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a variable or fall back to `default`
pub fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

/// Parse a variable into `T`, falling back to `default` when unset
pub fn env_parse<T>(key: &str, default: T) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|e| EnvError {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_opt_blank_is_none() {
        unsafe {
            std::env::set_var("INTEL_UTILS_TEST_BLANK", "   ");
        }
        assert_eq!(env_opt("INTEL_UTILS_TEST_BLANK"), None);
        assert_eq!(env_or("INTEL_UTILS_TEST_BLANK", "fallback"), "fallback");
        unsafe {
            std::env::remove_var("INTEL_UTILS_TEST_BLANK");
        }
    }

    #[test]
    fn test_env_parse() {
        unsafe {
            std::env::set_var("INTEL_UTILS_TEST_NUM", "42");
            std::env::set_var("INTEL_UTILS_TEST_BAD", "forty-two");
        }

        assert_eq!(env_parse("INTEL_UTILS_TEST_NUM", 7_u32), Ok(42));
        assert_eq!(env_parse("INTEL_UTILS_TEST_UNSET_NUM", 7_u32), Ok(7));

        let err = env_parse("INTEL_UTILS_TEST_BAD", 7_u32).unwrap_err();
        assert_eq!(err.key, "INTEL_UTILS_TEST_BAD");
        assert_eq!(err.value, "forty-two");

        unsafe {
            std::env::remove_var("INTEL_UTILS_TEST_NUM");
            std::env::remove_var("INTEL_UTILS_TEST_BAD");
        }
    }
}
