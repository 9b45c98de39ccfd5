//! Environment-backed configuration helpers

use std::str::FromStr;

/// Load a `.env` file from the working directory if one exists.
///
/// Returns `true` when a file was found and applied.
pub fn load_dotenv() -> bool {
    dotenv::dotenv().is_ok()
}

/// Read a non-empty environment variable.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse an environment variable, falling back to `default` when it
/// is unset or does not parse.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_opt_missing() {
        assert_eq!(env_opt("RESEARCH_UTILS_TEST_SURELY_UNSET"), None);
    }

    #[test]
    fn test_env_or_falls_back() {
        assert_eq!(env_or("RESEARCH_UTILS_TEST_SURELY_UNSET", 14_usize), 14);
    }

    #[test]
    fn test_env_or_parses() {
        // SAFETY: test-local variable name, not read by any other test
        unsafe {
            std::env::set_var("RESEARCH_UTILS_TEST_PERIOD", " 21 ");
        }
        assert_eq!(env_or("RESEARCH_UTILS_TEST_PERIOD", 14_usize), 21);
        assert_eq!(env_opt("RESEARCH_UTILS_TEST_PERIOD").as_deref(), Some("21"));
    }
}
