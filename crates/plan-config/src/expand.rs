//! Environment variable expansion for settings values.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand environment variable references in a settings value.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is left alone so shell paths like `$HOME/bin` survive.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("PLAN_TEST_EXPAND_SIMPLE", "dewitt");
        }
        let result = expand_env("${PLAN_TEST_EXPAND_SIMPLE}", "username").unwrap();
        assert_eq!(result, "dewitt");
        unsafe {
            std::env::remove_var("PLAN_TEST_EXPAND_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("PLAN_TEST_EXPAND_UNSET");
        }
        let result = expand_env("${PLAN_TEST_EXPAND_UNSET:-UTC}", "timezone").unwrap();
        assert_eq!(result, "UTC");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("PLAN_TEST_EXPAND_MISSING");
        }
        let err = expand_env("${PLAN_TEST_EXPAND_MISSING}", "title").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("PLAN_TEST_EXPAND_MISSING"));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("PLAN_TEST_EXPAND_HOST", "plan.example.com");
        }
        let result = expand_env("https://${PLAN_TEST_EXPAND_HOST}/~me", "base_url").unwrap();
        assert_eq!(result, "https://plan.example.com/~me");
        unsafe {
            std::env::remove_var("PLAN_TEST_EXPAND_HOST");
        }
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("$HOME/bin", "directory").unwrap();
        assert_eq!(result, "$HOME/bin");
    }
}
