//! Recipe options - enumerated build toggles with defaults.

use std::collections::BTreeMap;

use crate::core::errors::EvalError;

/// Normalize a TOML option value to its string form.
///
/// Booleans become `true`/`false` so that `shared = [true, false]` and
/// `shared = ["true", "false"]` declare the same option.
pub fn option_value(option: &str, value: &toml::Value) -> Result<String, EvalError> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        other => Err(EvalError::malformed(format!(
            "option `{}` has unsupported value `{}` (expected a string, boolean or number)",
            option, other
        ))),
    }
}

/// Validate option declarations against their defaults.
///
/// Every declared option must have a default, and the default must be one of
/// the option's allowed values. Defaults for undeclared options are rejected.
pub fn validate_defaults(
    options: &BTreeMap<String, Vec<String>>,
    defaults: &BTreeMap<String, String>,
) -> Result<(), EvalError> {
    for (name, allowed) in options {
        if allowed.is_empty() {
            return Err(EvalError::malformed(format!(
                "option `{}` declares no allowed values",
                name
            )));
        }

        let default = defaults.get(name).ok_or_else(|| {
            EvalError::malformed(format!("option `{}` has no default value", name))
        })?;

        if !allowed.contains(default) {
            return Err(EvalError::malformed(format!(
                "default `{}` for option `{}` is not one of [{}]",
                default,
                name,
                allowed.join(", ")
            )));
        }
    }

    for name in defaults.keys() {
        if !options.contains_key(name) {
            return Err(EvalError::malformed(format!(
                "default given for undeclared option `{}`",
                name
            )));
        }
    }

    Ok(())
}

/// Apply per-invocation overrides on top of the recipe defaults.
pub fn resolve_options(
    options: &BTreeMap<String, Vec<String>>,
    defaults: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, EvalError> {
    let mut resolved = defaults.clone();

    for (name, value) in overrides {
        let allowed = options.get(name).ok_or_else(|| {
            EvalError::malformed(format!("recipe has no option `{}`", name))
        })?;

        if !allowed.contains(value) {
            return Err(EvalError::malformed(format!(
                "value `{}` for option `{}` is not one of [{}]",
                value,
                name,
                allowed.join(", ")
            )));
        }

        resolved.insert(name.clone(), value.clone());
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_option() -> BTreeMap<String, Vec<String>> {
        let mut options = BTreeMap::new();
        options.insert(
            "shared".to_string(),
            vec!["true".to_string(), "false".to_string()],
        );
        options
    }

    fn defaults(value: &str) -> BTreeMap<String, String> {
        let mut defaults = BTreeMap::new();
        defaults.insert("shared".to_string(), value.to_string());
        defaults
    }

    #[test]
    fn test_option_value_normalizes_booleans() {
        assert_eq!(option_value("shared", &toml::Value::Boolean(true)).unwrap(), "true");
        assert_eq!(option_value("jobs", &toml::Value::Integer(4)).unwrap(), "4");
        assert!(option_value("x", &toml::Value::Array(vec![])).is_err());
    }

    #[test]
    fn test_default_outside_allowed_set() {
        let err = validate_defaults(&shared_option(), &defaults("maybe")).unwrap_err();
        assert!(matches!(err, EvalError::MalformedRecipe { .. }));
        assert!(err.to_string().contains("not one of [true, false]"));
    }

    #[test]
    fn test_missing_default() {
        let err = validate_defaults(&shared_option(), &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("has no default"));
    }

    #[test]
    fn test_default_for_undeclared_option() {
        let mut d = defaults("false");
        d.insert("fPIC".to_string(), "true".to_string());
        assert!(validate_defaults(&shared_option(), &d).is_err());
    }

    #[test]
    fn test_resolve_options_override() {
        let mut overrides = BTreeMap::new();
        overrides.insert("shared".to_string(), "true".to_string());

        let resolved = resolve_options(&shared_option(), &defaults("false"), &overrides).unwrap();
        assert_eq!(resolved.get("shared").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_resolve_options_rejects_unknown_and_invalid() {
        let mut unknown = BTreeMap::new();
        unknown.insert("lto".to_string(), "true".to_string());
        assert!(resolve_options(&shared_option(), &defaults("false"), &unknown).is_err());

        let mut invalid = BTreeMap::new();
        invalid.insert("shared".to_string(), "yes".to_string());
        assert!(resolve_options(&shared_option(), &defaults("false"), &invalid).is_err());
    }
}
