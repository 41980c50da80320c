//! Argument-schema checks shared by the registry and the admission engine.
//!
//! Everything here is a pure function over already-loaded values; callers
//! compose validation with a single persistence write.

use serde_json::Value;

use tg_model::{ArgsError, EnvVars, TaskArgs};

use crate::error::CoreError;

/// Normalize a raw JSON-like list field (`environment_variables`,
/// `required_arguments`) into a list of names.
///
/// `None`/`null` becomes the empty list. A string payload is parsed as
/// JSON exactly once. Anything that is not an array of strings after that
/// is rejected.
pub fn coerce_name_list(raw: Option<Value>) -> Result<Vec<String>, CoreError> {
    let value = match raw {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) => {
            serde_json::from_str::<Value>(&s).map_err(|_| ArgsError::NotJson(s))?
        }
        Some(other) => other,
    };

    let items = match value {
        Value::Array(items) => items,
        other => return Err(ArgsError::NotArray(other.to_string()).into()),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(name) => Ok(name),
            other => Err(ArgsError::NotArray(other.to_string()).into()),
        })
        .collect()
}

/// Normalize a raw environment-variable field.
pub fn coerce_env_vars(raw: Option<Value>) -> Result<EnvVars, CoreError> {
    Ok(EnvVars::from(coerce_name_list(raw)?))
}

/// Normalize a raw JSON-like mapping field (`arguments`,
/// `required_arguments_default_values`) into an argument map.
pub fn coerce_arg_map(raw: Option<Value>) -> Result<TaskArgs, CoreError> {
    match raw {
        None => Ok(TaskArgs::new()),
        Some(value) => Ok(TaskArgs::coerce(value)?),
    }
}

/// Check that every default key is a member of the required-argument set.
///
/// The engine rejects stray default keys outright instead of silently
/// ignoring them.
pub fn check_defaults_subset(
    required: &[String],
    defaults: &TaskArgs,
) -> Result<(), CoreError> {
    for (name, _) in defaults.iter() {
        if !required.iter().any(|r| r == name) {
            return Err(CoreError::SchemaViolation(format!(
                "default value provided for undeclared required argument {name}"
            )));
        }
    }
    Ok(())
}

/// Validate a supplied argument map against a task type's required
/// arguments, optionally filling in defaults for missing names.
///
/// A caller-supplied value is never overwritten by a default. A required
/// name that is missing and has no default fails naming the argument,
/// whether or not defaulting was requested. Undeclared keys pass through.
pub fn normalize_args(
    required: &[String],
    defaults: &TaskArgs,
    mut supplied: TaskArgs,
    fill_defaults: bool,
) -> Result<TaskArgs, CoreError> {
    for name in required {
        if supplied.contains(name) {
            continue;
        }

        match defaults.get(name) {
            Some(default) if fill_defaults => supplied.insert(name.clone(), default.clone()),
            Some(_) => {}
            None => {
                return Err(CoreError::SchemaViolation(format!(
                    "missing required argument {name}"
                )));
            }
        }
    }

    Ok(supplied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_list_null_is_empty() {
        assert!(coerce_name_list(None).unwrap().is_empty());
        assert!(coerce_name_list(Some(Value::Null)).unwrap().is_empty());
    }

    #[test]
    fn name_list_parses_string_payload_once() {
        let names = coerce_name_list(Some(json!(r#"["a", "b"]"#))).unwrap();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn name_list_rejects_bad_json_string() {
        let err = coerce_name_list(Some(json!("[unterminated"))).unwrap_err();
        assert_eq!(err, CoreError::MalformedInput("'[unterminated' is not valid JSON!".into()));
    }

    #[test]
    fn name_list_rejects_non_array() {
        let err = coerce_name_list(Some(json!({"a": 1}))).unwrap_err();
        assert_eq!(err.category(), "malformed_input");
        assert!(err.to_string().contains("is not a valid JSON array!"));
    }

    #[test]
    fn name_list_rejects_non_string_elements() {
        let err = coerce_name_list(Some(json!(["a", 2]))).unwrap_err();
        assert!(err.to_string().contains("'2'"));
    }

    #[test]
    fn arg_map_rejects_non_dict() {
        let err = coerce_arg_map(Some(json!([1]))).unwrap_err();
        assert!(err.to_string().contains("is not a valid JSON dictionary!"));
    }

    #[test]
    fn defaults_subset_accepts_members() {
        let required = vec!["x".to_string(), "y".to_string()];
        let defaults = TaskArgs::from([("y", json!(1))]);
        assert!(check_defaults_subset(&required, &defaults).is_ok());
    }

    #[test]
    fn defaults_subset_rejects_stray_key() {
        let required = vec!["x".to_string()];
        let defaults = TaskArgs::from([("z", json!(1))]);

        let err = check_defaults_subset(&required, &defaults).unwrap_err();
        assert_eq!(err.category(), "schema_violation");
        assert!(err.to_string().contains('z'));
    }

    #[test]
    fn normalize_fills_missing_default() {
        let required = vec!["x".to_string(), "y".to_string()];
        let defaults = TaskArgs::from([("y", json!(1))]);
        let supplied = TaskArgs::from([("x", json!(5))]);

        let out = normalize_args(&required, &defaults, supplied, true).unwrap();
        assert_eq!(out.get("x"), Some(&json!(5)));
        assert_eq!(out.get("y"), Some(&json!(1)));
    }

    #[test]
    fn normalize_never_overwrites_supplied_value() {
        let required = vec!["y".to_string()];
        let defaults = TaskArgs::from([("y", json!(1))]);
        let supplied = TaskArgs::from([("y", json!(42))]);

        let out = normalize_args(&required, &defaults, supplied, true).unwrap();
        assert_eq!(out.get("y"), Some(&json!(42)));
    }

    #[test]
    fn normalize_fails_naming_missing_argument() {
        let required = vec!["x".to_string(), "y".to_string()];
        let defaults = TaskArgs::from([("y", json!(1))]);

        let err = normalize_args(&required, &defaults, TaskArgs::new(), true).unwrap_err();
        assert_eq!(
            err,
            CoreError::SchemaViolation("missing required argument x".into())
        );
    }

    #[test]
    fn normalize_without_filling_leaves_defaultable_gap() {
        let required = vec!["y".to_string()];
        let defaults = TaskArgs::from([("y", json!(1))]);

        // Dry-run validation: the gap is legal but not filled.
        let out = normalize_args(&required, &defaults, TaskArgs::new(), false).unwrap();
        assert!(!out.contains("y"));
    }

    #[test]
    fn normalize_keeps_undeclared_keys() {
        let out = normalize_args(
            &[],
            &TaskArgs::new(),
            TaskArgs::from([("extra", json!("kept"))]),
            true,
        )
        .unwrap();
        assert_eq!(out.get("extra"), Some(&json!("kept")));
    }
}
