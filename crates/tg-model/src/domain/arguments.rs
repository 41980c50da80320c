use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure to coerce a raw payload into a JSON-like collection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("'{0}' is not valid JSON!")]
    NotJson(String),
    #[error("'{0}' is not a valid JSON dictionary!")]
    NotDict(String),
    #[error("'{0}' is not a valid JSON array!")]
    NotArray(String),
}

/// Argument payload of a task instance, and default-value table of a task
/// type: a JSON object keyed by argument name.
///
/// Serialized as a transparent object wrapper. The set is additive: keys
/// not declared by the task type pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskArgs(pub Map<String, Value>);

impl TaskArgs {
    /// Create an empty argument map.
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Get the value supplied for an argument name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Set the value for an argument name, replacing any previous value.
    pub fn insert<K, V>(&mut self, name: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.0.insert(name.into(), value.into());
    }

    /// Iterate over all name–value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Coerce a raw JSON payload into an argument map.
    ///
    /// `null` maps to the empty set. A string payload is parsed as JSON
    /// exactly once; a parse failure, or any parsed or direct value that is
    /// not an object, is a hard rejection.
    pub fn coerce(raw: Value) -> Result<Self, ArgsError> {
        let value = match raw {
            Value::Null => return Ok(Self::new()),
            Value::String(s) => {
                serde_json::from_str::<Value>(&s).map_err(|_| ArgsError::NotJson(s))?
            }
            other => other,
        };

        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ArgsError::NotDict(other.to_string())),
        }
    }
}

impl From<Map<String, Value>> for TaskArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<const N: usize> From<[(&str, Value); N]> for TaskArgs {
    fn from(pairs: [(&str, Value); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_null_is_empty() {
        let args = TaskArgs::coerce(Value::Null).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn coerce_object_passes_through() {
        let args = TaskArgs::coerce(json!({"x": 5, "y": "z"})).unwrap();
        assert_eq!(args.get("x"), Some(&json!(5)));
        assert_eq!(args.get("y"), Some(&json!("z")));
    }

    #[test]
    fn coerce_string_parses_once() {
        let args = TaskArgs::coerce(json!(r#"{"x": 1}"#)).unwrap();
        assert_eq!(args.get("x"), Some(&json!(1)));
    }

    #[test]
    fn coerce_bad_string_is_not_json() {
        let err = TaskArgs::coerce(json!("{not json")).unwrap_err();
        assert_eq!(err, ArgsError::NotJson("{not json".to_string()));
    }

    #[test]
    fn coerce_doubly_encoded_string_is_rejected() {
        // A string that parses to another string must not be parsed again.
        let err = TaskArgs::coerce(json!(r#""{\"x\": 1}""#)).unwrap_err();
        assert!(matches!(err, ArgsError::NotDict(_)));
    }

    #[test]
    fn coerce_array_is_not_dict() {
        let err = TaskArgs::coerce(json!([1, 2])).unwrap_err();
        assert_eq!(err, ArgsError::NotDict("[1,2]".to_string()));
    }

    #[test]
    fn insert_replaces_value() {
        let mut args = TaskArgs::new();
        args.insert("x", json!(1));
        args.insert("x", json!(2));
        assert_eq!(args.get("x"), Some(&json!(2)));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn serde_transparent_roundtrip() {
        let args = TaskArgs::from([("x", json!(5)), ("y", json!([1, 2]))]);
        let json = serde_json::to_string(&args).unwrap();
        assert!(json.starts_with('{'));

        let back: TaskArgs = serde_json::from_str(&json).unwrap();
        assert_eq!(back, args);
    }
}
