use serde::{Deserialize, Serialize};

/// Environment variable under which executors expose the instance UUID to
/// the job. The engine documents the convention; it never sets the value
/// itself.
pub const JOB_UUID_VAR: &str = "JOB_UUID";

/// Ordered list of host environment variable names a task type asks the
/// executor to forward into the job environment.
///
/// Names only; values are resolved on the worker at execution time.
/// Serialized as a transparent array wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvVars(pub Vec<String>);

impl EnvVars {
    /// Create an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Append a variable name, preserving declaration order.
    pub fn push<N: Into<String>>(&mut self, name: N) {
        self.0.push(name.into());
    }

    /// Iterate over the names in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for EnvVars {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl<const N: usize> From<[&str; N]> for EnvVars {
    fn from(names: [&str; N]) -> Self {
        Self(names.into_iter().map(String::from).collect())
    }
}
