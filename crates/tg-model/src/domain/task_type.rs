use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ts;
use crate::{ContainerKind, EnvVars, TaskArgs, TaskClass, Username};

/// Opaque identifier assigned to a task type at registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TypeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TypeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runtime backing of a task type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskRuntime {
    /// Run the command directly on the worker host.
    #[default]
    Executable,
    /// Run the command inside a container.
    Container {
        /// Container image name and tag, e.g. `"ubuntu:24.04"` for Docker
        /// or `"docker://ubuntu:24.04"` for Singularity.
        image: String,
        /// Container engine the image targets.
        kind: ContainerKind,
    },
}

impl TaskRuntime {
    /// The task class this runtime belongs to.
    pub fn class(&self) -> TaskClass {
        match self {
            TaskRuntime::Executable => TaskClass::Executable,
            TaskRuntime::Container { kind, .. } => TaskClass::Container(*kind),
        }
    }
}

/// A validated, reusable task definition.
///
/// Constructed only through the registry, which enforces the name charset,
/// the `(name, owner)` uniqueness invariant and the argument-schema
/// consistency rules. Identity is immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskType {
    /// Registry-assigned identifier.
    pub id: TypeId,
    /// Task name, unique per owner.
    pub name: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Registering user. `None` once the creator is deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Username>,
    /// Literal command template the executor appends arguments to.
    /// Shell metacharacters are not interpreted.
    pub command_to_run: String,
    /// Host environment variable names forwarded into the job.
    #[serde(default, skip_serializing_if = "EnvVars::is_empty")]
    pub environment_variables: EnvVars,
    /// Argument names the caller must supply unless defaulted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_arguments: Vec<String>,
    /// Default values for a subset of the required arguments.
    #[serde(default, skip_serializing_if = "TaskArgs::is_empty")]
    pub required_arguments_default_values: TaskArgs,
    /// When the type was registered.
    #[serde(with = "ts")]
    pub created_at: SystemTime,
    /// Executable or container backing.
    pub runtime: TaskRuntime,
}

impl TaskType {
    /// The task class instances of this type belong to.
    pub fn class(&self) -> TaskClass {
        self.runtime.class()
    }
}

/// Unvalidated task-type definition as supplied by a caller.
///
/// The three JSON-like fields arrive as raw values (`null`, serialized
/// string, or structured) and are normalized by the registry before a
/// [`TaskType`] is built from the draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTypeDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub command_to_run: String,
    /// Raw environment variable list: `null`, JSON string, or array.
    #[serde(default)]
    pub environment_variables: Option<Value>,
    /// Raw required argument list: `null`, JSON string, or array.
    #[serde(default)]
    pub required_arguments: Option<Value>,
    /// Raw default-value table: `null`, JSON string, or object.
    #[serde(default)]
    pub required_arguments_default_values: Option<Value>,
    /// Executable or container backing. Defaults to executable.
    #[serde(default = "default_runtime")]
    pub runtime: TaskRuntime,
}

fn default_runtime() -> TaskRuntime {
    TaskRuntime::Executable
}
