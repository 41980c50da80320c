use serde::{Deserialize, Serialize};

/// Container engine a containerized task type targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerKind {
    Docker,
    Singularity,
}

/// Class of a task, carried explicitly on every instance from admission.
///
/// Queues whitelist task types per class (executable vs container) and
/// accept classes through independent flags, with container acceptance
/// refined by [`ContainerKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskClass {
    Executable,
    Container(ContainerKind),
}

impl TaskClass {
    /// Returns a short symbolic identifier for the class.
    ///
    /// This is primarily intended for logging and filtering:
    /// - `"executable"`
    /// - `"docker"`
    /// - `"singularity"`
    pub fn kind(&self) -> &'static str {
        match self {
            TaskClass::Executable => "executable",
            TaskClass::Container(ContainerKind::Docker) => "docker",
            TaskClass::Container(ContainerKind::Singularity) => "singularity",
        }
    }

    /// Returns `true` for either container class.
    pub fn is_container(&self) -> bool {
        matches!(self, TaskClass::Container(_))
    }
}

impl std::fmt::Display for TaskClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}
