use serde::{Deserialize, Serialize};

use crate::{ContainerKind, QueueName, TaskClass, Username};

/// A named admission target with activation, privacy and class-acceptance
/// policy.
///
/// Flags are mutated administratively. Deactivating a queue only blocks new
/// admissions; instances admitted earlier are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueue {
    /// Globally unique queue name.
    pub name: QueueName,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Creating user. `None` once the creator is deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Username>,
    /// If `true`, only the owner may submit instances.
    #[serde(default)]
    pub private: bool,
    /// If `false`, no new instances are admitted.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Whether the queue accepts executable tasks.
    #[serde(default = "default_true")]
    pub runs_executable_tasks: bool,
    /// Whether the queue accepts Docker container tasks.
    #[serde(default = "default_true")]
    pub runs_docker_container_tasks: bool,
    /// Whether the queue accepts Singularity container tasks.
    #[serde(default)]
    pub runs_singularity_container_tasks: bool,
    /// Names of the whitelists consulted for this queue.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub whitelists: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl TaskQueue {
    /// Create a queue with the default policy: active, public, accepting
    /// executable and Docker tasks but not Singularity.
    pub fn new<N: Into<QueueName>>(name: N, owner: Option<Username>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            owner,
            private: false,
            active: true,
            runs_executable_tasks: true,
            runs_docker_container_tasks: true,
            runs_singularity_container_tasks: false,
            whitelists: Vec::new(),
        }
    }

    /// Whether the queue's acceptance flags allow the given task class.
    pub fn accepts(&self, class: TaskClass) -> bool {
        match class {
            TaskClass::Executable => self.runs_executable_tasks,
            TaskClass::Container(ContainerKind::Docker) => self.runs_docker_container_tasks,
            TaskClass::Container(ContainerKind::Singularity) => {
                self.runs_singularity_container_tasks
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_queue_default_policy() {
        let queue = TaskQueue::new("default", Some("ada".to_string()));
        assert!(queue.active);
        assert!(!queue.private);
        assert!(queue.accepts(TaskClass::Executable));
        assert!(queue.accepts(TaskClass::Container(ContainerKind::Docker)));
        assert!(!queue.accepts(TaskClass::Container(ContainerKind::Singularity)));
    }

    #[test]
    fn acceptance_follows_flags() {
        let mut queue = TaskQueue::new("q", None);
        queue.runs_executable_tasks = false;
        queue.runs_singularity_container_tasks = true;

        assert!(!queue.accepts(TaskClass::Executable));
        assert!(queue.accepts(TaskClass::Container(ContainerKind::Singularity)));
    }

    #[test]
    fn serde_fills_flag_defaults() {
        let queue: TaskQueue = serde_json::from_str(r#"{"name": "q"}"#).unwrap();
        assert!(queue.active);
        assert!(!queue.private);
        assert!(queue.runs_executable_tasks);
        assert!(!queue.runs_singularity_container_tasks);
        assert!(queue.whitelists.is_empty());
    }
}
