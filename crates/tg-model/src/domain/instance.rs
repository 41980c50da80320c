use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ts;
use crate::{InstanceState, QueueName, TaskArgs, TaskClass, TypeId, Username};

/// One admitted execution request, uniquely identified by UUID.
///
/// Instances exist only through admission; after that, `state`,
/// `finished_at` and (via rename) `name` are the only mutable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInstance {
    /// Primary identity, generated at admission, used by executors.
    pub uuid: Uuid,
    /// Optional non-unique label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lifecycle state. Starts at `created`.
    pub state: InstanceState,
    /// Submitting user. `None` once the submitter is deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Username>,
    /// The task type this instance was built from.
    pub task_type: TypeId,
    /// Class tag fixed at admission from the task type's runtime.
    pub task_class: TaskClass,
    /// Queue the instance was admitted to.
    pub task_queue: QueueName,
    /// Normalized arguments: required names present, defaults filled in.
    #[serde(default, skip_serializing_if = "TaskArgs::is_empty")]
    pub arguments: TaskArgs,
    /// Set once at admission.
    #[serde(with = "ts")]
    pub created_at: SystemTime,
    /// Set exactly once, on the first transition into a terminal state.
    #[serde(
        default,
        with = "ts::opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub finished_at: Option<SystemTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContainerKind;
    use serde_json::json;

    fn sample() -> TaskInstance {
        TaskInstance {
            uuid: Uuid::new_v4(),
            name: Some("nightly-run".to_string()),
            state: InstanceState::Created,
            user: Some("ada".to_string()),
            task_type: TypeId::from("tt-1"),
            task_class: TaskClass::Container(ContainerKind::Docker),
            task_queue: "default".to_string(),
            arguments: TaskArgs::from([("x", json!(5))]),
            created_at: SystemTime::now(),
            finished_at: None,
        }
    }

    #[test]
    fn serde_roundtrip() {
        let instance = sample();
        let json = serde_json::to_string(&instance).unwrap();
        let back: TaskInstance = serde_json::from_str(&json).unwrap();

        assert_eq!(back.uuid, instance.uuid);
        assert_eq!(back.state, instance.state);
        assert_eq!(back.task_class, instance.task_class);
        assert_eq!(back.arguments, instance.arguments);
        assert!(back.finished_at.is_none());
    }

    #[test]
    fn unfinished_instance_omits_finished_at() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("finishedAt"));
    }
}
