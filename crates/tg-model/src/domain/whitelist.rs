use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{TaskClass, TypeId, Username};

/// Authorization table mapping a queue to the task types permitted to run
/// on it, partitioned by task class.
///
/// A queue consults every whitelist attached to it; membership in the
/// matching set of any one of them admits the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWhitelist {
    /// Whitelist name, unique across whitelists.
    pub name: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Creating user. `None` once the creator is deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Username>,
    /// Executable task types permitted by this whitelist.
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub whitelisted_executable_task_types: HashSet<TypeId>,
    /// Container task types (either kind) permitted by this whitelist.
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub whitelisted_container_task_types: HashSet<TypeId>,
}

impl TaskWhitelist {
    /// Create an empty whitelist.
    pub fn new<N: Into<String>>(name: N, owner: Option<Username>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            owner,
            whitelisted_executable_task_types: HashSet::new(),
            whitelisted_container_task_types: HashSet::new(),
        }
    }

    /// Permit an executable task type.
    pub fn add_executable(&mut self, id: TypeId) {
        self.whitelisted_executable_task_types.insert(id);
    }

    /// Permit a container task type.
    pub fn add_container(&mut self, id: TypeId) {
        self.whitelisted_container_task_types.insert(id);
    }

    /// Whether this whitelist permits the given type in the set matching
    /// its class. Container kinds share one set; kind refinement is the
    /// queue's acceptance-flag concern.
    pub fn permits(&self, class: TaskClass, id: &TypeId) -> bool {
        if class.is_container() {
            self.whitelisted_container_task_types.contains(id)
        } else {
            self.whitelisted_executable_task_types.contains(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContainerKind;

    #[test]
    fn permits_checks_matching_partition() {
        let mut wl = TaskWhitelist::new("main", None);
        wl.add_executable(TypeId::from("exe-1"));
        wl.add_container(TypeId::from("img-1"));

        assert!(wl.permits(TaskClass::Executable, &TypeId::from("exe-1")));
        assert!(!wl.permits(TaskClass::Executable, &TypeId::from("img-1")));

        let docker = TaskClass::Container(ContainerKind::Docker);
        let singularity = TaskClass::Container(ContainerKind::Singularity);
        assert!(wl.permits(docker, &TypeId::from("img-1")));
        // Both container kinds consult the same set.
        assert!(wl.permits(singularity, &TypeId::from("img-1")));
        assert!(!wl.permits(docker, &TypeId::from("exe-1")));
    }

    #[test]
    fn empty_whitelist_permits_nothing() {
        let wl = TaskWhitelist::new("empty", None);
        assert!(!wl.permits(TaskClass::Executable, &TypeId::from("exe-1")));
    }
}
