//! Queue and whitelist authorization checks.

use tg_model::{ContainerKind, TaskClass, TaskQueue, TaskType, TaskWhitelist};

use crate::error::CoreError;

/// Decide whether an instance of `task_type`, submitted by `user`, may be
/// admitted to `queue`.
///
/// Checks run in a fixed order, each an independent fail-fast rejection;
/// the first failing check's reason is returned:
/// 1. the queue is active,
/// 2. a private queue only admits its owner,
/// 3. the task type is whitelisted for its class on at least one of the
///    queue's whitelists,
/// 4. the queue's acceptance flags allow the class.
pub fn authorize(
    queue: &TaskQueue,
    whitelists: &[TaskWhitelist],
    task_type: &TaskType,
    user: Option<&str>,
) -> Result<(), CoreError> {
    if !queue.active {
        return Err(CoreError::AuthorizationDenied(format!(
            "Queue {} is not active",
            queue.name
        )));
    }

    if queue.private && user != queue.owner.as_deref() {
        return Err(CoreError::AuthorizationDenied(format!(
            "{} is not authorized to use the queue {}",
            user.unwrap_or("anonymous"),
            queue.name
        )));
    }

    let class = task_type.class();
    if !whitelists.iter().any(|wl| wl.permits(class, &task_type.id)) {
        return Err(CoreError::AuthorizationDenied(format!(
            "Queue {} has not whitelisted task type {}",
            queue.name, task_type.name
        )));
    }

    if !queue.accepts(class) {
        let label = match class {
            TaskClass::Executable => "executable",
            TaskClass::Container(ContainerKind::Docker) => "Docker container",
            TaskClass::Container(ContainerKind::Singularity) => "Singularity container",
        };
        return Err(CoreError::AuthorizationDenied(format!(
            "Queue {} does not accept {label} tasks",
            queue.name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use tg_model::{EnvVars, TaskArgs, TaskRuntime, TypeId};

    fn exe_type(id: &str) -> TaskType {
        TaskType {
            id: TypeId::from(id),
            name: format!("type_{id}"),
            description: String::new(),
            owner: Some("ada".to_string()),
            command_to_run: "true".to_string(),
            environment_variables: EnvVars::new(),
            required_arguments: vec![],
            required_arguments_default_values: TaskArgs::new(),
            created_at: SystemTime::now(),
            runtime: TaskRuntime::Executable,
        }
    }

    fn docker_type(id: &str) -> TaskType {
        TaskType {
            runtime: TaskRuntime::Container {
                image: "ubuntu:24.04".to_string(),
                kind: ContainerKind::Docker,
            },
            ..exe_type(id)
        }
    }

    fn whitelist_for(task_type: &TaskType) -> TaskWhitelist {
        let mut wl = TaskWhitelist::new("wl", None);
        match task_type.class() {
            TaskClass::Executable => wl.add_executable(task_type.id.clone()),
            TaskClass::Container(_) => wl.add_container(task_type.id.clone()),
        }
        wl
    }

    #[test]
    fn inactive_queue_rejected_before_anything_else() {
        let mut queue = TaskQueue::new("q", Some("ada".to_string()));
        queue.active = false;
        // Everything else would also fail; the active check must win.
        queue.private = true;
        queue.runs_executable_tasks = false;

        let err = authorize(&queue, &[], &exe_type("tt-1"), None).unwrap_err();
        assert_eq!(
            err,
            CoreError::AuthorizationDenied("Queue q is not active".into())
        );
    }

    #[test]
    fn private_queue_admits_only_owner() {
        let mut queue = TaskQueue::new("q", Some("ada".to_string()));
        queue.private = true;
        let task_type = exe_type("tt-1");
        let wls = [whitelist_for(&task_type)];

        let err = authorize(&queue, &wls, &task_type, Some("grace")).unwrap_err();
        assert_eq!(
            err,
            CoreError::AuthorizationDenied("grace is not authorized to use the queue q".into())
        );

        assert!(authorize(&queue, &wls, &task_type, Some("ada")).is_ok());
    }

    #[test]
    fn missing_whitelist_entry_rejected_even_if_class_accepted() {
        let queue = TaskQueue::new("q", None);
        let task_type = exe_type("tt-1");

        let err = authorize(&queue, &[], &task_type, None).unwrap_err();
        assert_eq!(
            err,
            CoreError::AuthorizationDenied(
                "Queue q has not whitelisted task type type_tt-1".into()
            )
        );

        // Whitelisted under the wrong partition is still a miss.
        let mut wrong = TaskWhitelist::new("wl", None);
        wrong.add_container(task_type.id.clone());
        let err = authorize(&queue, &[wrong], &task_type, None).unwrap_err();
        assert_eq!(err.category(), "authorization_denied");
    }

    #[test]
    fn any_attached_whitelist_suffices() {
        let queue = TaskQueue::new("q", None);
        let task_type = exe_type("tt-1");
        let empty = TaskWhitelist::new("empty", None);

        assert!(authorize(&queue, &[empty, whitelist_for(&task_type)], &task_type, None).is_ok());
    }

    #[test]
    fn acceptance_flags_checked_after_whitelist() {
        let mut queue = TaskQueue::new("q", None);
        queue.runs_executable_tasks = false;
        let task_type = exe_type("tt-1");
        let wls = [whitelist_for(&task_type)];

        let err = authorize(&queue, &wls, &task_type, None).unwrap_err();
        assert_eq!(
            err,
            CoreError::AuthorizationDenied("Queue q does not accept executable tasks".into())
        );
    }

    #[test]
    fn container_acceptance_selected_by_kind() {
        let mut queue = TaskQueue::new("q", None);
        queue.runs_docker_container_tasks = false;
        let task_type = docker_type("tt-2");
        let wls = [whitelist_for(&task_type)];

        let err = authorize(&queue, &wls, &task_type, None).unwrap_err();
        assert_eq!(
            err,
            CoreError::AuthorizationDenied(
                "Queue q does not accept Docker container tasks".into()
            )
        );

        queue.runs_docker_container_tasks = true;
        assert!(authorize(&queue, &wls, &task_type, None).is_ok());
    }
}
