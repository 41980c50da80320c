//! Registration and administrative update of task types, queues and
//! whitelists.
//!
//! Validation here is a pure function of the submitted definition; the
//! single store write happens only after it passes.

use std::time::SystemTime;

use tracing::{info, instrument};
use uuid::Uuid;

use tg_model::{
    TaskQueue, TaskType, TaskTypeDraft, TaskWhitelist, TypeId, Username, validate_queue_name,
    validate_task_type_name, validate_whitelist_name,
};

use crate::{
    error::CoreError,
    schema::{check_defaults_subset, coerce_arg_map, coerce_env_vars, coerce_name_list},
    state::CoreState,
};

/// Validated construction of task types, queues and whitelists.
#[derive(Clone)]
pub struct Registry {
    state: CoreState,
}

impl Registry {
    pub fn new(state: CoreState) -> Self {
        Self { state }
    }

    /// Validate a draft and register it as a new task type owned by
    /// `owner` (the submission surface injects the authenticated user).
    #[instrument(level = "debug", skip(self, draft), fields(name = %draft.name))]
    pub fn register_task_type(
        &self,
        draft: TaskTypeDraft,
        owner: Option<Username>,
    ) -> Result<TaskType, CoreError> {
        let task_type = build_task_type(TypeId::from(Uuid::new_v4().to_string()), draft, owner)?;

        self.state.insert_task_type(task_type.clone())?;
        info!(id = %task_type.id, name = %task_type.name, "task type registered");
        Ok(task_type)
    }

    /// Re-validate a draft and replace the definition behind `id`.
    ///
    /// The id and registration time are preserved; the `(name, owner)`
    /// uniqueness invariant is re-checked against the rest of the registry.
    #[instrument(level = "debug", skip(self, draft), fields(id = %id))]
    pub fn update_task_type(
        &self,
        id: &TypeId,
        draft: TaskTypeDraft,
    ) -> Result<TaskType, CoreError> {
        let previous = self
            .state
            .task_type(id)
            .ok_or_else(|| CoreError::NotFound(format!("No task type with ID {id} found")))?;

        let mut task_type = build_task_type(id.clone(), draft, previous.owner)?;
        task_type.created_at = previous.created_at;

        self.state.replace_task_type(task_type.clone())?;
        info!(id = %task_type.id, name = %task_type.name, "task type updated");
        Ok(task_type)
    }

    pub fn task_type(&self, id: &TypeId) -> Result<TaskType, CoreError> {
        self.state
            .task_type(id)
            .ok_or_else(|| CoreError::NotFound(format!("No task type with ID {id} found")))
    }

    pub fn list_task_types(&self) -> Vec<TaskType> {
        self.state.list_task_types()
    }

    /// Validate and create a queue.
    #[instrument(level = "debug", skip(self, queue), fields(name = %queue.name))]
    pub fn create_queue(&self, queue: TaskQueue) -> Result<TaskQueue, CoreError> {
        validate_queue_name(&queue.name)?;
        self.state.insert_queue(queue.clone())?;
        info!(name = %queue.name, "task queue created");
        Ok(queue)
    }

    /// Replace a queue record: flag toggles and whitelist attachment.
    ///
    /// Deactivation only blocks new admissions; instances admitted earlier
    /// keep running.
    #[instrument(level = "debug", skip(self, queue), fields(name = %queue.name))]
    pub fn update_queue(&self, queue: TaskQueue) -> Result<TaskQueue, CoreError> {
        validate_queue_name(&queue.name)?;
        self.state.replace_queue(queue.clone())?;
        info!(name = %queue.name, active = queue.active, "task queue updated");
        Ok(queue)
    }

    pub fn queue(&self, name: &str) -> Result<TaskQueue, CoreError> {
        self.state
            .queue(name)
            .ok_or_else(|| CoreError::NotFound(format!("No task queue named {name} found")))
    }

    pub fn list_queues(&self) -> Vec<TaskQueue> {
        self.state.list_queues()
    }

    /// Validate and create a whitelist.
    #[instrument(level = "debug", skip(self, whitelist), fields(name = %whitelist.name))]
    pub fn create_whitelist(&self, whitelist: TaskWhitelist) -> Result<TaskWhitelist, CoreError> {
        validate_whitelist_name(&whitelist.name)?;
        self.check_whitelist_references(&whitelist)?;
        self.state.insert_whitelist(whitelist.clone())?;
        info!(name = %whitelist.name, "task whitelist created");
        Ok(whitelist)
    }

    /// Replace a whitelist record.
    #[instrument(level = "debug", skip(self, whitelist), fields(name = %whitelist.name))]
    pub fn update_whitelist(&self, whitelist: TaskWhitelist) -> Result<TaskWhitelist, CoreError> {
        validate_whitelist_name(&whitelist.name)?;
        self.check_whitelist_references(&whitelist)?;
        self.state.replace_whitelist(whitelist.clone())?;
        info!(name = %whitelist.name, "task whitelist updated");
        Ok(whitelist)
    }

    pub fn whitelist(&self, name: &str) -> Result<TaskWhitelist, CoreError> {
        self.state
            .whitelist(name)
            .ok_or_else(|| CoreError::NotFound(format!("No task whitelist named {name} found")))
    }

    pub fn list_whitelists(&self) -> Vec<TaskWhitelist> {
        self.state.list_whitelists()
    }

    /// Every type id a whitelist names must exist and sit in the matching
    /// partition.
    fn check_whitelist_references(&self, whitelist: &TaskWhitelist) -> Result<(), CoreError> {
        for id in &whitelist.whitelisted_executable_task_types {
            let task_type = self.task_type(id)?;
            if task_type.class().is_container() {
                return Err(CoreError::InvalidDefinition(format!(
                    "task type {} is a container type and cannot be whitelisted as executable",
                    task_type.name
                )));
            }
        }
        for id in &whitelist.whitelisted_container_task_types {
            let task_type = self.task_type(id)?;
            if !task_type.class().is_container() {
                return Err(CoreError::InvalidDefinition(format!(
                    "task type {} is an executable type and cannot be whitelisted as container",
                    task_type.name
                )));
            }
        }
        Ok(())
    }
}

/// Pure draft validation: name charset, JSON-field coercion, shape checks
/// and the defaults-subset invariant.
fn build_task_type(
    id: TypeId,
    draft: TaskTypeDraft,
    owner: Option<Username>,
) -> Result<TaskType, CoreError> {
    validate_task_type_name(&draft.name)?;

    let environment_variables = coerce_env_vars(draft.environment_variables)?;
    let required_arguments = coerce_name_list(draft.required_arguments)?;
    let required_arguments_default_values =
        coerce_arg_map(draft.required_arguments_default_values)?;

    check_defaults_subset(&required_arguments, &required_arguments_default_values)?;

    Ok(TaskType {
        id,
        name: draft.name,
        description: draft.description,
        owner,
        command_to_run: draft.command_to_run,
        environment_variables,
        required_arguments,
        required_arguments_default_values,
        created_at: SystemTime::now(),
        runtime: draft.runtime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tg_model::{ContainerKind, TaskRuntime};

    fn registry() -> Registry {
        Registry::new(CoreState::new())
    }

    fn draft(name: &str) -> TaskTypeDraft {
        TaskTypeDraft {
            name: name.to_string(),
            command_to_run: "python /app/script.py".to_string(),
            ..TaskTypeDraft::default()
        }
    }

    #[test]
    fn register_normalizes_loose_fields() {
        let reg = registry();
        let task_type = reg
            .register_task_type(TaskTypeDraft {
                environment_variables: Some(json!(null)),
                required_arguments: Some(json!(r#"["x", "y"]"#)),
                required_arguments_default_values: Some(json!({"y": 1})),
                ..draft("analysis")
            }, Some("ada".to_string()))
            .unwrap();

        assert!(task_type.environment_variables.is_empty());
        assert_eq!(task_type.required_arguments, vec!["x", "y"]);
        assert_eq!(
            task_type.required_arguments_default_values.get("y"),
            Some(&json!(1))
        );
    }

    #[test]
    fn register_rejects_unparseable_field() {
        let reg = registry();
        let err = reg
            .register_task_type(TaskTypeDraft {
                required_arguments: Some(json!("[oops")),
                ..draft("analysis")
            }, None)
            .unwrap_err();

        assert_eq!(err, CoreError::MalformedInput("'[oops' is not valid JSON!".into()));
    }

    #[test]
    fn register_rejects_wrong_shape() {
        let reg = registry();
        let err = reg
            .register_task_type(TaskTypeDraft {
                required_arguments_default_values: Some(json!([1, 2])),
                ..draft("analysis")
            }, None)
            .unwrap_err();

        assert!(err.to_string().contains("is not a valid JSON dictionary!"));
    }

    #[test]
    fn register_rejects_stray_default_key() {
        let reg = registry();
        let err = reg
            .register_task_type(TaskTypeDraft {
                required_arguments: Some(json!(["x"])),
                required_arguments_default_values: Some(json!({"z": 1})),
                ..draft("analysis")
            }, None)
            .unwrap_err();

        assert_eq!(err.category(), "schema_violation");
        assert!(err.to_string().contains('z'));
    }

    #[test]
    fn register_rejects_bad_name() {
        let reg = registry();
        let err = reg.register_task_type(draft("2fast"), None).unwrap_err();
        assert_eq!(err.category(), "invalid_definition");
    }

    #[test]
    fn update_preserves_identity_fields() {
        let reg = registry();
        let original = reg
            .register_task_type(draft("analysis"), Some("ada".to_string()))
            .unwrap();

        let updated = reg
            .update_task_type(
                &original.id,
                TaskTypeDraft {
                    description: "v2".to_string(),
                    ..draft("analysis")
                },
            )
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.description, "v2");
    }

    #[test]
    fn update_missing_type_is_not_found() {
        let reg = registry();
        let err = reg
            .update_task_type(&TypeId::from("ghost"), draft("analysis"))
            .unwrap_err();
        assert_eq!(err.category(), "not_found");
    }

    #[test]
    fn queue_name_charset_enforced() {
        let reg = registry();
        let err = reg.create_queue(TaskQueue::new("bad name", None)).unwrap_err();
        assert_eq!(err.category(), "invalid_definition");

        assert!(reg.create_queue(TaskQueue::new("gpu-pool@site", None)).is_ok());
    }

    #[test]
    fn whitelist_rejects_unknown_type_reference() {
        let reg = registry();
        let mut wl = TaskWhitelist::new("wl", None);
        wl.add_executable(TypeId::from("ghost"));

        let err = reg.create_whitelist(wl).unwrap_err();
        assert_eq!(err.category(), "not_found");
    }

    #[test]
    fn whitelist_rejects_partition_mismatch() {
        let reg = registry();
        let container = reg
            .register_task_type(TaskTypeDraft {
                runtime: TaskRuntime::Container {
                    image: "ubuntu:24.04".to_string(),
                    kind: ContainerKind::Docker,
                },
                ..draft("imaged")
            }, None)
            .unwrap();

        let mut wl = TaskWhitelist::new("wl", None);
        wl.add_executable(container.id.clone());

        let err = reg.create_whitelist(wl).unwrap_err();
        assert_eq!(err.category(), "invalid_definition");
    }
}
