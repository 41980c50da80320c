//! The admission decision: validate, authorize, then persist.

use std::time::SystemTime;

use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use tg_model::{
    InstancePage, InstanceQuery, InstanceState, QueueName, TaskArgs, TaskInstance, TypeId,
    Username, validate_instance_name,
};

use crate::{
    authorize::authorize,
    error::CoreError,
    schema::{coerce_arg_map, normalize_args},
    state::CoreState,
};

/// A proposed task instance, before admission.
#[derive(Debug, Clone)]
pub struct AdmissionRequest {
    /// Optional non-unique label for the instance.
    pub name: Option<String>,
    /// Submitting user.
    pub user: Option<Username>,
    /// Task type to instantiate.
    pub task_type: TypeId,
    /// Queue to run on.
    pub task_queue: QueueName,
    /// Raw argument payload: `null`, serialized JSON string, or object.
    pub arguments: Option<Value>,
}

/// Turns admission requests into persisted task instances.
///
/// Validation runs as a pure function over read-only snapshots; the only
/// side effect of a successful admission is the single instance insert.
/// Nothing here dispatches execution.
#[derive(Clone)]
pub struct AdmissionEngine {
    state: CoreState,
}

impl AdmissionEngine {
    pub fn new(state: CoreState) -> Self {
        Self { state }
    }

    /// Admit a proposed instance or reject it with the first failing
    /// check's reason.
    ///
    /// Order: argument payload normalization, queue/whitelist
    /// authorization, argument-schema validation with defaulting, then the
    /// persistence write.
    #[instrument(
        level = "debug",
        skip(self, request),
        fields(queue = %request.task_queue, task_type = %request.task_type)
    )]
    pub fn admit(&self, request: AdmissionRequest) -> Result<TaskInstance, CoreError> {
        if let Some(name) = &request.name {
            validate_instance_name(name)?;
        }
        let supplied = coerce_arg_map(request.arguments)?;

        let (task_type, queue, whitelists) = self
            .state
            .admission_snapshot(&request.task_type, &request.task_queue)?;

        authorize(&queue, &whitelists, &task_type, request.user.as_deref())?;

        let arguments = normalize_args(
            &task_type.required_arguments,
            &task_type.required_arguments_default_values,
            supplied,
            true,
        )?;

        let instance = TaskInstance {
            uuid: Uuid::new_v4(),
            name: request.name,
            state: InstanceState::Created,
            user: request.user,
            task_type: task_type.id,
            task_class: task_type.runtime.class(),
            task_queue: queue.name,
            arguments,
            created_at: SystemTime::now(),
            finished_at: None,
        };

        self.state.insert_instance(instance.clone());
        info!(
            uuid = %instance.uuid,
            class = instance.task_class.kind(),
            queue = %instance.task_queue,
            "task instance admitted"
        );
        Ok(instance)
    }

    /// Dry-run the admission checks without persisting anything.
    ///
    /// Defaults are not filled in; the returned mapping is the supplied
    /// payload as it would enter admission.
    pub fn preview(&self, request: AdmissionRequest) -> Result<TaskArgs, CoreError> {
        let supplied = coerce_arg_map(request.arguments)?;
        let (task_type, queue, whitelists) = self
            .state
            .admission_snapshot(&request.task_type, &request.task_queue)?;

        authorize(&queue, &whitelists, &task_type, request.user.as_deref())?;
        normalize_args(
            &task_type.required_arguments,
            &task_type.required_arguments_default_values,
            supplied,
            false,
        )
    }

    /// Build a new admission request from an existing instance and run it
    /// through the full admission checks.
    ///
    /// Copies `name`, `task_type`, `task_queue` and `arguments`; the clone
    /// gets a fresh UUID, creation time and submitting user. A
    /// configuration that has become invalid since the original admission
    /// is rejected like any other request.
    #[instrument(level = "debug", skip(self), fields(source = %uuid))]
    pub fn clone_instance(
        &self,
        uuid: &Uuid,
        user: Option<Username>,
    ) -> Result<TaskInstance, CoreError> {
        let source = self.instance(uuid)?;

        self.admit(AdmissionRequest {
            name: source.name,
            user,
            task_type: source.task_type,
            task_queue: source.task_queue,
            arguments: Some(Value::Object(source.arguments.0)),
        })
    }

    /// Rename an instance. Carries no state semantics; only the name
    /// charset is re-validated.
    pub fn rename(&self, uuid: &Uuid, name: String) -> Result<TaskInstance, CoreError> {
        validate_instance_name(&name)?;
        self.state.update_instance(uuid, |instance| {
            instance.name = Some(name);
            Ok(())
        })
    }

    /// Point lookup by UUID.
    pub fn instance(&self, uuid: &Uuid) -> Result<TaskInstance, CoreError> {
        self.state
            .instance(uuid)
            .ok_or_else(|| CoreError::NotFound(format!("No task instance with UUID {uuid} found")))
    }

    /// Query instances with filters and pagination.
    pub fn query(&self, query: &InstanceQuery) -> InstancePage<TaskInstance> {
        self.state.query(query)
    }
}
