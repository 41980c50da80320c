use async_trait::async_trait;
use uuid::Uuid;

use tg_core::{AdmissionEngine, AdmissionRequest, CoreState, Registry, TerminationBus, lifecycle};
use tg_model::{
    InstancePage, InstanceQuery, InstanceState, TaskInstance, TaskQueue, TaskType, TaskTypeDraft,
    TaskWhitelist, TypeId, Username,
};

use crate::error::ApiError;
use crate::handler::ApiHandler;

/// Ready-to-use [`ApiHandler`] that delegates directly to the engine.
pub struct EngineAdapter {
    state: CoreState,
    registry: Registry,
    engine: AdmissionEngine,
    terminations: TerminationBus,
}

impl EngineAdapter {
    /// Wire an adapter over shared state and a termination bus.
    pub fn new(state: CoreState, terminations: TerminationBus) -> Self {
        Self {
            registry: Registry::new(state.clone()),
            engine: AdmissionEngine::new(state.clone()),
            state,
            terminations,
        }
    }
}

#[async_trait]
impl ApiHandler for EngineAdapter {
    async fn register_task_type(
        &self,
        draft: TaskTypeDraft,
        owner: Option<Username>,
    ) -> Result<TaskType, ApiError> {
        self.registry
            .register_task_type(draft, owner)
            .map_err(ApiError::from)
    }

    async fn get_task_type(&self, id: &TypeId) -> Result<TaskType, ApiError> {
        self.registry.task_type(id).map_err(ApiError::from)
    }

    async fn list_task_types(&self) -> Result<Vec<TaskType>, ApiError> {
        Ok(self.registry.list_task_types())
    }

    async fn create_queue(&self, queue: TaskQueue) -> Result<TaskQueue, ApiError> {
        self.registry.create_queue(queue).map_err(ApiError::from)
    }

    async fn update_queue(&self, queue: TaskQueue) -> Result<TaskQueue, ApiError> {
        self.registry.update_queue(queue).map_err(ApiError::from)
    }

    async fn get_queue(&self, name: &str) -> Result<TaskQueue, ApiError> {
        self.registry.queue(name).map_err(ApiError::from)
    }

    async fn list_queues(&self) -> Result<Vec<TaskQueue>, ApiError> {
        Ok(self.registry.list_queues())
    }

    async fn create_whitelist(&self, whitelist: TaskWhitelist) -> Result<TaskWhitelist, ApiError> {
        self.registry
            .create_whitelist(whitelist)
            .map_err(ApiError::from)
    }

    async fn update_whitelist(&self, whitelist: TaskWhitelist) -> Result<TaskWhitelist, ApiError> {
        self.registry
            .update_whitelist(whitelist)
            .map_err(ApiError::from)
    }

    async fn get_whitelist(&self, name: &str) -> Result<TaskWhitelist, ApiError> {
        self.registry.whitelist(name).map_err(ApiError::from)
    }

    async fn list_whitelists(&self) -> Result<Vec<TaskWhitelist>, ApiError> {
        Ok(self.registry.list_whitelists())
    }

    async fn submit_instance(&self, request: AdmissionRequest) -> Result<TaskInstance, ApiError> {
        self.engine.admit(request).map_err(ApiError::from)
    }

    async fn get_instance(&self, uuid: &Uuid) -> Result<TaskInstance, ApiError> {
        self.engine.instance(uuid).map_err(ApiError::from)
    }

    async fn query_instances(
        &self,
        query: InstanceQuery,
    ) -> Result<InstancePage<TaskInstance>, ApiError> {
        Ok(self.engine.query(&query))
    }

    async fn clone_instance(
        &self,
        uuid: &Uuid,
        user: Option<Username>,
    ) -> Result<TaskInstance, ApiError> {
        self.engine.clone_instance(uuid, user).map_err(ApiError::from)
    }

    async fn rename_instance(&self, uuid: &Uuid, name: String) -> Result<TaskInstance, ApiError> {
        self.engine.rename(uuid, name).map_err(ApiError::from)
    }

    async fn update_instance_state(
        &self,
        uuid: &Uuid,
        state: InstanceState,
    ) -> Result<TaskInstance, ApiError> {
        lifecycle::transition(&self.state, uuid, state).map_err(ApiError::from)
    }

    /// Signal the executor and echo the instance back; the state changes
    /// only when the executor reports the terminal transition.
    async fn terminate_instance(&self, uuid: &Uuid) -> Result<TaskInstance, ApiError> {
        let instance = self.engine.instance(uuid)?;
        self.terminations.request(instance.uuid);
        Ok(instance)
    }
}
