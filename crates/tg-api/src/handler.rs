use async_trait::async_trait;
use uuid::Uuid;

use tg_core::AdmissionRequest;
use tg_model::{
    InstancePage, InstanceQuery, InstanceState, TaskInstance, TaskQueue, TaskType, TaskTypeDraft,
    TaskWhitelist, TypeId, Username,
};

use crate::error::ApiError;

/// Backend seam for the submission surface.
///
/// The provided [`EngineAdapter`](crate::EngineAdapter) delegates straight
/// to the engine; custom handlers can wrap it with additional logic
/// (authentication, rate limiting, auditing).
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    // Task types
    async fn register_task_type(
        &self,
        draft: TaskTypeDraft,
        owner: Option<Username>,
    ) -> Result<TaskType, ApiError>;
    async fn get_task_type(&self, id: &TypeId) -> Result<TaskType, ApiError>;
    async fn list_task_types(&self) -> Result<Vec<TaskType>, ApiError>;

    // Queues
    async fn create_queue(&self, queue: TaskQueue) -> Result<TaskQueue, ApiError>;
    async fn update_queue(&self, queue: TaskQueue) -> Result<TaskQueue, ApiError>;
    async fn get_queue(&self, name: &str) -> Result<TaskQueue, ApiError>;
    async fn list_queues(&self) -> Result<Vec<TaskQueue>, ApiError>;

    // Whitelists
    async fn create_whitelist(&self, whitelist: TaskWhitelist) -> Result<TaskWhitelist, ApiError>;
    async fn update_whitelist(&self, whitelist: TaskWhitelist) -> Result<TaskWhitelist, ApiError>;
    async fn get_whitelist(&self, name: &str) -> Result<TaskWhitelist, ApiError>;
    async fn list_whitelists(&self) -> Result<Vec<TaskWhitelist>, ApiError>;

    // Instances
    async fn submit_instance(&self, request: AdmissionRequest) -> Result<TaskInstance, ApiError>;
    async fn get_instance(&self, uuid: &Uuid) -> Result<TaskInstance, ApiError>;
    async fn query_instances(
        &self,
        query: InstanceQuery,
    ) -> Result<InstancePage<TaskInstance>, ApiError>;
    async fn clone_instance(
        &self,
        uuid: &Uuid,
        user: Option<Username>,
    ) -> Result<TaskInstance, ApiError>;
    async fn rename_instance(&self, uuid: &Uuid, name: String) -> Result<TaskInstance, ApiError>;
    async fn update_instance_state(
        &self,
        uuid: &Uuid,
        state: InstanceState,
    ) -> Result<TaskInstance, ApiError>;
    async fn terminate_instance(&self, uuid: &Uuid) -> Result<TaskInstance, ApiError>;
}
