use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tg_core::AdmissionRequest;
use tg_model::{
    InstanceQuery, InstanceState, QueueName, TaskInstance, TaskQueue, TaskTypeDraft,
    TaskWhitelist, TypeId, Username,
};

use crate::{error::ApiError, handler::ApiHandler};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    /// Create new HTTP API with the given handler.
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - POST/GET /api/v1/task-types, GET /api/v1/task-types/{id}
    /// - POST/GET /api/v1/queues, GET/PUT /api/v1/queues/{name}
    /// - POST/GET /api/v1/whitelists, GET/PUT /api/v1/whitelists/{name}
    /// - POST/GET /api/v1/instances, GET /api/v1/instances/{uuid}
    /// - POST /api/v1/instances/{uuid}/clone | /rename | /terminate
    /// - PATCH /api/v1/instances/{uuid}/state
    pub fn router(self) -> Router {
        Router::new()
            .route(
                "/api/v1/task-types",
                post(register_task_type::<H>).get(list_task_types::<H>),
            )
            .route("/api/v1/task-types/{id}", get(get_task_type::<H>))
            .route("/api/v1/queues", post(create_queue::<H>).get(list_queues::<H>))
            .route(
                "/api/v1/queues/{name}",
                get(get_queue::<H>).put(update_queue::<H>),
            )
            .route(
                "/api/v1/whitelists",
                post(create_whitelist::<H>).get(list_whitelists::<H>),
            )
            .route(
                "/api/v1/whitelists/{name}",
                get(get_whitelist::<H>).put(update_whitelist::<H>),
            )
            .route(
                "/api/v1/instances",
                post(submit_instance::<H>).get(query_instances::<H>),
            )
            .route("/api/v1/instances/{uuid}", get(get_instance::<H>))
            .route("/api/v1/instances/{uuid}/clone", post(clone_instance::<H>))
            .route("/api/v1/instances/{uuid}/rename", post(rename_instance::<H>))
            .route(
                "/api/v1/instances/{uuid}/terminate",
                post(terminate_instance::<H>),
            )
            .route(
                "/api/v1/instances/{uuid}/state",
                patch(update_instance_state::<H>),
            )
            .with_state(self.handler)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterTaskTypeRequest {
    /// Authenticated user registering the type.
    #[serde(default)]
    user: Option<Username>,
    #[serde(flatten)]
    spec: TaskTypeDraft,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitInstanceRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    user: Option<Username>,
    task_type: TypeId,
    task_queue: QueueName,
    #[serde(default)]
    arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CloneInstanceRequest {
    #[serde(default)]
    user: Option<Username>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RenameInstanceRequest {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateUpdateRequest {
    state: InstanceState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceQueryParams {
    queue: Option<QueueName>,
    state: Option<InstanceState>,
    user: Option<Username>,
    task_type: Option<TypeId>,
    limit: Option<usize>,
    offset: Option<usize>,
}

#[derive(Debug, Serialize)]
struct InstancePageResponse {
    items: Vec<TaskInstance>,
    total: usize,
}

impl From<InstanceQueryParams> for InstanceQuery {
    fn from(p: InstanceQueryParams) -> Self {
        let mut q = InstanceQuery::new();
        q.queue = p.queue;
        q.state = p.state;
        q.user = p.user;
        q.task_type = p.task_type;
        if let Some(limit) = p.limit {
            q = q.with_limit(limit);
        }
        q.offset = p.offset.unwrap_or(0);
        q
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::InvalidRequest(format!("'{raw}' is not a valid UUID")))
}

// ============================================================================
// Task type handlers
// ============================================================================

/// POST /api/v1/task-types
async fn register_task_type<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<RegisterTaskTypeRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let task_type = handler.register_task_type(req.spec, req.user).await?;
    Ok((StatusCode::CREATED, Json(task_type)))
}

/// GET /api/v1/task-types
async fn list_task_types<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.list_task_types().await?))
}

/// GET /api/v1/task-types/:id
async fn get_task_type<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.get_task_type(&TypeId::from(id)).await?))
}

// ============================================================================
// Queue handlers
// ============================================================================

/// POST /api/v1/queues
async fn create_queue<H>(
    State(handler): State<Arc<H>>,
    Json(queue): Json<TaskQueue>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok((StatusCode::CREATED, Json(handler.create_queue(queue).await?)))
}

/// GET /api/v1/queues
async fn list_queues<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.list_queues().await?))
}

/// GET /api/v1/queues/:name
async fn get_queue<H>(
    State(handler): State<Arc<H>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.get_queue(&name).await?))
}

/// PUT /api/v1/queues/:name
async fn update_queue<H>(
    State(handler): State<Arc<H>>,
    Path(name): Path<String>,
    Json(mut queue): Json<TaskQueue>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    // The path names the record; the body may omit it.
    queue.name = name;
    Ok(Json(handler.update_queue(queue).await?))
}

// ============================================================================
// Whitelist handlers
// ============================================================================

/// POST /api/v1/whitelists
async fn create_whitelist<H>(
    State(handler): State<Arc<H>>,
    Json(whitelist): Json<TaskWhitelist>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok((
        StatusCode::CREATED,
        Json(handler.create_whitelist(whitelist).await?),
    ))
}

/// GET /api/v1/whitelists
async fn list_whitelists<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.list_whitelists().await?))
}

/// GET /api/v1/whitelists/:name
async fn get_whitelist<H>(
    State(handler): State<Arc<H>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.get_whitelist(&name).await?))
}

/// PUT /api/v1/whitelists/:name
async fn update_whitelist<H>(
    State(handler): State<Arc<H>>,
    Path(name): Path<String>,
    Json(mut whitelist): Json<TaskWhitelist>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    whitelist.name = name;
    Ok(Json(handler.update_whitelist(whitelist).await?))
}

// ============================================================================
// Instance handlers
// ============================================================================

/// POST /api/v1/instances
async fn submit_instance<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<SubmitInstanceRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let request = AdmissionRequest {
        name: req.name,
        user: req.user,
        task_type: req.task_type,
        task_queue: req.task_queue,
        arguments: req.arguments,
    };
    let instance = handler.submit_instance(request).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// GET /api/v1/instances
async fn query_instances<H>(
    State(handler): State<Arc<H>>,
    Query(params): Query<InstanceQueryParams>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let page = handler.query_instances(params.into()).await?;
    Ok(Json(InstancePageResponse {
        items: page.items,
        total: page.total,
    }))
}

/// GET /api/v1/instances/:uuid
async fn get_instance<H>(
    State(handler): State<Arc<H>>,
    Path(uuid): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let uuid = parse_uuid(&uuid)?;
    Ok(Json(handler.get_instance(&uuid).await?))
}

/// POST /api/v1/instances/:uuid/clone
async fn clone_instance<H>(
    State(handler): State<Arc<H>>,
    Path(uuid): Path<String>,
    Json(req): Json<CloneInstanceRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let uuid = parse_uuid(&uuid)?;
    let instance = handler.clone_instance(&uuid, req.user).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// POST /api/v1/instances/:uuid/rename
async fn rename_instance<H>(
    State(handler): State<Arc<H>>,
    Path(uuid): Path<String>,
    Json(req): Json<RenameInstanceRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let uuid = parse_uuid(&uuid)?;
    Ok(Json(handler.rename_instance(&uuid, req.name).await?))
}

/// POST /api/v1/instances/:uuid/terminate
async fn terminate_instance<H>(
    State(handler): State<Arc<H>>,
    Path(uuid): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let uuid = parse_uuid(&uuid)?;
    let instance = handler.terminate_instance(&uuid).await?;
    // Accepted: the executor honors the signal asynchronously.
    Ok((StatusCode::ACCEPTED, Json(instance)))
}

/// PATCH /api/v1/instances/:uuid/state
async fn update_instance_state<H>(
    State(handler): State<Arc<H>>,
    Path(uuid): Path<String>,
    Json(req): Json<StateUpdateRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let uuid = parse_uuid(&uuid)?;
    Ok(Json(handler.update_instance_state(&uuid, req.state).await?))
}
