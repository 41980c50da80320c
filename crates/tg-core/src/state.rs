//! Shared in-memory store backing the engine.
//!
//! One record per task type, queue, whitelist and instance, behind a single
//! `RwLock`. Admission and lifecycle operations are short-lived: reads take
//! snapshots, writes hold the lock for one record mutation. This stands in
//! for the external persistence collaborator, which only needs atomic
//! per-record writes and point lookups.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use uuid::Uuid;

use tg_model::{
    InstancePage, InstanceQuery, QueueName, TaskInstance, TaskQueue, TaskType, TaskWhitelist,
    TypeId, Username,
};

use crate::error::CoreError;

/// Shared engine state. Cheap to clone; all clones observe the same store.
#[derive(Clone)]
pub struct CoreState {
    inner: Arc<RwLock<CoreStateInner>>,
}

struct CoreStateInner {
    /// Task types indexed by registry id.
    task_types: HashMap<TypeId, TaskType>,
    /// Index: (owner, name) -> id, backing the per-owner uniqueness
    /// invariant.
    types_by_identity: HashMap<(Option<Username>, String), TypeId>,
    /// Queues indexed by their globally unique name.
    queues: HashMap<QueueName, TaskQueue>,
    /// Whitelists indexed by name.
    whitelists: HashMap<String, TaskWhitelist>,
    /// Instances indexed by UUID.
    instances: HashMap<Uuid, TaskInstance>,
    /// Index: queue name -> instances admitted to it.
    by_queue: HashMap<QueueName, Vec<Uuid>>,
}

impl CoreState {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(CoreStateInner {
                task_types: HashMap::new(),
                types_by_identity: HashMap::new(),
                queues: HashMap::new(),
                whitelists: HashMap::new(),
                instances: HashMap::new(),
                by_queue: HashMap::new(),
            })),
        }
    }

    // ------------------------------------------------------------------
    // Task types
    // ------------------------------------------------------------------

    /// Insert a new task type, enforcing `(name, owner)` uniqueness.
    pub fn insert_task_type(&self, task_type: TaskType) -> Result<(), CoreError> {
        let mut inner = self.inner.write().unwrap();

        let identity = (task_type.owner.clone(), task_type.name.clone());
        if inner.types_by_identity.contains_key(&identity) {
            return Err(CoreError::InvalidDefinition(format!(
                "a task type named {} already exists for this owner",
                task_type.name
            )));
        }

        inner.types_by_identity.insert(identity, task_type.id.clone());
        inner.task_types.insert(task_type.id.clone(), task_type);
        Ok(())
    }

    /// Replace an existing task type, keeping its id but allowing a
    /// non-colliding rename.
    pub fn replace_task_type(&self, task_type: TaskType) -> Result<(), CoreError> {
        let mut inner = self.inner.write().unwrap();

        let previous = inner
            .task_types
            .get(&task_type.id)
            .ok_or_else(|| {
                CoreError::NotFound(format!("No task type with ID {} found", task_type.id))
            })?
            .clone();

        let identity = (task_type.owner.clone(), task_type.name.clone());
        if let Some(existing) = inner.types_by_identity.get(&identity)
            && *existing != task_type.id
        {
            return Err(CoreError::InvalidDefinition(format!(
                "a task type named {} already exists for this owner",
                task_type.name
            )));
        }

        inner
            .types_by_identity
            .remove(&(previous.owner, previous.name));
        inner.types_by_identity.insert(identity, task_type.id.clone());
        inner.task_types.insert(task_type.id.clone(), task_type);
        Ok(())
    }

    /// Get a task type snapshot by id.
    pub fn task_type(&self, id: &TypeId) -> Option<TaskType> {
        let inner = self.inner.read().unwrap();
        inner.task_types.get(id).cloned()
    }

    /// Point lookup by the `(owner, name)` identity.
    pub fn find_task_type(&self, owner: Option<&str>, name: &str) -> Option<TaskType> {
        let inner = self.inner.read().unwrap();
        let identity = (owner.map(String::from), name.to_string());
        let id = inner.types_by_identity.get(&identity)?;
        inner.task_types.get(id).cloned()
    }

    pub fn list_task_types(&self) -> Vec<TaskType> {
        let inner = self.inner.read().unwrap();
        inner.task_types.values().cloned().collect()
    }

    // ------------------------------------------------------------------
    // Queues and whitelists
    // ------------------------------------------------------------------

    /// Insert a new queue, enforcing global name uniqueness.
    pub fn insert_queue(&self, queue: TaskQueue) -> Result<(), CoreError> {
        let mut inner = self.inner.write().unwrap();

        if inner.queues.contains_key(&queue.name) {
            return Err(CoreError::InvalidDefinition(format!(
                "a task queue named {} already exists",
                queue.name
            )));
        }

        inner.queues.insert(queue.name.clone(), queue);
        Ok(())
    }

    /// Replace an existing queue record (administrative flag changes,
    /// whitelist attachment).
    pub fn replace_queue(&self, queue: TaskQueue) -> Result<(), CoreError> {
        let mut inner = self.inner.write().unwrap();

        if !inner.queues.contains_key(&queue.name) {
            return Err(CoreError::NotFound(format!(
                "No task queue named {} found",
                queue.name
            )));
        }

        inner.queues.insert(queue.name.clone(), queue);
        Ok(())
    }

    pub fn queue(&self, name: &str) -> Option<TaskQueue> {
        let inner = self.inner.read().unwrap();
        inner.queues.get(name).cloned()
    }

    pub fn list_queues(&self) -> Vec<TaskQueue> {
        let inner = self.inner.read().unwrap();
        inner.queues.values().cloned().collect()
    }

    /// Insert a new whitelist, enforcing name uniqueness.
    pub fn insert_whitelist(&self, whitelist: TaskWhitelist) -> Result<(), CoreError> {
        let mut inner = self.inner.write().unwrap();

        if inner.whitelists.contains_key(&whitelist.name) {
            return Err(CoreError::InvalidDefinition(format!(
                "a task whitelist named {} already exists",
                whitelist.name
            )));
        }

        inner.whitelists.insert(whitelist.name.clone(), whitelist);
        Ok(())
    }

    /// Replace an existing whitelist record.
    pub fn replace_whitelist(&self, whitelist: TaskWhitelist) -> Result<(), CoreError> {
        let mut inner = self.inner.write().unwrap();

        if !inner.whitelists.contains_key(&whitelist.name) {
            return Err(CoreError::NotFound(format!(
                "No task whitelist named {} found",
                whitelist.name
            )));
        }

        inner.whitelists.insert(whitelist.name.clone(), whitelist);
        Ok(())
    }

    pub fn whitelist(&self, name: &str) -> Option<TaskWhitelist> {
        let inner = self.inner.read().unwrap();
        inner.whitelists.get(name).cloned()
    }

    pub fn list_whitelists(&self) -> Vec<TaskWhitelist> {
        let inner = self.inner.read().unwrap();
        inner.whitelists.values().cloned().collect()
    }

    /// Snapshot everything one admission decision needs, under a single
    /// read lock: the task type, the queue, and the whitelists attached to
    /// the queue (dangling attachment names are skipped).
    pub fn admission_snapshot(
        &self,
        type_id: &TypeId,
        queue_name: &str,
    ) -> Result<(TaskType, TaskQueue, Vec<TaskWhitelist>), CoreError> {
        let inner = self.inner.read().unwrap();

        let task_type = inner
            .task_types
            .get(type_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("No task type with ID {type_id} found")))?;
        let queue = inner
            .queues
            .get(queue_name)
            .cloned()
            .ok_or_else(|| {
                CoreError::NotFound(format!("No task queue named {queue_name} found"))
            })?;
        let whitelists = queue
            .whitelists
            .iter()
            .filter_map(|name| inner.whitelists.get(name).cloned())
            .collect();

        Ok((task_type, queue, whitelists))
    }

    // ------------------------------------------------------------------
    // Instances
    // ------------------------------------------------------------------

    /// Persist an admitted instance. The single write of an admission.
    pub fn insert_instance(&self, instance: TaskInstance) {
        let mut inner = self.inner.write().unwrap();

        inner
            .by_queue
            .entry(instance.task_queue.clone())
            .or_default()
            .push(instance.uuid);
        inner.instances.insert(instance.uuid, instance);
    }

    /// Get an instance snapshot by UUID.
    pub fn instance(&self, uuid: &Uuid) -> Option<TaskInstance> {
        let inner = self.inner.read().unwrap();
        inner.instances.get(uuid).cloned()
    }

    /// Apply an atomic mutation to one instance and return the updated
    /// snapshot. The closure runs under the write lock, so concurrent
    /// updates serialize and the last applied one wins.
    pub fn update_instance<F>(&self, uuid: &Uuid, f: F) -> Result<TaskInstance, CoreError>
    where
        F: FnOnce(&mut TaskInstance) -> Result<(), CoreError>,
    {
        let mut inner = self.inner.write().unwrap();

        let instance = inner.instances.get_mut(uuid).ok_or_else(|| {
            CoreError::NotFound(format!("No task instance with UUID {uuid} found"))
        })?;
        f(instance)?;
        Ok(instance.clone())
    }

    /// Query instances with combined filters and pagination.
    ///
    /// Filters are applied inside a single read lock. When `queue` is
    /// specified, the `by_queue` index narrows the scan. `total` in the
    /// result reflects the count *after* filtering, *before* pagination.
    pub fn query(&self, q: &InstanceQuery) -> InstancePage<TaskInstance> {
        let inner = self.inner.read().unwrap();

        let iter: Box<dyn Iterator<Item = &TaskInstance>> = match &q.queue {
            Some(queue) => match inner.by_queue.get(queue.as_str()) {
                Some(uuids) => Box::new(uuids.iter().filter_map(|u| inner.instances.get(u))),
                None => {
                    return InstancePage {
                        items: vec![],
                        total: 0,
                    };
                }
            },
            None => Box::new(inner.instances.values()),
        };

        let iter: Box<dyn Iterator<Item = &TaskInstance>> = match &q.state {
            Some(state) => {
                let state = *state;
                Box::new(iter.filter(move |i| i.state == state))
            }
            None => iter,
        };

        let iter: Box<dyn Iterator<Item = &TaskInstance>> = match &q.user {
            Some(user) => Box::new(iter.filter(move |i| i.user.as_deref() == Some(user.as_str()))),
            None => iter,
        };

        let iter: Box<dyn Iterator<Item = &TaskInstance>> = match &q.task_type {
            Some(id) => Box::new(iter.filter(move |i| i.task_type == *id)),
            None => iter,
        };

        // Collect refs that pass all filters first: total must be known
        // before pagination, and collecting references avoids cloning the
        // filtered-out remainder.
        let filtered: Vec<&TaskInstance> = iter.collect();
        let total = filtered.len();

        let items = filtered
            .into_iter()
            .skip(q.offset)
            .take(q.limit)
            .cloned()
            .collect();

        InstancePage { items, total }
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}
