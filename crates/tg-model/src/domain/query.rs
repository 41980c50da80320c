use crate::{InstanceState, QueueName, TypeId, Username};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

/// Query parameters for listing task instances with filtering and
/// pagination.
#[derive(Debug, Clone, Default)]
pub struct InstanceQuery {
    pub queue: Option<QueueName>,
    pub state: Option<InstanceState>,
    pub user: Option<Username>,
    pub task_type: Option<TypeId>,
    pub limit: usize,
    pub offset: usize,
}

/// Result of a paginated instance query.
#[derive(Debug, Clone)]
pub struct InstancePage<T> {
    pub items: Vec<T>,
    /// Count after filtering, before pagination.
    pub total: usize,
}

impl InstanceQuery {
    pub fn new() -> Self {
        Self {
            queue: None,
            state: None,
            user: None,
            task_type: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    pub fn with_queue(mut self, queue: impl Into<QueueName>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    pub fn with_state(mut self, state: InstanceState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_user(mut self, user: impl Into<Username>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_task_type(mut self, id: TypeId) -> Self {
        self.task_type = Some(id);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_LIMIT);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_filters() {
        let q = InstanceQuery::new()
            .with_queue("default")
            .with_state(InstanceState::Running)
            .with_user("ada")
            .with_offset(10);

        assert_eq!(q.queue.as_deref(), Some("default"));
        assert_eq!(q.state, Some(InstanceState::Running));
        assert_eq!(q.user.as_deref(), Some("ada"));
        assert_eq!(q.limit, DEFAULT_LIMIT);
        assert_eq!(q.offset, 10);
    }

    #[test]
    fn limit_is_capped() {
        let q = InstanceQuery::new().with_limit(10_000);
        assert_eq!(q.limit, MAX_LIMIT);
    }
}
