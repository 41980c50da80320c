mod arguments;
pub use arguments::{ArgsError, TaskArgs};

mod env_vars;
pub use env_vars::{EnvVars, JOB_UUID_VAR};

mod instance;
pub use instance::TaskInstance;

mod instance_state;
pub use instance_state::InstanceState;

mod query;
pub use query::{InstancePage, InstanceQuery};

mod queue;
pub use queue::TaskQueue;

mod task_class;
pub use task_class::{ContainerKind, TaskClass};

mod task_type;
pub use task_type::{TaskRuntime, TaskType, TaskTypeDraft, TypeId};

mod whitelist;
pub use whitelist::TaskWhitelist;

pub(crate) mod ts;

/// Account name of the user owning or submitting a record.
///
/// Records keep an `Option<Username>` so they survive deletion of their
/// creator.
pub type Username = String;

/// Unique name of a task queue.
pub type QueueName = String;
