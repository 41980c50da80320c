//! The instance state machine.
//!
//! Transitions are reported by an external executor (or an administrative
//! override); the engine records them without verifying real execution
//! status. The only rules it enforces: a terminal instance accepts no
//! further transitions, and `finished_at` is written exactly once.

use std::time::SystemTime;

use tracing::{info, instrument};
use uuid::Uuid;

use tg_model::{InstanceState, TaskInstance};

use crate::{error::CoreError, state::CoreState};

/// Apply a reported state transition to an instance.
///
/// The whole check-and-mutate runs under the store's write lock, so
/// concurrent requests serialize: the last applied transition wins, and a
/// request arriving after a terminal state is rejected rather than
/// silently accepted.
#[instrument(level = "debug", skip(state), fields(uuid = %uuid, to = %to))]
pub fn transition(
    state: &CoreState,
    uuid: &Uuid,
    to: InstanceState,
) -> Result<TaskInstance, CoreError> {
    let updated = state.update_instance(uuid, |instance| {
        if instance.state.is_terminal() {
            return Err(CoreError::InvalidTransition(format!(
                "Task instance {} is already {} and cannot transition to {}",
                instance.uuid, instance.state, to
            )));
        }

        instance.state = to;
        if to.is_terminal() && instance.finished_at.is_none() {
            instance.finished_at = Some(SystemTime::now());
        }
        Ok(())
    })?;

    info!(uuid = %updated.uuid, state = %updated.state, "task instance transitioned");
    Ok(updated)
}
