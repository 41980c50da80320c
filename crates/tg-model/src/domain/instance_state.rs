use serde::{Deserialize, Serialize};

/// Lifecycle state of an admitted task instance.
///
/// The happy path is `created → published → running → successful`; a
/// reported failure lands in `failed`, and an honored termination request
/// lands in `terminated`. The engine records reported transitions, it never
/// verifies them against real execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstanceState {
    /// Admitted and waiting to be picked up by an executor.
    Created,
    /// Handed off to the queue transport.
    Published,
    /// Reported as executing.
    Running,
    /// Finished without error.
    Successful,
    /// Finished with an error.
    Failed,
    /// Stopped on request before finishing.
    Terminated,
}

impl InstanceState {
    /// Returns `true` if the state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InstanceState::Successful | InstanceState::Failed | InstanceState::Terminated
        )
    }

    /// Returns `true` if the instance is still in flight.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            InstanceState::Created | InstanceState::Published | InstanceState::Running
        )
    }

    /// Lowercase wire label, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceState::Created => "created",
            InstanceState::Published => "published",
            InstanceState::Running => "running",
            InstanceState::Successful => "successful",
            InstanceState::Failed => "failed",
            InstanceState::Terminated => "terminated",
        }
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(InstanceState::Successful.is_terminal());
        assert!(InstanceState::Failed.is_terminal());
        assert!(InstanceState::Terminated.is_terminal());

        assert!(!InstanceState::Created.is_terminal());
        assert!(!InstanceState::Published.is_terminal());
        assert!(!InstanceState::Running.is_terminal());
    }

    #[test]
    fn active_states() {
        assert!(InstanceState::Created.is_active());
        assert!(InstanceState::Published.is_active());
        assert!(InstanceState::Running.is_active());

        assert!(!InstanceState::Successful.is_active());
        assert!(!InstanceState::Terminated.is_active());
    }

    #[test]
    fn serde_roundtrip() {
        let state = InstanceState::Published;
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#""published""#);

        let back: InstanceState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn display_matches_wire_label() {
        assert_eq!(InstanceState::Successful.to_string(), "successful");
        assert_eq!(InstanceState::Created.to_string(), "created");
    }
}
