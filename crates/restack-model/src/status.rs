use serde::{Deserialize, Serialize};

/// Live stack state, derived from the provider and never persisted locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StackState {
    /// No stack with this name exists.
    Absent,
    /// A create operation is running.
    CreateInProgress,
    /// An update operation is running.
    UpdateInProgress,
    /// The last operation finished successfully.
    Complete,
    /// The last operation transitioned to a failed terminal state.
    Failed,
}

impl StackState {
    /// Returns `true` for states no automatic transition leaves.
    ///
    /// `Absent` counts as terminal for inspection purposes; a wait for an
    /// in-flight operation only ever ends in `Complete` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Absent | Self::Complete | Self::Failed)
    }
}

/// Stack state plus the provider-supplied reason text for failed states.
///
/// The reason is carried verbatim; callers surface it without rewording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackStatus {
    /// Current state.
    pub state: StackState,
    /// Provider-supplied detail, populated for failed states.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StackStatus {
    /// Status with no reason text.
    pub fn new(state: StackState) -> Self {
        Self {
            state,
            reason: None,
        }
    }

    /// Status for a stack that does not exist.
    pub fn absent() -> Self {
        Self::new(StackState::Absent)
    }

    /// Successful terminal status.
    pub fn complete() -> Self {
        Self::new(StackState::Complete)
    }

    /// Failed terminal status with the provider's reason text.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            state: StackState::Failed,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StackState, StackStatus};

    #[test]
    fn terminal_states() {
        assert!(StackState::Absent.is_terminal());
        assert!(StackState::Complete.is_terminal());
        assert!(StackState::Failed.is_terminal());
        assert!(!StackState::CreateInProgress.is_terminal());
        assert!(!StackState::UpdateInProgress.is_terminal());
    }

    #[test]
    fn failed_carries_reason_verbatim() {
        let status = StackStatus::failed("No updates are to be performed.");
        assert_eq!(status.state, StackState::Failed);
        assert_eq!(status.reason.as_deref(), Some("No updates are to be performed."));
    }

    #[test]
    fn serde_skips_absent_reason() {
        let json = serde_json::to_string(&StackStatus::complete()).unwrap();
        assert!(!json.contains("reason"));
    }
}
