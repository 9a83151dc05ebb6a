//! Workflow state machine.

use serde::{Deserialize, Serialize};

/// The state of a redemption workflow in its lifecycle.
///
/// State transitions:
/// ```text
/// NotStarted ──► Running ──┬──► Completed
///                          └──► Compensating ──► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WorkflowState {
    /// Workflow has not started yet.
    #[default]
    NotStarted,

    /// Workflow steps are being executed.
    Running,

    /// A step failed and compensating transactions are in progress.
    Compensating,

    /// All steps completed successfully (terminal state).
    Completed,

    /// Compensation finished after a failure (terminal state).
    Failed,
}

impl WorkflowState {
    /// Returns true if the workflow can begin running.
    pub fn can_run(&self) -> bool {
        matches!(self, WorkflowState::NotStarted)
    }

    /// Returns true if the workflow can begin compensation.
    pub fn can_compensate(&self) -> bool {
        matches!(self, WorkflowState::Running)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Completed | WorkflowState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::NotStarted => "NotStarted",
            WorkflowState::Running => "Running",
            WorkflowState::Compensating => "Compensating",
            WorkflowState::Completed => "Completed",
            WorkflowState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
