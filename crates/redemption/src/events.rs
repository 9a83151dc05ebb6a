//! Workflow domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{DomainEvent, Money, UserId};
use serde::{Deserialize, Serialize};

/// Events that can occur during workflow execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WorkflowEvent {
    /// Workflow execution started.
    WorkflowStarted(WorkflowStartedData),

    /// A workflow step started execution.
    StepStarted(StepData),

    /// A workflow step completed successfully.
    StepCompleted(StepCompletedData),

    /// A workflow step failed.
    StepFailed(StepFailedData),

    /// Compensation started after a step failure.
    CompensationStarted(CompensationData),

    /// A compensation step completed successfully.
    CompensationStepCompleted(StepData),

    /// A compensation step failed (fatal, surfaced to the caller).
    CompensationStepFailed(StepFailedData),

    /// Workflow completed successfully.
    WorkflowCompleted(WorkflowCompletedData),

    /// Workflow failed after compensation.
    WorkflowFailed(WorkflowFailedData),
}

impl DomainEvent for WorkflowEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WorkflowEvent::WorkflowStarted(_) => "WorkflowStarted",
            WorkflowEvent::StepStarted(_) => "StepStarted",
            WorkflowEvent::StepCompleted(_) => "StepCompleted",
            WorkflowEvent::StepFailed(_) => "StepFailed",
            WorkflowEvent::CompensationStarted(_) => "CompensationStarted",
            WorkflowEvent::CompensationStepCompleted(_) => "CompensationStepCompleted",
            WorkflowEvent::CompensationStepFailed(_) => "CompensationStepFailed",
            WorkflowEvent::WorkflowCompleted(_) => "WorkflowCompleted",
            WorkflowEvent::WorkflowFailed(_) => "WorkflowFailed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStartedData {
    pub workflow_id: AggregateId,
    pub workflow_type: String,
    pub shop_id: AggregateId,
    pub user_id: UserId,
    pub product_id: AggregateId,
    pub amount: Money,
    pub started_at: DateTime<Utc>,
}

/// Step started / compensation completed payload (just the step name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepData {
    pub step_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepCompletedData {
    pub step_name: String,
    /// Receipt id from the wallet (set after the charge_wallet step).
    pub charge_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailedData {
    pub step_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationData {
    /// The step whose failure triggered compensation.
    pub from_step: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowCompletedData {
    /// The ledger entry opened by this workflow.
    pub redeem_id: AggregateId,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowFailedData {
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

impl WorkflowEvent {
    pub fn workflow_started(
        workflow_id: AggregateId,
        workflow_type: impl Into<String>,
        shop_id: AggregateId,
        user_id: UserId,
        product_id: AggregateId,
        amount: Money,
    ) -> Self {
        WorkflowEvent::WorkflowStarted(WorkflowStartedData {
            workflow_id,
            workflow_type: workflow_type.into(),
            shop_id,
            user_id,
            product_id,
            amount,
            started_at: Utc::now(),
        })
    }

    pub fn step_started(step_name: impl Into<String>) -> Self {
        WorkflowEvent::StepStarted(StepData {
            step_name: step_name.into(),
        })
    }

    pub fn step_completed(step_name: impl Into<String>, charge_id: Option<String>) -> Self {
        WorkflowEvent::StepCompleted(StepCompletedData {
            step_name: step_name.into(),
            charge_id,
        })
    }

    pub fn step_failed(step_name: impl Into<String>, error: impl Into<String>) -> Self {
        WorkflowEvent::StepFailed(StepFailedData {
            step_name: step_name.into(),
            error: error.into(),
        })
    }

    pub fn compensation_started(from_step: impl Into<String>) -> Self {
        WorkflowEvent::CompensationStarted(CompensationData {
            from_step: from_step.into(),
        })
    }

    pub fn compensation_step_completed(step_name: impl Into<String>) -> Self {
        WorkflowEvent::CompensationStepCompleted(StepData {
            step_name: step_name.into(),
        })
    }

    pub fn compensation_step_failed(
        step_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        WorkflowEvent::CompensationStepFailed(StepFailedData {
            step_name: step_name.into(),
            error: error.into(),
        })
    }

    pub fn workflow_completed(redeem_id: AggregateId) -> Self {
        WorkflowEvent::WorkflowCompleted(WorkflowCompletedData {
            redeem_id,
            completed_at: Utc::now(),
        })
    }

    pub fn workflow_failed(reason: impl Into<String>) -> Self {
        WorkflowEvent::WorkflowFailed(WorkflowFailedData {
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }
}
