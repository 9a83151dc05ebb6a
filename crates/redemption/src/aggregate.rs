//! Workflow instance aggregate.

use common::AggregateId;
use domain::{Aggregate, Money, UserId};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::error::RedemptionError;
use crate::events::WorkflowEvent;
use crate::state::WorkflowState;

/// An event-sourced redemption workflow instance.
///
/// Tracks the purchase intent (who buys what through which shop), the steps
/// completed so far and the wallet receipt, so an interrupted run leaves a
/// complete persisted trail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedemptionWorkflow {
    id: Option<AggregateId>,
    version: Version,
    workflow_type: String,
    shop_id: Option<AggregateId>,
    user_id: Option<UserId>,
    product_id: Option<AggregateId>,
    amount: Money,
    state: WorkflowState,
    completed_steps: Vec<String>,
    /// Receipt id from the wallet charge.
    charge_id: Option<String>,
    /// Ledger entry opened on success.
    redeem_id: Option<AggregateId>,
    failure_reason: Option<String>,
}

impl Aggregate for RedemptionWorkflow {
    type Event = WorkflowEvent;
    type Error = RedemptionError;

    fn aggregate_type() -> &'static str {
        "RedemptionWorkflow"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            WorkflowEvent::WorkflowStarted(data) => {
                self.id = Some(data.workflow_id);
                self.workflow_type = data.workflow_type;
                self.shop_id = Some(data.shop_id);
                self.user_id = Some(data.user_id);
                self.product_id = Some(data.product_id);
                self.amount = data.amount;
                self.state = WorkflowState::Running;
            }
            WorkflowEvent::StepStarted(_) => {}
            WorkflowEvent::StepCompleted(data) => {
                self.completed_steps.push(data.step_name);
                if let Some(charge_id) = data.charge_id {
                    self.charge_id = Some(charge_id);
                }
            }
            WorkflowEvent::StepFailed(data) => {
                self.failure_reason = Some(data.error);
            }
            WorkflowEvent::CompensationStarted(_) => {
                self.state = WorkflowState::Compensating;
            }
            WorkflowEvent::CompensationStepCompleted(_) => {}
            WorkflowEvent::CompensationStepFailed(_) => {}
            WorkflowEvent::WorkflowCompleted(data) => {
                self.redeem_id = Some(data.redeem_id);
                self.state = WorkflowState::Completed;
            }
            WorkflowEvent::WorkflowFailed(data) => {
                self.state = WorkflowState::Failed;
                self.failure_reason = Some(data.reason);
            }
        }
    }
}

impl RedemptionWorkflow {
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn workflow_type(&self) -> &str {
        &self.workflow_type
    }

    pub fn shop_id(&self) -> Option<AggregateId> {
        self.shop_id
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn product_id(&self) -> Option<AggregateId> {
        self.product_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn completed_steps(&self) -> &[String] {
        &self.completed_steps
    }

    pub fn charge_id(&self) -> Option<&str> {
        self.charge_id.as_deref()
    }

    pub fn redeem_id(&self) -> Option<AggregateId> {
        self.redeem_id
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }
}
