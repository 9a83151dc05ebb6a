//! Event sink trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::AggregateId;
use domain::UserId;
use serde::{Deserialize, Serialize};

use crate::error::RedemptionError;

/// Notification emitted after a redemption is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionCreated {
    pub redeem_id: AggregateId,
    pub user_id: UserId,
    pub shop_id: AggregateId,
    pub product_id: AggregateId,
}

/// Trait for publishing redemption notifications.
///
/// The orchestrator treats publishing as fire-and-forget: a sink failure is
/// logged but never fails the redemption.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: RedemptionCreated) -> Result<(), RedemptionError>;
}

#[derive(Debug, Default)]
struct InMemoryEventSinkState {
    published: Vec<RedemptionCreated>,
    fail_on_publish: bool,
}

/// In-memory event sink for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSink {
    state: Arc<RwLock<InMemoryEventSinkState>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the sink to fail the next publish calls.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().unwrap().fail_on_publish = fail;
    }

    /// Number of notifications published so far.
    pub fn published_count(&self) -> usize {
        self.state.read().unwrap().published.len()
    }

    /// Copy of the notifications published so far.
    pub fn published(&self) -> Vec<RedemptionCreated> {
        self.state.read().unwrap().published.clone()
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn publish(&self, event: RedemptionCreated) -> Result<(), RedemptionError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_publish {
            return Err(RedemptionError::Sink(
                "event sink unavailable".to_string(),
            ));
        }

        state.published.push(event);
        Ok(())
    }
}
