use crate::{AggregateId, Version};

/// Filter criteria for reading events across streams.
///
/// Used by the projections and by ledger scans (e.g. finding redemption
/// entries with a pending reversal).
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Restrict to a single aggregate stream.
    pub aggregate_id: Option<AggregateId>,

    /// Restrict to one aggregate kind.
    pub aggregate_type: Option<String>,

    /// Restrict to any of these event types.
    pub event_types: Option<Vec<String>>,

    /// Minimum stream version (inclusive).
    pub from_version: Option<Version>,

    /// Maximum stream version (inclusive).
    pub to_version: Option<Version>,

    /// Maximum number of events returned.
    pub limit: Option<usize>,

    /// Number of events skipped before returning results.
    pub offset: Option<usize>,
}

impl EventQuery {
    /// An unfiltered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Query scoped to one aggregate stream.
    pub fn for_aggregate(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate_id: Some(aggregate_id),
            ..Default::default()
        }
    }

    /// Query scoped to one aggregate kind.
    pub fn for_aggregate_type(aggregate_type: impl Into<String>) -> Self {
        Self {
            aggregate_type: Some(aggregate_type.into()),
            ..Default::default()
        }
    }

    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types = Some(vec![event_type.into()]);
        self
    }

    pub fn event_types(mut self, event_types: Vec<String>) -> Self {
        self.event_types = Some(event_types);
        self
    }

    pub fn from_version(mut self, version: Version) -> Self {
        self.from_version = Some(version);
        self
    }

    pub fn to_version(mut self, version: Version) -> Self {
        self.to_version = Some(version);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}
