//! Append-only event persistence.
//!
//! Every aggregate in the system (products, shop listings, redemption entries
//! and redemption workflows) is stored as an ordered stream of [`EventRecord`]s.
//! Appends carry an optional expected version; a mismatch fails with
//! [`EventStoreError::ConcurrencyConflict`], which is what serializes
//! concurrent operations on the same aggregate.

pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod snapshot;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventId, EventRecord, Version};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use query::EventQuery;
pub use snapshot::Snapshot;
pub use store::{AppendOptions, EventStore, EventStoreExt, EventStream};
