//! Shared types used across the redemption backend crates.

mod types;

pub use types::AggregateId;
