//! Domain layer for the redemption backend.
//!
//! Provides the core event-sourcing abstractions plus the three aggregates
//! the system is built around:
//! - `Product`: the catalog entry with price, stock and an explicit status
//! - `ShopListing`: exposes a single product for redemption
//! - `RedeemEntry`: the ledger entry tracking a redemption's approval lifecycle

pub mod aggregate;
pub mod command;
pub mod error;
pub mod product;
pub mod redeem;
pub mod shop;
pub mod value_objects;

pub use aggregate::{Aggregate, DomainEvent, SnapshotCapable};
pub use command::{CommandHandler, CommandResult};
pub use error::DomainError;
pub use product::{
    Product, ProductError, ProductEvent, ProductService, ProductStatus, ProductUpdate,
};
pub use redeem::{RedeemEntry, RedeemError, RedeemEvent, RedeemService, RedeemStatus};
pub use shop::{ShopError, ShopEvent, ShopListing, ShopService};
pub use value_objects::{Money, UserId};
