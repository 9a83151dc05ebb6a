//! Shop listing aggregate and related types.

mod aggregate;
mod events;
mod service;

pub use aggregate::ShopListing;
pub use events::{ShopDelistedData, ShopEvent, ShopListedData};
pub use service::ShopService;

use thiserror::Error;

/// Errors that can occur during shop listing operations.
#[derive(Debug, Error)]
pub enum ShopError {
    /// The listing already exists.
    #[error("Shop listing already exists")]
    AlreadyListed,

    /// The listing does not exist or was delisted.
    #[error("Shop listing is not active")]
    NotListed,
}
