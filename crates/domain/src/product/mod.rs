//! Product aggregate (catalog entry) and related types.

mod aggregate;
mod events;
mod service;
mod status;

pub use aggregate::{Product, ProductUpdate};
pub use events::{
    ProductAddedData, ProductEvent, ProductRemovedData, ProductStatusChangedData,
    ProductUpdatedData, StockDecrementedData, StockIncrementedData,
};
pub use service::ProductService;
pub use status::ProductStatus;

use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// The product already exists in the catalog.
    #[error("Product already exists")]
    AlreadyExists,

    /// The product has no events or was removed from the catalog.
    #[error("Product is not in the catalog")]
    NotInCatalog,

    /// Requested more units than the catalog holds.
    #[error("Out of stock: requested {requested}, available {available}")]
    OutOfStock { requested: u32, available: u32 },

    /// Stock operations must move at least one unit.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Price must be a positive amount.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: i64 },

    /// A product needs a non-empty name.
    #[error("Product name is required")]
    NameRequired,
}
