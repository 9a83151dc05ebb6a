//! Catalog service wrapping the product command handler.

use common::AggregateId;
use event_store::EventStore;

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;
use crate::value_objects::Money;

use super::{Product, ProductStatus, ProductUpdate};

impl From<super::ProductError> for DomainError {
    fn from(e: super::ProductError) -> Self {
        DomainError::Product(e)
    }
}

/// High-level catalog operations.
pub struct ProductService<S: EventStore> {
    handler: CommandHandler<S, Product>,
}

impl<S: EventStore> ProductService<S> {
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    pub fn handler(&self) -> &CommandHandler<S, Product> {
        &self.handler
    }

    /// Adds a product to the catalog.
    #[tracing::instrument(skip(self, name, description))]
    pub async fn add_product(
        &self,
        product_id: AggregateId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        stock: u32,
        status: ProductStatus,
    ) -> Result<CommandResult<Product>, DomainError> {
        let name = name.into();
        let description = description.into();

        self.handler
            .execute(product_id, |product| {
                product.add(product_id, name, description, price, stock, status)
            })
            .await
    }

    /// Applies a partial edit to a product.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_product(
        &self,
        product_id: AggregateId,
        update: ProductUpdate,
    ) -> Result<CommandResult<Product>, DomainError> {
        self.handler
            .execute(product_id, |product| product.update(update))
            .await
    }

    /// Reserves stock for a redemption.
    #[tracing::instrument(skip(self))]
    pub async fn decrement_stock(
        &self,
        product_id: AggregateId,
        quantity: u32,
    ) -> Result<CommandResult<Product>, DomainError> {
        self.handler
            .execute_with_snapshot(product_id, |product| product.decrement_stock(quantity))
            .await
    }

    /// Returns stock after a cancellation or compensation.
    #[tracing::instrument(skip(self))]
    pub async fn increment_stock(
        &self,
        product_id: AggregateId,
        quantity: u32,
    ) -> Result<CommandResult<Product>, DomainError> {
        self.handler
            .execute_with_snapshot(product_id, |product| product.increment_stock(quantity))
            .await
    }

    /// Flips the availability flag.
    #[tracing::instrument(skip(self))]
    pub async fn set_status(
        &self,
        product_id: AggregateId,
        status: ProductStatus,
    ) -> Result<CommandResult<Product>, DomainError> {
        self.handler
            .execute(product_id, |product| product.set_status(status))
            .await
    }

    /// Removes a product from the catalog.
    ///
    /// The listing check lives in the orchestration layer; see
    /// `ShopService::is_product_listed`.
    #[tracing::instrument(skip(self))]
    pub async fn remove_product(
        &self,
        product_id: AggregateId,
    ) -> Result<CommandResult<Product>, DomainError> {
        self.handler
            .execute(product_id, |product| product.remove())
            .await
    }

    /// Loads a product, or `None` when it has never existed.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(
        &self,
        product_id: AggregateId,
    ) -> Result<Option<Product>, DomainError> {
        self.handler.load_existing(product_id).await
    }
}
