//! Shop listing service.

use common::AggregateId;
use event_store::EventStore;

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;
use crate::shop::events::ShopEvent;

use super::ShopListing;

impl From<super::ShopError> for DomainError {
    fn from(e: super::ShopError) -> Self {
        DomainError::Shop(e)
    }
}

/// High-level shop listing operations.
pub struct ShopService<S: EventStore> {
    handler: CommandHandler<S, ShopListing>,
}

impl<S: EventStore> ShopService<S> {
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    pub fn handler(&self) -> &CommandHandler<S, ShopListing> {
        &self.handler
    }

    /// Creates a listing exposing `product_id`.
    #[tracing::instrument(skip(self))]
    pub async fn list_product(
        &self,
        shop_id: AggregateId,
        product_id: AggregateId,
    ) -> Result<CommandResult<ShopListing>, DomainError> {
        self.handler
            .execute(shop_id, |listing| listing.list(shop_id, product_id))
            .await
    }

    /// Takes a listing down.
    #[tracing::instrument(skip(self))]
    pub async fn delist(
        &self,
        shop_id: AggregateId,
    ) -> Result<CommandResult<ShopListing>, DomainError> {
        self.handler
            .execute(shop_id, |listing| listing.delist())
            .await
    }

    /// Loads a listing, or `None` when it has never existed.
    #[tracing::instrument(skip(self))]
    pub async fn get_listing(
        &self,
        shop_id: AggregateId,
    ) -> Result<Option<ShopListing>, DomainError> {
        self.handler.load_existing(shop_id).await
    }

    /// Whether any active listing references `product_id`.
    ///
    /// Backs the catalog deletion guard: products still exposed by a shop
    /// cannot be removed.
    #[tracing::instrument(skip(self))]
    pub async fn is_product_listed(&self, product_id: AggregateId) -> Result<bool, DomainError> {
        let listed_events = self
            .handler
            .store()
            .get_events_by_type("ShopListed")
            .await?;

        for record in listed_events {
            let ShopEvent::ShopListed(data) = record.payload_as()? else {
                continue;
            };
            if data.product_id != product_id {
                continue;
            }
            if let Some(listing) = self.get_listing(record.aggregate_id).await?
                && listing.is_active()
                && listing.product_id() == Some(product_id)
            {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
