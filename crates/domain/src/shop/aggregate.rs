//! Shop listing aggregate implementation.

use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{ShopError, ShopEvent};

/// A shop listing exposing exactly one product for redemption.
///
/// The redemption orchestrator only reads listings; mutation is limited to
/// listing and delisting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopListing {
    id: Option<AggregateId>,

    #[serde(default)]
    version: Version,

    product_id: Option<AggregateId>,
    active: bool,
}

impl Aggregate for ShopListing {
    type Event = ShopEvent;
    type Error = ShopError;

    fn aggregate_type() -> &'static str {
        "ShopListing"
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
            ShopEvent::ShopListed(data) => {
                self.id = Some(data.shop_id);
                self.product_id = Some(data.product_id);
                self.active = true;
            }
            ShopEvent::ShopDelisted(_) => {
                self.active = false;
            }
        }
    }
}

impl ShopListing {
    /// The product this listing exposes.
    pub fn product_id(&self) -> Option<AggregateId> {
        self.product_id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Puts a product up for redemption.
    pub fn list(
        &self,
        shop_id: AggregateId,
        product_id: AggregateId,
    ) -> Result<Vec<ShopEvent>, ShopError> {
        if self.id.is_some() && self.active {
            return Err(ShopError::AlreadyListed);
        }

        Ok(vec![ShopEvent::shop_listed(shop_id, product_id)])
    }

    /// Takes the listing down.
    pub fn delist(&self) -> Result<Vec<ShopEvent>, ShopError> {
        if self.id.is_none() || !self.active {
            return Err(ShopError::NotListed);
        }

        Ok(vec![ShopEvent::shop_delisted()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_and_delist() {
        let mut listing = ShopListing::default();
        let shop_id = AggregateId::new();
        let product_id = AggregateId::new();

        let events = listing.list(shop_id, product_id).unwrap();
        listing.apply_events(events);

        assert_eq!(listing.id(), Some(shop_id));
        assert_eq!(listing.product_id(), Some(product_id));
        assert!(listing.is_active());

        let events = listing.delist().unwrap();
        listing.apply_events(events);
        assert!(!listing.is_active());
    }

    #[test]
    fn double_list_rejected() {
        let mut listing = ShopListing::default();
        let events = listing.list(AggregateId::new(), AggregateId::new()).unwrap();
        listing.apply_events(events);

        let result = listing.list(AggregateId::new(), AggregateId::new());
        assert!(matches!(result, Err(ShopError::AlreadyListed)));
    }

    #[test]
    fn delist_requires_active_listing() {
        let listing = ShopListing::default();
        assert!(matches!(listing.delist(), Err(ShopError::NotListed)));
    }
}
