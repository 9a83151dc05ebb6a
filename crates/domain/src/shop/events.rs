//! Shop listing domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events that can occur on a shop listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ShopEvent {
    /// A product was put up for redemption.
    ShopListed(ShopListedData),

    /// The listing was taken down.
    ShopDelisted(ShopDelistedData),
}

impl DomainEvent for ShopEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ShopEvent::ShopListed(_) => "ShopListed",
            ShopEvent::ShopDelisted(_) => "ShopDelisted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopListedData {
    pub shop_id: AggregateId,
    pub product_id: AggregateId,
    pub listed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopDelistedData {
    pub delisted_at: DateTime<Utc>,
}

impl ShopEvent {
    pub fn shop_listed(shop_id: AggregateId, product_id: AggregateId) -> Self {
        ShopEvent::ShopListed(ShopListedData {
            shop_id,
            product_id,
            listed_at: Utc::now(),
        })
    }

    pub fn shop_delisted() -> Self {
        ShopEvent::ShopDelisted(ShopDelistedData {
            delisted_at: Utc::now(),
        })
    }
}
