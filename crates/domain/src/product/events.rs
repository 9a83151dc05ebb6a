//! Product domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::Money;

use super::ProductStatus;

/// Events that can occur on a product aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    /// Product entered the catalog.
    ProductAdded(ProductAddedData),

    /// Name, description, price or stock was edited.
    ProductUpdated(ProductUpdatedData),

    /// Stock was reserved for a redemption.
    StockDecremented(StockDecrementedData),

    /// Stock was returned after a cancellation or failed payment.
    StockIncremented(StockIncrementedData),

    /// Availability flag was flipped.
    StatusChanged(ProductStatusChangedData),

    /// Product left the catalog.
    ProductRemoved(ProductRemovedData),
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductAdded(_) => "ProductAdded",
            ProductEvent::ProductUpdated(_) => "ProductUpdated",
            ProductEvent::StockDecremented(_) => "StockDecremented",
            ProductEvent::StockIncremented(_) => "StockIncremented",
            ProductEvent::StatusChanged(_) => "ProductStatusChanged",
            ProductEvent::ProductRemoved(_) => "ProductRemoved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAddedData {
    pub product_id: AggregateId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: u32,
    pub status: ProductStatus,
    pub added_at: DateTime<Utc>,
}

/// Partial edit; `None` fields were left untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdatedData {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<u32>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDecrementedData {
    pub quantity: u32,
    pub remaining: u32,
    pub decremented_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockIncrementedData {
    pub quantity: u32,
    pub remaining: u32,
    pub incremented_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStatusChangedData {
    pub from: ProductStatus,
    pub to: ProductStatus,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRemovedData {
    pub removed_at: DateTime<Utc>,
}

impl ProductEvent {
    pub fn product_added(
        product_id: AggregateId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        stock: u32,
        status: ProductStatus,
    ) -> Self {
        ProductEvent::ProductAdded(ProductAddedData {
            product_id,
            name: name.into(),
            description: description.into(),
            price,
            stock,
            status,
            added_at: Utc::now(),
        })
    }

    pub fn stock_decremented(quantity: u32, remaining: u32) -> Self {
        ProductEvent::StockDecremented(StockDecrementedData {
            quantity,
            remaining,
            decremented_at: Utc::now(),
        })
    }

    pub fn stock_incremented(quantity: u32, remaining: u32) -> Self {
        ProductEvent::StockIncremented(StockIncrementedData {
            quantity,
            remaining,
            incremented_at: Utc::now(),
        })
    }

    pub fn status_changed(from: ProductStatus, to: ProductStatus) -> Self {
        ProductEvent::StatusChanged(ProductStatusChangedData {
            from,
            to,
            changed_at: Utc::now(),
        })
    }

    pub fn product_removed() -> Self {
        ProductEvent::ProductRemoved(ProductRemovedData {
            removed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_tags() {
        let event = ProductEvent::product_added(
            AggregateId::new(),
            "gift card",
            "a gift card",
            Money::from_units(5000),
            10,
            ProductStatus::Available,
        );
        assert_eq!(event.event_type(), "ProductAdded");

        assert_eq!(
            ProductEvent::stock_decremented(1, 9).event_type(),
            "StockDecremented"
        );
        assert_eq!(
            ProductEvent::status_changed(ProductStatus::Available, ProductStatus::Unavailable)
                .event_type(),
            "ProductStatusChanged"
        );
        assert_eq!(ProductEvent::product_removed().event_type(), "ProductRemoved");
    }

    #[test]
    fn tagged_serialization() {
        let event = ProductEvent::stock_decremented(2, 5);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"StockDecremented\""));

        let back: ProductEvent = serde_json::from_str(&json).unwrap();
        if let ProductEvent::StockDecremented(data) = back {
            assert_eq!(data.quantity, 2);
            assert_eq!(data.remaining, 5);
        } else {
            panic!("expected StockDecremented");
        }
    }
}
