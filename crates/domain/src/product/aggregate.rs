//! Product aggregate implementation.

use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, SnapshotCapable};
use crate::value_objects::Money;

use super::{
    ProductError, ProductEvent, ProductStatus,
    events::{ProductAddedData, ProductUpdatedData},
};

/// Partial update for a product; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<u32>,
}

impl ProductUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
    }
}

/// Catalog entry aggregate root.
///
/// Stock is a `u32` and every decrement is guarded, so the count can never go
/// negative no matter how requests interleave. The availability status is
/// stored explicitly and never derived from stock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    id: Option<AggregateId>,

    #[serde(default)]
    version: Version,

    name: String,
    description: String,
    price: Money,
    stock: u32,
    status: ProductStatus,
    removed: bool,
}

impl Aggregate for Product {
    type Event = ProductEvent;
    type Error = ProductError;

    fn aggregate_type() -> &'static str {
        "Product"
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
            ProductEvent::ProductAdded(data) => self.apply_added(data),
            ProductEvent::ProductUpdated(data) => self.apply_updated(data),
            ProductEvent::StockDecremented(data) => {
                self.stock = self.stock.saturating_sub(data.quantity);
            }
            ProductEvent::StockIncremented(data) => {
                self.stock += data.quantity;
            }
            ProductEvent::StatusChanged(data) => {
                self.status = data.to;
            }
            ProductEvent::ProductRemoved(_) => {
                self.removed = true;
            }
        }
    }
}

impl SnapshotCapable for Product {
    fn snapshot_interval() -> usize {
        50
    }
}

// Query methods
impl Product {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Whether the product can be redeemed right now.
    pub fn is_available(&self) -> bool {
        !self.removed && self.status == ProductStatus::Available && self.stock > 0
    }

    fn in_catalog(&self) -> Result<(), ProductError> {
        if self.id.is_none() || self.removed {
            return Err(ProductError::NotInCatalog);
        }
        Ok(())
    }
}

// Command methods (return events)
impl Product {
    /// Adds the product to the catalog.
    pub fn add(
        &self,
        product_id: AggregateId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        stock: u32,
        status: ProductStatus,
    ) -> Result<Vec<ProductEvent>, ProductError> {
        if self.id.is_some() {
            return Err(ProductError::AlreadyExists);
        }

        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProductError::NameRequired);
        }
        if !price.is_positive() {
            return Err(ProductError::InvalidPrice {
                price: price.units(),
            });
        }

        Ok(vec![ProductEvent::product_added(
            product_id,
            name,
            description,
            price,
            stock,
            status,
        )])
    }

    /// Applies a partial edit.
    pub fn update(&self, update: ProductUpdate) -> Result<Vec<ProductEvent>, ProductError> {
        self.in_catalog()?;

        if update.is_empty() {
            return Ok(vec![]);
        }

        if let Some(ref name) = update.name
            && name.trim().is_empty()
        {
            return Err(ProductError::NameRequired);
        }
        if let Some(price) = update.price
            && !price.is_positive()
        {
            return Err(ProductError::InvalidPrice {
                price: price.units(),
            });
        }

        Ok(vec![ProductEvent::ProductUpdated(ProductUpdatedData {
            name: update.name,
            description: update.description,
            price: update.price,
            stock: update.stock,
            updated_at: chrono::Utc::now(),
        })])
    }

    /// Reserves `quantity` units of stock.
    ///
    /// Fails rather than clamping when the catalog holds fewer units.
    pub fn decrement_stock(&self, quantity: u32) -> Result<Vec<ProductEvent>, ProductError> {
        self.in_catalog()?;

        if quantity == 0 {
            return Err(ProductError::InvalidQuantity { quantity });
        }
        if quantity > self.stock {
            return Err(ProductError::OutOfStock {
                requested: quantity,
                available: self.stock,
            });
        }

        Ok(vec![ProductEvent::stock_decremented(
            quantity,
            self.stock - quantity,
        )])
    }

    /// Returns `quantity` units of stock.
    pub fn increment_stock(&self, quantity: u32) -> Result<Vec<ProductEvent>, ProductError> {
        self.in_catalog()?;

        if quantity == 0 {
            return Err(ProductError::InvalidQuantity { quantity });
        }

        Ok(vec![ProductEvent::stock_incremented(
            quantity,
            self.stock + quantity,
        )])
    }

    /// Flips the availability flag.
    pub fn set_status(&self, status: ProductStatus) -> Result<Vec<ProductEvent>, ProductError> {
        self.in_catalog()?;

        if status == self.status {
            return Ok(vec![]);
        }

        Ok(vec![ProductEvent::status_changed(self.status, status)])
    }

    /// Removes the product from the catalog.
    ///
    /// Callers must first check that no shop listing still references the
    /// product; the aggregate itself cannot see listings.
    pub fn remove(&self) -> Result<Vec<ProductEvent>, ProductError> {
        self.in_catalog()?;
        Ok(vec![ProductEvent::product_removed()])
    }
}

// Apply helpers
impl Product {
    fn apply_added(&mut self, data: ProductAddedData) {
        self.id = Some(data.product_id);
        self.name = data.name;
        self.description = data.description;
        self.price = data.price;
        self.stock = data.stock;
        self.status = data.status;
    }

    fn apply_updated(&mut self, data: ProductUpdatedData) {
        if let Some(name) = data.name {
            self.name = name;
        }
        if let Some(description) = data.description {
            self.description = description;
        }
        if let Some(price) = data.price {
            self.price = price;
        }
        if let Some(stock) = data.stock {
            self.stock = stock;
        }
    }
}
