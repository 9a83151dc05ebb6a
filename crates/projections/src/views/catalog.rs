//! Catalog read model — denormalized products.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::AggregateId;
use domain::{Money, ProductEvent, ProductStatus};
use event_store::EventRecord;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;

/// A denormalized catalog product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub product_id: AggregateId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: u32,
    pub status: ProductStatus,
}

struct CatalogState {
    products: HashMap<AggregateId, ProductSummary>,
    position: ProjectionPosition,
}

/// Read model view over the product catalog.
///
/// Removed products drop out of the view; the event stream keeps the history.
#[derive(Clone)]
pub struct CatalogView {
    state: Arc<RwLock<CatalogState>>,
}

impl CatalogView {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState {
                products: HashMap::new(),
                position: ProjectionPosition::zero(),
            })),
        }
    }

    /// Gets a single product.
    pub async fn get(&self, product_id: AggregateId) -> Option<ProductSummary> {
        self.state.read().await.products.get(&product_id).cloned()
    }

    /// All products, sorted by name.
    pub async fn all(&self) -> Vec<ProductSummary> {
        let state = self.state.read().await;
        let mut products: Vec<_> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    /// Products currently in `status`, sorted by name.
    pub async fn with_status(&self, status: ProductStatus) -> Vec<ProductSummary> {
        let mut products: Vec<_> = self
            .state
            .read()
            .await
            .products
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Projection for CatalogView {
    fn name(&self) -> &'static str {
        "CatalogView"
    }

    async fn handle(&self, record: &EventRecord) -> Result<()> {
        let mut state = self.state.write().await;

        if record.aggregate_type != "Product" {
            state.position = state.position.advance();
            return Ok(());
        }

        let event: ProductEvent = record.payload_as()?;
        let product_id = record.aggregate_id;

        match event {
            ProductEvent::ProductAdded(data) => {
                state.products.insert(
                    product_id,
                    ProductSummary {
                        product_id,
                        name: data.name,
                        description: data.description,
                        price: data.price,
                        stock: data.stock,
                        status: data.status,
                    },
                );
            }
            ProductEvent::ProductUpdated(data) => {
                if let Some(product) = state.products.get_mut(&product_id) {
                    if let Some(name) = data.name {
                        product.name = name;
                    }
                    if let Some(description) = data.description {
                        product.description = description;
                    }
                    if let Some(price) = data.price {
                        product.price = price;
                    }
                    if let Some(stock) = data.stock {
                        product.stock = stock;
                    }
                }
            }
            ProductEvent::StockDecremented(data) => {
                if let Some(product) = state.products.get_mut(&product_id) {
                    product.stock = data.remaining;
                }
            }
            ProductEvent::StockIncremented(data) => {
                if let Some(product) = state.products.get_mut(&product_id) {
                    product.stock = data.remaining;
                }
            }
            ProductEvent::StatusChanged(data) => {
                if let Some(product) = state.products.get_mut(&product_id) {
                    product.status = data.to;
                }
            }
            ProductEvent::ProductRemoved(_) => {
                state.products.remove(&product_id);
            }
        }

        state.position = state.position.advance();
        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        self.state.read().await.position
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.products.clear();
        state.position = ProjectionPosition::zero();
        Ok(())
    }
}

impl ReadModel for CatalogView {
    fn name(&self) -> &'static str {
        "CatalogView"
    }

    fn count(&self) -> usize {
        self.state.try_read().map(|s| s.products.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::DomainEvent;
    use event_store::Version;

    fn make_record(product_id: AggregateId, version: i64, event: &ProductEvent) -> EventRecord {
        EventRecord::new(
            product_id,
            "Product",
            event.event_type(),
            Version::new(version),
            event,
        )
        .unwrap()
    }

    async fn add_product(view: &CatalogView, name: &str, stock: u32) -> AggregateId {
        let product_id = AggregateId::new();
        let event = ProductEvent::product_added(
            product_id,
            name,
            "test product",
            Money::from_units(100),
            stock,
            ProductStatus::Available,
        );
        view.handle(&make_record(product_id, 1, &event))
            .await
            .unwrap();
        product_id
    }

    #[tokio::test]
    async fn tracks_stock_movements() {
        let view = CatalogView::new();
        let product_id = add_product(&view, "voucher", 10).await;

        let event = ProductEvent::stock_decremented(1, 9);
        view.handle(&make_record(product_id, 2, &event))
            .await
            .unwrap();
        assert_eq!(view.get(product_id).await.unwrap().stock, 9);

        let event = ProductEvent::stock_incremented(1, 10);
        view.handle(&make_record(product_id, 3, &event))
            .await
            .unwrap();
        assert_eq!(view.get(product_id).await.unwrap().stock, 10);
    }

    #[tokio::test]
    async fn partial_update_applies_only_set_fields() {
        let view = CatalogView::new();
        let product_id = add_product(&view, "voucher", 10).await;

        let event = ProductEvent::ProductUpdated(domain::product::ProductUpdatedData {
            name: Some("ticket".to_string()),
            description: None,
            price: Some(Money::from_units(250)),
            stock: None,
            updated_at: chrono::Utc::now(),
        });
        view.handle(&make_record(product_id, 2, &event))
            .await
            .unwrap();

        let product = view.get(product_id).await.unwrap();
        assert_eq!(product.name, "ticket");
        assert_eq!(product.description, "test product");
        assert_eq!(product.price, Money::from_units(250));
        assert_eq!(product.stock, 10);
    }

    #[tokio::test]
    async fn status_filter() {
        let view = CatalogView::new();
        let p1 = add_product(&view, "apple", 5).await;
        add_product(&view, "banana", 5).await;

        let event =
            ProductEvent::status_changed(ProductStatus::Available, ProductStatus::Unavailable);
        view.handle(&make_record(p1, 2, &event)).await.unwrap();

        assert_eq!(view.with_status(ProductStatus::Available).await.len(), 1);
        assert_eq!(view.with_status(ProductStatus::Unavailable).await.len(), 1);
    }

    #[tokio::test]
    async fn removal_drops_the_product() {
        let view = CatalogView::new();
        let product_id = add_product(&view, "voucher", 5).await;

        let event = ProductEvent::product_removed();
        view.handle(&make_record(product_id, 2, &event))
            .await
            .unwrap();

        assert!(view.get(product_id).await.is_none());
        assert!(view.all().await.is_empty());
    }

    #[tokio::test]
    async fn sorted_listing() {
        let view = CatalogView::new();
        add_product(&view, "banana", 5).await;
        add_product(&view, "apple", 5).await;

        let all = view.all().await;
        assert_eq!(all[0].name, "apple");
        assert_eq!(all[1].name, "banana");
    }
}
