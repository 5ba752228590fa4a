use std::collections::HashMap;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::products::{
    model::{NameCount, Product, ProductFields, ProductPage, SearchQuery},
    store::{ProductStore, StoreError},
};

#[derive(Debug, Default)]
struct Rows {
    products: Vec<Product>,
    last_stamp: Option<OffsetDateTime>,
}

impl Rows {
    /// Strictly increasing so creation order is observable.
    fn stamp(&mut self) -> OffsetDateTime {
        let mut now = OffsetDateTime::now_utc();
        if let Some(last) = self.last_stamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_stamp = Some(now);
        now
    }

    fn sku_taken(&self, sku: &str, except: Option<Uuid>) -> bool {
        self.products
            .iter()
            .any(|p| p.sku == sku && Some(p.id) != except)
    }

    fn find_mut(&mut self, id: Uuid) -> Result<&mut Product, StoreError> {
        self.products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)
    }
}

/// Product store backed by a `Vec`, used by tests.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    rows: RwLock<Rows>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(a: &Product, b: &Product) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, fields: ProductFields) -> Result<Product, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.sku_taken(fields.sku(), None) {
            return Err(StoreError::DuplicateKey);
        }
        let now = rows.stamp();
        let product = Product {
            id: Uuid::new_v4(),
            name: fields.name().to_string(),
            kind: fields.kind().to_string(),
            sku: fields.sku().to_string(),
            image_url: fields.image_url().to_string(),
            description: fields.description().to_string(),
            quantity: fields.quantity(),
            price: fields.price(),
            created_at: now,
            updated_at: now,
        };
        rows.products.push(product.clone());
        Ok(product)
    }

    async fn replace(&self, id: Uuid, fields: ProductFields) -> Result<Product, StoreError> {
        let mut rows = self.rows.write().await;
        rows.find_mut(id)?;
        if rows.sku_taken(fields.sku(), Some(id)) {
            return Err(StoreError::DuplicateKey);
        }
        let now = rows.stamp();
        let product = rows.find_mut(id)?;
        product.name = fields.name().to_string();
        product.kind = fields.kind().to_string();
        product.sku = fields.sku().to_string();
        product.image_url = fields.image_url().to_string();
        product.description = fields.description().to_string();
        product.quantity = fields.quantity();
        product.price = fields.price();
        product.updated_at = now;
        Ok(product.clone())
    }

    async fn update_quantity(&self, id: Uuid, quantity: i64) -> Result<Product, StoreError> {
        let mut rows = self.rows.write().await;
        rows.find_mut(id)?;
        let now = rows.stamp();
        let product = rows.find_mut(id)?;
        product.quantity = quantity;
        product.updated_at = now;
        Ok(product.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<Product, StoreError> {
        let mut rows = self.rows.write().await;
        let index = rows
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        Ok(rows.products.remove(index))
    }

    async fn search(&self, query: &SearchQuery) -> Result<ProductPage, StoreError> {
        let rows = self.rows.read().await;
        let needle = query.name.to_lowercase();
        let mut matches: Vec<&Product> = rows
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| newest_first(a, b));

        let total = matches.len() as u64;
        let page = matches
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok(query.page_of(page, total))
    }

    async fn most_added(&self, limit: i64) -> Result<Vec<NameCount>, StoreError> {
        let rows = self.rows.read().await;
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for p in &rows.products {
            *counts.entry(p.name.as_str()).or_default() += 1;
        }
        let mut ranked: Vec<NameCount> = counts
            .into_iter()
            .map(|(name, count)| NameCount {
                name: name.to_string(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        ranked.truncate(limit.max(0) as usize);
        Ok(ranked)
    }

    async fn top_expensive(&self, limit: i64) -> Result<Vec<Product>, StoreError> {
        let rows = self.rows.read().await;
        let mut ranked = rows.products.clone();
        ranked.sort_by(|a, b| {
            b.price
                .total_cmp(&a.price)
                .then(b.created_at.cmp(&a.created_at))
        });
        ranked.truncate(limit.max(0) as usize);
        Ok(ranked)
    }

    async fn total_value(&self) -> Result<f64, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .products
            .iter()
            .map(|p| p.price * p.quantity as f64)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::store::analytics;

    fn fields(name: &str, sku: &str, quantity: i64, price: f64) -> ProductFields {
        ProductFields::new(
            name.into(),
            "gear".into(),
            sku.into(),
            String::new(),
            String::new(),
            quantity,
            price,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_sku_is_rejected() {
        let store = InMemoryProductStore::new();
        store.create(fields("Widget", "W-1", 1, 1.0)).await.unwrap();
        let err = store.create(fields("Other", "W-1", 2, 2.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey));
    }

    #[tokio::test]
    async fn replace_may_keep_its_own_sku_but_not_take_another() {
        let store = InMemoryProductStore::new();
        let a = store.create(fields("A", "A-1", 1, 1.0)).await.unwrap();
        store.create(fields("B", "B-1", 1, 1.0)).await.unwrap();

        let renamed = store.replace(a.id, fields("A2", "A-1", 4, 3.0)).await.unwrap();
        assert_eq!(renamed.name, "A2");
        assert_eq!(renamed.created_at, a.created_at);
        assert!(renamed.updated_at > a.updated_at);

        let err = store.replace(a.id, fields("A3", "B-1", 4, 3.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey));
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = InMemoryProductStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.update_quantity(id, 1).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.replace(id, fields("A", "A", 1, 1.0)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn search_pages_newest_first() {
        let store = InMemoryProductStore::new();
        for i in 0..15 {
            store
                .create(fields(&format!("Item {i}"), &format!("SKU-{i}"), 1, 1.0))
                .await
                .unwrap();
        }
        let first = store.search(&SearchQuery::default()).await.unwrap();
        assert_eq!(first.products.len(), 10);
        assert_eq!(first.total, 15);
        assert_eq!(first.pages, 2);
        assert_eq!(first.products[0].name, "Item 14");
        assert!(first
            .products
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));

        let second = store
            .search(&SearchQuery {
                page: 2,
                ..SearchQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(second.products.len(), 5);
        assert_eq!(second.products[4].name, "Item 0");
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let store = InMemoryProductStore::new();
        store.create(fields("Widget", "1", 1, 1.0)).await.unwrap();
        store.create(fields("WIDGET-2", "2", 1, 1.0)).await.unwrap();
        store.create(fields("Gadget", "3", 1, 1.0)).await.unwrap();

        let page = store
            .search(&SearchQuery {
                name: "wid".into(),
                ..SearchQuery::default()
            })
            .await
            .unwrap();
        let mut names: Vec<_> = page.products.iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["WIDGET-2", "Widget"]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn analytics_on_empty_store() {
        let store = InMemoryProductStore::new();
        let result = analytics(&store).await.unwrap();
        assert!(result.most_added.is_empty());
        assert!(result.top_expensive.is_empty());
        assert_eq!(result.total_value, 0.0);
    }

    #[tokio::test]
    async fn analytics_ranks_and_sums() {
        let store = InMemoryProductStore::new();
        store.create(fields("Bolt", "B1", 10, 0.5)).await.unwrap();
        store.create(fields("Bolt", "B2", 10, 0.25)).await.unwrap();
        store.create(fields("Drill", "D1", 1, 99.0)).await.unwrap();
        for i in 0..5 {
            store
                .create(fields(&format!("Nut {i}"), &format!("N{i}"), 0, 1.0 + i as f64))
                .await
                .unwrap();
        }

        let result = analytics(&store).await.unwrap();
        assert_eq!(result.most_added.len(), 5);
        assert_eq!(
            result.most_added[0],
            NameCount {
                name: "Bolt".into(),
                count: 2
            }
        );
        assert_eq!(result.top_expensive.len(), 5);
        assert_eq!(result.top_expensive[0].name, "Drill");
        assert_eq!(result.top_expensive[1].name, "Nut 4");
        assert_eq!(result.total_value, 5.0 + 2.5 + 99.0);
    }
}
