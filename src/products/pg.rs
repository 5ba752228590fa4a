use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::products::{
    model::{NameCount, Product, ProductFields, ProductPage, SearchQuery},
    store::{escape_like, ProductStore, StoreError},
};

const PRODUCT_COLUMNS: &str =
    "id, name, type, sku, image_url, description, quantity, price, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgProductStore {
    db: PgPool,
}

impl PgProductStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn create(&self, fields: ProductFields) -> Result<Product, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO products (id, name, type, sku, image_url, description, quantity, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::new_v4())
            .bind(fields.name())
            .bind(fields.kind())
            .bind(fields.sku())
            .bind(fields.image_url())
            .bind(fields.description())
            .bind(fields.quantity())
            .bind(fields.price())
            .fetch_one(&self.db)
            .await?;
        Ok(product)
    }

    async fn replace(&self, id: Uuid, fields: ProductFields) -> Result<Product, StoreError> {
        let sql = format!(
            r#"
            UPDATE products
               SET name = $2, type = $3, sku = $4, image_url = $5, description = $6,
                   quantity = $7, price = $8, updated_at = now()
             WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(fields.name())
            .bind(fields.kind())
            .bind(fields.sku())
            .bind(fields.image_url())
            .bind(fields.description())
            .bind(fields.quantity())
            .bind(fields.price())
            .fetch_optional(&self.db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update_quantity(&self, id: Uuid, quantity: i64) -> Result<Product, StoreError> {
        let sql = format!(
            r#"
            UPDATE products
               SET quantity = $2, updated_at = now()
             WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(quantity)
            .fetch_optional(&self.db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<Product, StoreError> {
        let sql = format!("DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}");
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn search(&self, query: &SearchQuery) -> Result<ProductPage, StoreError> {
        let pattern = escape_like(&query.name);
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
              FROM products
             WHERE name ILIKE '%' || $1 || '%' ESCAPE '\'
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(&pattern)
            .bind(i64::from(query.limit))
            .bind(i64::try_from(query.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.db);
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
              FROM products
             WHERE name ILIKE '%' || $1 || '%' ESCAPE '\'
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.db);

        let (products, total) = tokio::try_join!(rows, count)?;
        debug!(name = %query.name, page = query.page, total, "product search");
        Ok(query.page_of(products, total.max(0) as u64))
    }

    async fn most_added(&self, limit: i64) -> Result<Vec<NameCount>, StoreError> {
        let rows = sqlx::query_as::<_, NameCount>(
            r#"
            SELECT name, COUNT(*) AS count
              FROM products
             GROUP BY name
             ORDER BY count DESC, name ASC
             LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn top_expensive(&self, limit: i64) -> Result<Vec<Product>, StoreError> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
              FROM products
             ORDER BY price DESC, created_at DESC
             LIMIT $1
            "#
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn total_value(&self) -> Result<f64, StoreError> {
        let total = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(SUM(price * quantity), 0)::DOUBLE PRECISION
              FROM products
            "#,
        )
        .fetch_one(&self.db)
        .await?;
        Ok(total)
    }
}
