use async_trait::async_trait;
use sqlx::error::{DatabaseError, ErrorKind};
use thiserror::Error;
use uuid::Uuid;

use crate::products::model::{
    Analytics, NameCount, Product, ProductFields, ProductPage, SearchQuery,
};

/// How many entries each analytics ranking returns.
pub const ANALYTICS_LIMIT: i64 = 5;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product not found")]
    NotFound,

    #[error("product with this sku already exists")]
    DuplicateKey,

    #[error("record rejected by a storage constraint")]
    Rejected,

    #[error("storage error")]
    Sql(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if matches!(error, sqlx::Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::DuplicateKey,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::Rejected,
            _ => Self::Sql(error),
        }
    }
}

/// Typed access to the product collection. Each call touches at most one row
/// for writes; nothing spans rows transactionally.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create(&self, fields: ProductFields) -> Result<Product, StoreError>;

    /// Overwrites every mutable field and refreshes `updated_at`.
    async fn replace(&self, id: Uuid, fields: ProductFields) -> Result<Product, StoreError>;

    async fn update_quantity(&self, id: Uuid, quantity: i64) -> Result<Product, StoreError>;

    /// Removes the row and returns what it held.
    async fn delete(&self, id: Uuid) -> Result<Product, StoreError>;

    /// Newest first. The page count is derived from the full match count.
    async fn search(&self, query: &SearchQuery) -> Result<ProductPage, StoreError>;

    async fn most_added(&self, limit: i64) -> Result<Vec<NameCount>, StoreError>;

    async fn top_expensive(&self, limit: i64) -> Result<Vec<Product>, StoreError>;

    /// Sum of `price * quantity`, zero for an empty collection.
    async fn total_value(&self) -> Result<f64, StoreError>;
}

/// Runs the three aggregate queries concurrently and joins them.
pub async fn analytics(store: &dyn ProductStore) -> Result<Analytics, StoreError> {
    let (most_added, top_expensive, total_value) = tokio::try_join!(
        store.most_added(ANALYTICS_LIMIT),
        store.top_expensive(ANALYTICS_LIMIT),
        store.total_value(),
    )?;

    Ok(Analytics {
        most_added,
        top_expensive,
        total_value,
    })
}

/// Escapes `LIKE` metacharacters so the pattern matches literally.
pub(crate) fn escape_like(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
