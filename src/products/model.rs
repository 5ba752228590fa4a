use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Stored product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub sku: String,
    pub image_url: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "updatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must be an integer")]
    NotAnInteger(&'static str),

    #[error("{0} must be a finite number")]
    NotANumber(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),
}

/// Mutable fields of a product, already checked against the record invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    name: String,
    kind: String,
    sku: String,
    image_url: String,
    description: String,
    quantity: i64,
    price: f64,
}

impl ProductFields {
    pub fn new(
        name: String,
        kind: String,
        sku: String,
        image_url: String,
        description: String,
        quantity: i64,
        price: f64,
    ) -> Result<Self, FieldError> {
        for (field, value) in [("name", &name), ("type", &kind), ("sku", &sku)] {
            if value.trim().is_empty() {
                return Err(FieldError::Missing(field));
            }
        }
        Ok(Self {
            name,
            kind,
            sku,
            image_url,
            description,
            quantity: check_quantity(quantity)?,
            price: check_price(price)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}

pub fn check_quantity(quantity: i64) -> Result<i64, FieldError> {
    if quantity < 0 {
        return Err(FieldError::Negative("quantity"));
    }
    Ok(quantity)
}

fn check_price(price: f64) -> Result<f64, FieldError> {
    if !price.is_finite() {
        return Err(FieldError::NotANumber("price"));
    }
    if price < 0.0 {
        return Err(FieldError::Negative("price"));
    }
    Ok(price)
}

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Case-insensitive substring search over `name`, one page at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub name: String,
    pub page: u32,
    pub limit: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            name: String::new(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub fn page_of(&self, products: Vec<Product>, total: u64) -> ProductPage {
        ProductPage {
            products,
            total,
            page: self.page,
            pages: total.div_ceil(u64::from(self.limit.max(1))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NameCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub most_added: Vec<NameCount>,
    pub top_expensive: Vec<Product>,
    pub total_value: f64,
}
