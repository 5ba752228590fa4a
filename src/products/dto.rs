use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::products::model::{
    check_quantity, FieldError, Product, ProductFields, SearchQuery, DEFAULT_PAGE,
    DEFAULT_PAGE_SIZE,
};

/// Body of create and full-update requests. Numbers may arrive as JSON
/// numbers or numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
}

impl ProductPayload {
    pub fn validate(self) -> Result<ProductFields, FieldError> {
        let name = required_text("name", self.name)?;
        let kind = required_text("type", self.kind)?;
        let sku = required_text("sku", self.sku)?;
        let quantity = check_quantity(coerce_integer("quantity", self.quantity.as_ref())?)?;
        let price = coerce_number("price", self.price.as_ref())?;

        ProductFields::new(
            name,
            kind,
            sku,
            self.image_url.unwrap_or_default(),
            self.description.unwrap_or_default(),
            quantity,
            price,
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuantityPayload {
    #[serde(default)]
    pub quantity: Option<Value>,
}

impl QuantityPayload {
    pub fn validate(&self) -> Result<i64, FieldError> {
        check_quantity(coerce_integer("quantity", self.quantity.as_ref())?)
    }
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, FieldError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(FieldError::Missing(field)),
    }
}

fn coerce_integer(field: &'static str, value: Option<&Value>) -> Result<i64, FieldError> {
    match value {
        None | Some(Value::Null) => Err(FieldError::Missing(field)),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or(FieldError::NotAnInteger(field)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| FieldError::NotAnInteger(field)),
        Some(_) => Err(FieldError::NotAnInteger(field)),
    }
}

fn coerce_number(field: &'static str, value: Option<&Value>) -> Result<f64, FieldError> {
    let number = match value {
        None | Some(Value::Null) => return Err(FieldError::Missing(field)),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    number
        .filter(|f| f.is_finite())
        .ok_or(FieldError::NotANumber(field))
}

/// Raw listing query; anything unparsable falls back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub name: Option<String>,
}

impl ListParams {
    pub fn into_query(self, max_page_size: Option<u32>) -> SearchQuery {
        let positive = |raw: Option<String>, default: u32| {
            raw.and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(default)
        };
        let mut limit = positive(self.limit, DEFAULT_PAGE_SIZE);
        if let Some(max) = max_page_size {
            limit = limit.min(max);
        }
        SearchQuery {
            name: self.name.unwrap_or_default(),
            page: positive(self.page, DEFAULT_PAGE),
            limit,
        }
    }
}

/// Affected record plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMessage {
    pub message: String,
    #[serde(flatten)]
    pub product: Product,
}

impl ProductMessage {
    pub fn new(message: &str, product: Product) -> Self {
        Self {
            message: message.to_string(),
            product,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedMessage {
    pub message: String,
    pub id: Uuid,
}
