use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::{Authorized, CanManageProducts, CanReadProducts},
    error::{AppError, AppJson, AppPath},
    products::{
        dto::{DeletedMessage, ListParams, ProductMessage, ProductPayload, QuantityPayload},
        model::{Analytics, ProductPage},
        store,
    },
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/analytics", get(analytics))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/products/:id/quantity", put(update_quantity))
}

/// An id that does not parse cannot match any record.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

#[instrument(skip_all, fields(user_id = %auth.claims.sub))]
pub async fn create_product(
    State(state): State<AppState>,
    auth: Authorized<CanManageProducts>,
    AppJson(payload): AppJson<ProductPayload>,
) -> Result<(StatusCode, Json<ProductMessage>), AppError> {
    let fields = payload.validate()?;
    let product = state.products.create(fields).await?;
    info!(product_id = %product.id, sku = %product.sku, "product created");
    Ok((
        StatusCode::CREATED,
        Json(ProductMessage::new("Product created", product)),
    ))
}

#[instrument(skip_all, fields(user_id = %auth.claims.sub, product_id = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    auth: Authorized<CanManageProducts>,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<ProductPayload>,
) -> Result<Json<ProductMessage>, AppError> {
    let id = parse_id(&id)?;
    let fields = payload.validate()?;
    let product = state.products.replace(id, fields).await?;
    info!(sku = %product.sku, "product updated");
    Ok(Json(ProductMessage::new("Product updated", product)))
}

#[instrument(skip_all, fields(user_id = %auth.claims.sub, product_id = %id))]
pub async fn update_quantity(
    State(state): State<AppState>,
    auth: Authorized<CanManageProducts>,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<QuantityPayload>,
) -> Result<Json<ProductMessage>, AppError> {
    let id = parse_id(&id)?;
    let quantity = payload.validate()?;
    let product = state.products.update_quantity(id, quantity).await?;
    info!(quantity, "quantity updated");
    Ok(Json(ProductMessage::new("Quantity updated", product)))
}

#[instrument(skip_all, fields(user_id = %auth.claims.sub))]
pub async fn list_products(
    State(state): State<AppState>,
    auth: Authorized<CanReadProducts>,
    Query(params): Query<ListParams>,
) -> Result<Json<ProductPage>, AppError> {
    let query = params.into_query(state.config.max_page_size);
    let page = state.products.search(&query).await?;
    Ok(Json(page))
}

#[instrument(skip_all, fields(user_id = %auth.claims.sub, product_id = %id))]
pub async fn delete_product(
    State(state): State<AppState>,
    auth: Authorized<CanManageProducts>,
    AppPath(id): AppPath<String>,
) -> Result<Json<DeletedMessage>, AppError> {
    let id = parse_id(&id)?;
    let product = state.products.delete(id).await?;
    info!(sku = %product.sku, "product deleted");
    Ok(Json(DeletedMessage {
        message: "Product deleted".into(),
        id: product.id,
    }))
}

#[instrument(skip_all, fields(user_id = %auth.claims.sub))]
pub async fn analytics(
    State(state): State<AppState>,
    auth: Authorized<CanReadProducts>,
) -> Result<Json<Analytics>, AppError> {
    let summary = store::analytics(state.products.as_ref()).await?;
    Ok(Json(summary))
}
