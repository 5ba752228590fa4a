use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
pub mod model;
pub mod pg;
pub mod store;

pub fn router() -> Router<AppState> {
    handlers::product_routes()
}
