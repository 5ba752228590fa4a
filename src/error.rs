use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    auth::policy::AccessDenied,
    products::{model::FieldError, store::StoreError},
};

/// Every failure a request can end in. Each variant maps to exactly one status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No token provided")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidCredential,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Product not found")]
    NotFound,

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Server error: {0}")]
    Server(#[from] anyhow::Error),
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated
            | AppError::InvalidCredential
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::DuplicateKey(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            AppError::Unauthenticated => ("No token provided", None),
            AppError::InvalidCredential => ("Invalid token", None),
            AppError::InvalidCredentials => ("Invalid credentials", None),
            AppError::Forbidden(denied) => ("Admin access required", Some(denied.to_string())),
            AppError::Validation(details) => ("Invalid input", Some(details.clone())),
            AppError::NotFound => ("Product not found", None),
            AppError::DuplicateKey(details) => ("Duplicate SKU", Some(details.clone())),
            // storage internals stay in the logs
            AppError::Server(_) => ("Server error", Some("unexpected failure".to_string())),
        };
        ErrorBody {
            error: error.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, %status, "request failed");
        } else {
            debug!(error = %self, %status, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            StoreError::DuplicateKey => {
                AppError::DuplicateKey("a product with this sku already exists".into())
            }
            StoreError::Rejected => {
                AppError::Validation("record violates a storage constraint".into())
            }
            StoreError::Sql(e) => AppError::Server(anyhow::Error::new(e).context("product store")),
        }
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// `Json` extractor whose rejections come back as [`AppError::Validation`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Path` extractor with the same JSON error body as every other failure.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
