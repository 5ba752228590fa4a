use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::dto::{LoginRequest, LoginResponse},
    client::session::AuthContext,
    error::ErrorBody,
    products::{
        dto::{DeletedMessage, ProductMessage, ProductPayload},
        model::{Analytics, ProductPage},
    },
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not signed in")]
    SignedOut,

    /// Error reported by the server; `message` is shown to the user as-is.
    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        details: Option<String>,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Listing parameters sent as `page`, `limit` and `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRequest {
    pub page: u32,
    pub limit: u32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authed(
        &self,
        req: RequestBuilder,
        auth: &AuthContext,
    ) -> Result<RequestBuilder, ClientError> {
        let token = auth.token().ok_or(ClientError::SignedOut)?;
        Ok(req.bearer_auth(token))
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let res = self.http.post(self.url("/auth/login")).json(&body).send().await?;
        decode(res).await
    }

    pub async fn list_products(
        &self,
        auth: &AuthContext,
        query: &ListRequest,
    ) -> Result<ProductPage, ClientError> {
        let req = self.http.get(self.url("/products")).query(query);
        decode(self.authed(req, auth)?.send().await?).await
    }

    pub async fn analytics(&self, auth: &AuthContext) -> Result<Analytics, ClientError> {
        let req = self.http.get(self.url("/products/analytics"));
        decode(self.authed(req, auth)?.send().await?).await
    }

    pub async fn create_product(
        &self,
        auth: &AuthContext,
        payload: &ProductPayload,
    ) -> Result<ProductMessage, ClientError> {
        let req = self.http.post(self.url("/products")).json(payload);
        decode(self.authed(req, auth)?.send().await?).await
    }

    pub async fn update_product(
        &self,
        auth: &AuthContext,
        id: Uuid,
        payload: &ProductPayload,
    ) -> Result<ProductMessage, ClientError> {
        let req = self.http.put(self.url(&format!("/products/{id}"))).json(payload);
        decode(self.authed(req, auth)?.send().await?).await
    }

    /// `quantity` is sent as typed so the server does the integer check.
    pub async fn update_quantity(
        &self,
        auth: &AuthContext,
        id: Uuid,
        quantity: &str,
    ) -> Result<ProductMessage, ClientError> {
        let req = self
            .http
            .put(self.url(&format!("/products/{id}/quantity")))
            .json(&json!({ "quantity": quantity }));
        decode(self.authed(req, auth)?.send().await?).await
    }

    pub async fn delete_product(
        &self,
        auth: &AuthContext,
        id: Uuid,
    ) -> Result<DeletedMessage, ClientError> {
        let req = self.http.delete(self.url(&format!("/products/{id}")));
        decode(self.authed(req, auth)?.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json::<T>().await?);
    }

    let text = res.text().await?;
    debug!(%status, "api error response");
    let (message, details) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.error, body.details),
        Err(_) if !text.trim().is_empty() => (text, None),
        Err(_) => (status.to_string(), None),
    };
    Err(ClientError::Api {
        status,
        message,
        details,
    })
}
