use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use super::{
    claims::Claims,
    jwt::JwtKeys,
    policy::{authorize, Capability},
};
use crate::{error::AppError, state::AppState};

/// Compile-time declaration of the capability an endpoint needs.
pub trait Requirement {
    const CAPABILITY: Capability;
}

#[derive(Debug)]
pub struct CanReadProducts;

impl Requirement for CanReadProducts {
    const CAPABILITY: Capability = Capability::ReadProducts;
}

#[derive(Debug)]
pub struct CanManageProducts;

impl Requirement for CanManageProducts {
    const CAPABILITY: Capability = Capability::ManageProducts;
}

/// Verified claims of a caller holding `R::CAPABILITY`.
#[derive(Debug)]
pub struct Authorized<R> {
    pub claims: Claims,
    _requirement: PhantomData<fn() -> R>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl<R> FromRequestParts<AppState> for Authorized<R>
where
    R: Requirement,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::InvalidCredential
        })?;

        authorize(claims.role, R::CAPABILITY, &state.config.access).map_err(|denied| {
            warn!(
                user_id = %claims.sub,
                capability = ?R::CAPABILITY,
                role = %claims.role,
                "access denied"
            );
            AppError::from(denied)
        })?;

        Ok(Self {
            claims,
            _requirement: PhantomData,
        })
    }
}
