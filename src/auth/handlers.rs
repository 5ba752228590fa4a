use axum::{extract::{FromRef, State}, routing::post, Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser},
        jwt::JwtKeys,
        password::verify_password,
    },
    error::{AppError, AppJson},
    state::AppState,
};

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex =
            Regex::new(r"^[A-Za-z0-9._@-]{1,64}$").expect("username pattern compiles");
    }
    USERNAME_RE.is_match(username)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.username = payload.username.trim().to_string();

    if payload.username.is_empty() {
        warn!("blank username");
        return Err(AppError::Validation("username is required".into()));
    }
    if !is_valid_username(&payload.username) {
        warn!("malformed username");
        return Err(AppError::Validation("username is malformed".into()));
    }

    let Some(user) = state.users.find_by_username(&payload.username).await? else {
        warn!(username = %payload.username, "login unknown username");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(username = %payload.username, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(&state).sign(&user)?;

    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: PublicUser {
            id: user.id,
            username: user.username,
            role: user.role,
        },
    }))
}
