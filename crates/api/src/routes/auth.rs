//! Authentication route handlers.
//!
//! Handles registration and login. Both endpoints sit behind the auth
//! rate limiter (see the router assembly in [`super`]).

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::{ApiError, AppJson};
use crate::services::AuthService;
use crate::state::AppState;
use crate::validate;

/// Registration payload. Fields are optional so validation can report
/// missing ones per field instead of rejecting the whole body.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Handle registration.
///
/// POST /auth/register
///
/// On success the welcome email is dispatched on a detached task: its
/// outcome never affects the registration response.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) =
        validate::credentials(payload.email.as_deref(), payload.password.as_deref())?;

    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth.register(&email, &password).await?;

    // Best-effort welcome notification; failure is logged, never surfaced.
    let mailer = state.email().clone();
    let to = user.email.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.send_welcome(to.as_str()).await {
            tracing::warn!(to = %to, error = %e, "welcome email dispatch failed");
        }
    });

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Usuario registrado correctamente",
            "data": user,
        })),
    ))
}

/// Handle login.
///
/// POST /auth/login
///
/// Unknown email and wrong password produce the same undifferentiated
/// 401 so callers cannot probe which addresses are registered.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) =
        validate::credentials(payload.email.as_deref(), payload.password.as_deref())?;

    let auth = AuthService::new(state.pool(), state.tokens());
    let token = auth.login(&email, &password).await?;

    Ok(Json(json!({
        "success": true,
        "token": token,
    })))
}
