//! Contact-form route handler.
//!
//! Relays a visitor's message to the configured store inbox.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::{ApiError, AppJson};
use crate::state::AppState;
use crate::validate;

/// Contact-form payload.
#[derive(Debug, Deserialize)]
pub struct ContactPayload {
    pub subject: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// Relay a contact-form submission.
///
/// POST /email/send
#[instrument(skip_all)]
pub async fn send(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = validate::contact(
        payload.subject.as_deref(),
        payload.email.as_deref(),
        payload.message.as_deref(),
    )?;

    let accepted = state.email().send_contact(&contact).await.map_err(|e| {
        tracing::error!(error = %e, "contact email dispatch failed");
        ApiError::Internal("contact email dispatch failed".to_owned())
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Correo fue enviado exitosamente",
        "info": { "accepted": accepted },
    })))
}
