//! Anti-forgery nonce issuing.

use axum::{extract::State, Json};
use serde::Serialize;
use shared::crypto::session_nonce;

use crate::app::AppState;
use crate::extractors::{AdminSession, NONCE_HEADER};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceResponse {
    pub nonce: String,
    /// Header the nonce must be sent in on writes.
    pub header: &'static str,
}

/// Nonce bound to the caller's session.
///
/// GET /trust-badges/v1/session/nonce
pub async fn nonce(State(state): State<AppState>, admin: AdminSession) -> Json<NonceResponse> {
    Json(NonceResponse {
        nonce: session_nonce(&state.config.security.nonce_secret, &admin.session_id),
        header: NONCE_HEADER,
    })
}
