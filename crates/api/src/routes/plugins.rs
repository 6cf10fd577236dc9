//! Host integration status for the admin UI.

use axum::{extract::State, Json};
use domain::models::ActiveIntegrations;

use crate::app::AppState;
use crate::extractors::AdminSession;

/// Which e-commerce integrations are active on the host site.
///
/// GET /trust-badges/v1/installed-plugins
pub async fn installed_plugins(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Json<ActiveIntegrations> {
    Json(state.placement_router.integrations())
}
