//! Badge catalog listing for the badge picker.

use axum::{extract::State, Json};
use domain::services::BadgeCatalogEntry;
use serde::Serialize;

use crate::app::AppState;
use crate::extractors::AdminSession;

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub badges: Vec<BadgeCatalogEntry>,
    /// Base URL image file names resolve against.
    #[serde(rename = "assetBaseUrl")]
    pub asset_base_url: String,
}

/// GET /trust-badges/v1/catalog
pub async fn list_catalog(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        badges: state.catalog.entries().to_vec(),
        asset_base_url: state.render_options.asset_base_url.clone(),
    })
}
