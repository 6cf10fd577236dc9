//! Legacy badge record listing.

use axum::{extract::State, Json};
use domain::models::{Badge, BadgeListResponse};

use crate::app::AppState;
use crate::error::ApiError;

/// List active badge records ordered by position.
///
/// GET /trust-badges/v1/badges
///
/// Public and rate limited per client address.
pub async fn list_badges(State(state): State<AppState>) -> Result<Json<BadgeListResponse>, ApiError> {
    let badges = state
        .cache
        .badges(|| async {
            let rows = state.badges.list_active().await?;
            Ok::<_, ApiError>(rows.into_iter().map(Badge::from).collect())
        })
        .await?;

    Ok(Json(BadgeListResponse {
        badges: badges.as_ref().clone(),
    }))
}
