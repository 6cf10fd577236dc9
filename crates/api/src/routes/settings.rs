//! Settings API: admin reads and writes of badge groups.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    is_default_group_id, BadgeGroup, BulkUpdateRequest, GroupListResponse, GroupResponse,
    MessageResponse, NewBadgeGroup, UpsertGroupRequest,
};
use std::collections::HashMap;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminSession, AdminWrite};
use crate::middleware::metrics::record_settings_write;

/// Loads every group through the list cache.
async fn all_groups(state: &AppState) -> Result<Vec<BadgeGroup>, ApiError> {
    let groups = state
        .cache
        .groups(|| async {
            let rows = state.groups.list_all().await?;
            Ok::<_, ApiError>(rows.into_iter().map(BadgeGroup::from).collect())
        })
        .await?;
    Ok(groups.as_ref().clone())
}

/// List all groups.
///
/// GET /trust-badges/v1/settings
pub async fn list_groups(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<GroupListResponse>, ApiError> {
    let groups = all_groups(&state).await?;
    Ok(Json(GroupListResponse { groups }))
}

/// Fetch a single group, active or not.
///
/// GET /trust-badges/v1/settings/group/:id
pub async fn get_group(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<GroupResponse>, ApiError> {
    let group = state
        .groups
        .get_any_by_id(&id)
        .await?
        .map(BadgeGroup::from)
        .ok_or_else(|| ApiError::NotFound(format!("Badge group '{id}' not found")))?;

    Ok(Json(GroupResponse {
        success: true,
        group,
    }))
}

/// Create or update one group.
///
/// POST /trust-badges/v1/settings/group
///
/// Returns 201 when the group was created and 200 when it was updated.
pub async fn upsert_group(
    State(state): State<AppState>,
    AdminWrite(admin): AdminWrite,
    body: Result<Json<UpsertGroupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    let Json(request) = body?;
    let payload = request.group;
    let id = payload.group_id()?.to_string();

    let existing = state.groups.get_any_by_id(&id).await?.map(BadgeGroup::from);
    let row = payload.prepare(existing.as_ref())?;
    let saved = BadgeGroup::from(state.groups.upsert(&row).await?);

    state.cache.invalidate_groups().await;
    record_settings_write("upsert");

    let status = if existing.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    info!(
        group_id = %saved.id,
        user_id = %admin.user_id,
        created = existing.is_none(),
        "Badge group saved"
    );

    Ok((
        status,
        Json(GroupResponse {
            success: true,
            group: saved,
        }),
    ))
}

/// Update several existing groups atomically.
///
/// POST /trust-badges/v1/settings
///
/// Every payload is validated before anything is written. An unknown id
/// fails the whole batch with `not_found`.
pub async fn bulk_update(
    State(state): State<AppState>,
    AdminWrite(admin): AdminWrite,
    body: Result<Json<BulkUpdateRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = body?;
    if request.groups.is_empty() {
        return Err(ApiError::Validation("No groups to update".to_string()));
    }

    let stored: HashMap<String, BadgeGroup> = state
        .groups
        .list_all()
        .await?
        .into_iter()
        .map(|row| {
            let group = BadgeGroup::from(row);
            (group.id.clone(), group)
        })
        .collect();

    let mut rows: Vec<NewBadgeGroup> = Vec::with_capacity(request.groups.len());
    for (index, payload) in request.groups.iter().enumerate() {
        let id = payload
            .group_id()
            .map_err(|e| ApiError::Validation(format!("groups[{index}]: {e}")))?;
        let existing = stored.get(id).ok_or_else(|| {
            ApiError::NotFound(format!("groups[{index}]: badge group '{id}' not found"))
        })?;
        let row = payload
            .prepare(Some(existing))
            .map_err(|e| ApiError::Validation(format!("groups[{index}] ({id}): {e}")))?;
        rows.push(row);
    }

    let updated = state.groups.update_many(&rows).await?;

    state.cache.invalidate_groups().await;
    record_settings_write("bulk_update");
    info!(count = updated, user_id = %admin.user_id, "Badge groups updated");

    Ok(Json(MessageResponse::ok("Settings saved successfully")))
}

/// Delete a non-default group.
///
/// DELETE /trust-badges/v1/settings/group/:id
pub async fn delete_group(
    State(state): State<AppState>,
    AdminWrite(admin): AdminWrite,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if is_default_group_id(&id) {
        return Err(ApiError::DeleteFailed(format!(
            "Cannot delete default group '{id}'"
        )));
    }
    state.groups.delete(&id).await?;

    state.cache.invalidate_groups().await;
    record_settings_write("delete");
    info!(group_id = %id, user_id = %admin.user_id, "Badge group deleted");

    Ok(Json(MessageResponse::ok("Group deleted successfully")))
}
