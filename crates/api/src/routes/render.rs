//! Storefront render endpoints.
//!
//! These are public and always answer 200 `text/html`. Anything that stops
//! a fragment from rendering yields an empty body.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use domain::models::{BadgeGroup, Placement, FOOTER_GROUP_ID};
use domain::services::BadgeRenderer;
use serde::Deserialize;

use crate::app::AppState;
use crate::middleware::metrics::record_render;

#[derive(Debug, Default, Deserialize)]
pub struct EmbedQuery {
    pub group: Option<String>,
}

fn html(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Active group by id, with storage failures logged and swallowed.
async fn load_active_group(state: &AppState, group_id: &str) -> Option<BadgeGroup> {
    match state.groups.get_active_by_id(group_id).await {
        Ok(row) => row.map(BadgeGroup::from),
        Err(e) => {
            tracing::error!(group_id, error = %e, "Failed to load badge group for render");
            None
        }
    }
}

fn render_markup(state: &AppState, group: &BadgeGroup) -> Option<String> {
    BadgeRenderer::new(&state.catalog, &state.render_options)
        .render_group(group)
        .map(|fragment| fragment.to_markup())
}

/// Fragment for a page-lifecycle signal.
///
/// GET /trust-badges/v1/render/:signal
pub async fn render_signal(State(state): State<AppState>, Path(signal): Path<String>) -> Response {
    let (signal, placement) = state.placement_router.resolve(&signal);

    let markup = match load_active_group(&state, placement.group_id()).await {
        Some(group) => {
            let settings = group.badge_settings().resolve();
            if state
                .placement_router
                .should_render(&signal, &group, &settings)
            {
                render_markup(&state, &group)
            } else {
                None
            }
        }
        None => None,
    };

    record_render(placement.group_id(), markup.is_some());
    tracing::debug!(signal = %signal, placement = %placement, emitted = markup.is_some(), "Render");
    html(markup.unwrap_or_default())
}

/// Fragment for any group by id, defaulting to the footer group.
///
/// GET /trust-badges/v1/embed?group=:id
pub async fn render_embed(
    State(state): State<AppState>,
    query: Result<Query<EmbedQuery>, QueryRejection>,
) -> Response {
    let requested = query.ok().and_then(|Query(q)| q.group);
    let group_id = requested
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(FOOTER_GROUP_ID);

    let markup = match load_active_group(&state, group_id).await {
        Some(group) => render_markup(&state, &group),
        None => None,
    };

    // User-created ids share one label.
    let placement = Placement::from_group_id(group_id);
    let label = if placement.is_builtin() {
        placement.group_id()
    } else {
        "custom"
    };
    record_render(label, markup.is_some());
    html(markup.unwrap_or_default())
}
