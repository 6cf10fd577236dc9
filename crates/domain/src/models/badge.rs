//! Legacy badge records listed by the public `/badges` endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single badge record, independent of badge groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Badge {
    pub id: i64,
    pub badge_name: String,
    pub badge_image: String,
    pub badge_link: Option<String>,
    pub position: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response body for `GET /badges`.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeListResponse {
    pub badges: Vec<Badge>,
}
