//! Legacy badge entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Badge;
use sqlx::FromRow;

/// Database row mapping for the badges table.
#[derive(Debug, Clone, FromRow)]
pub struct BadgeEntity {
    pub id: i64,
    pub badge_name: String,
    pub badge_image: String,
    pub badge_link: Option<String>,
    pub position: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BadgeEntity> for Badge {
    fn from(entity: BadgeEntity) -> Self {
        Badge {
            id: entity.id,
            badge_name: entity.badge_name,
            badge_image: entity.badge_image,
            badge_link: entity.badge_link,
            position: entity.position,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
