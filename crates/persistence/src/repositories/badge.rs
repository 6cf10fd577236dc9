//! Legacy badge record repository.

use sqlx::PgPool;

use crate::entities::BadgeEntity;
use crate::metrics::QueryTimer;

/// Repository for the standalone `badges` table.
#[derive(Clone)]
pub struct BadgeRepository {
    pool: PgPool,
}

impl BadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active badges ordered by position.
    pub async fn list_active(&self) -> Result<Vec<BadgeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_badges");
        let result = sqlx::query_as::<_, BadgeEntity>(
            r#"
            SELECT id, badge_name, badge_image, badge_link, position, is_active, created_at, updated_at
            FROM badges
            WHERE is_active = TRUE
            ORDER BY position, id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.observe(result)
    }

    pub async fn create(
        &self,
        badge_name: &str,
        badge_image: &str,
        badge_link: Option<&str>,
        position: i32,
        is_active: bool,
    ) -> Result<BadgeEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_badge");
        let result = sqlx::query_as::<_, BadgeEntity>(
            r#"
            INSERT INTO badges (badge_name, badge_image, badge_link, position, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, badge_name, badge_image, badge_link, position, is_active, created_at, updated_at
            "#,
        )
        .bind(badge_name)
        .bind(badge_image)
        .bind(badge_link)
        .bind(position)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await;
        timer.observe(result)
    }
}
