//! Badge group repository: the settings store.

use domain::models::NewBadgeGroup;
use sqlx::PgPool;
use thiserror::Error;

use crate::entities::BadgeGroupEntity;
use crate::metrics::QueryTimer;

const GROUP_COLUMNS: &str = "seq, id, group_name, is_default, is_active, required_plugin, settings, created_at, updated_at";

/// Errors from badge group writes that callers must tell apart.
#[derive(Debug, Error)]
pub enum BadgeGroupError {
    #[error("Badge group not found: {0}")]
    NotFound(String),

    #[error("Default badge group cannot be deleted: {0}")]
    DefaultGroupProtected(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Repository for badge group database operations.
#[derive(Clone)]
pub struct BadgeGroupRepository {
    pool: PgPool,
}

impl BadgeGroupRepository {
    /// Creates a new BadgeGroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All groups in creation order, active or not.
    pub async fn list_all(&self) -> Result<Vec<BadgeGroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_badge_groups");
        let result = sqlx::query_as::<_, BadgeGroupEntity>(&format!(
            "SELECT {GROUP_COLUMNS} FROM badge_groups ORDER BY seq"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.observe(result)
    }

    /// Group by id for the render path: inactive groups are invisible.
    pub async fn get_active_by_id(
        &self,
        id: &str,
    ) -> Result<Option<BadgeGroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_active_badge_group");
        let result = sqlx::query_as::<_, BadgeGroupEntity>(&format!(
            "SELECT {GROUP_COLUMNS} FROM badge_groups WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(result)
    }

    /// Group by id for the admin path, including inactive groups.
    pub async fn get_any_by_id(&self, id: &str) -> Result<Option<BadgeGroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_badge_group");
        let result = sqlx::query_as::<_, BadgeGroupEntity>(&format!(
            "SELECT {GROUP_COLUMNS} FROM badge_groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(result)
    }

    /// Inserts the group, or overwrites name, active flag and settings of the
    /// existing row. `is_default` and `required_plugin` are never changed by
    /// the update branch.
    pub async fn upsert(&self, group: &NewBadgeGroup) -> Result<BadgeGroupEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_badge_group");
        let result = sqlx::query_as::<_, BadgeGroupEntity>(&format!(
            r#"
            INSERT INTO badge_groups (id, group_name, is_default, is_active, required_plugin, settings)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                group_name = EXCLUDED.group_name,
                is_active = EXCLUDED.is_active,
                settings = EXCLUDED.settings,
                updated_at = NOW()
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(&group.id)
        .bind(&group.name)
        .bind(group.is_default)
        .bind(group.is_active)
        .bind(group.required_plugin.map(|p| p.as_str()))
        .bind(group.settings.to_string())
        .fetch_one(&self.pool)
        .await;
        timer.observe(result)
    }

    /// Deletes a non-default group.
    ///
    /// The default flag is read under a row lock in the same transaction as
    /// the delete.
    pub async fn delete(&self, id: &str) -> Result<(), BadgeGroupError> {
        let timer = QueryTimer::new("delete_badge_group");
        let result: Result<(), BadgeGroupError> = async {
            let mut tx = self.pool.begin().await?;

            let is_default = sqlx::query_scalar::<_, bool>(
                "SELECT is_default FROM badge_groups WHERE id = $1 FOR UPDATE",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

            match is_default {
                None => return Err(BadgeGroupError::NotFound(id.to_string())),
                Some(true) => return Err(BadgeGroupError::DefaultGroupProtected(id.to_string())),
                Some(false) => {}
            }

            sqlx::query("DELETE FROM badge_groups WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok(())
        }
        .await;
        timer.record();
        result
    }

    /// Inserts whichever of `defaults` are missing, never touching existing
    /// rows. Returns the number of rows written.
    ///
    /// The already-seeded case costs a single count query.
    pub async fn ensure_defaults(&self, defaults: &[NewBadgeGroup]) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("ensure_default_badge_groups");
        let result: Result<u64, sqlx::Error> = async {
            let ids: Vec<String> = defaults.iter().map(|g| g.id.clone()).collect();
            let present = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM badge_groups WHERE id = ANY($1)",
            )
            .bind(&ids)
            .fetch_one(&self.pool)
            .await?;

            if present as usize >= defaults.len() {
                return Ok(0);
            }

            let mut tx = self.pool.begin().await?;
            let mut inserted = 0;
            for group in defaults {
                inserted += sqlx::query(
                    r#"
                    INSERT INTO badge_groups (id, group_name, is_default, is_active, required_plugin, settings)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (id) DO NOTHING
                    "#,
                )
                .bind(&group.id)
                .bind(&group.name)
                .bind(group.is_default)
                .bind(group.is_active)
                .bind(group.required_plugin.map(|p| p.as_str()))
                .bind(group.settings.to_string())
                .execute(&mut *tx)
                .await?
                .rows_affected();
            }
            tx.commit().await?;

            Ok(inserted)
        }
        .await;
        timer.observe(result)
    }

    /// Updates existing groups in one transaction.
    ///
    /// An id with no row aborts the batch with `NotFound` and rolls back every
    /// update already applied.
    pub async fn update_many(&self, groups: &[NewBadgeGroup]) -> Result<u64, BadgeGroupError> {
        let timer = QueryTimer::new("update_badge_groups");
        let result: Result<u64, BadgeGroupError> = async {
            let mut tx = self.pool.begin().await?;

            for group in groups {
                let affected = sqlx::query(
                    r#"
                    UPDATE badge_groups
                    SET group_name = $2, is_active = $3, settings = $4, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(&group.id)
                .bind(&group.name)
                .bind(group.is_active)
                .bind(group.settings.to_string())
                .execute(&mut *tx)
                .await?
                .rows_affected();

                if affected == 0 {
                    return Err(BadgeGroupError::NotFound(group.id.clone()));
                }
            }

            tx.commit().await?;
            Ok(groups.len() as u64)
        }
        .await;
        timer.record();
        result
    }
}
