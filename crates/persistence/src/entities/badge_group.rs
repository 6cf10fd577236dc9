//! Badge group entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{BadgeGroup, RequiredPlugin};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// Database row mapping for the badge_groups table.
#[derive(Debug, Clone, FromRow)]
pub struct BadgeGroupEntity {
    pub seq: i64,
    pub id: String,
    pub group_name: String,
    pub is_default: bool,
    pub is_active: bool,
    pub required_plugin: Option<String>,
    /// Serialized JSON object.
    pub settings: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BadgeGroupEntity> for BadgeGroup {
    fn from(entity: BadgeGroupEntity) -> Self {
        let settings = match serde_json::from_str::<Value>(&entity.settings) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) | Err(_) => {
                tracing::warn!(group_id = %entity.id, "Stored settings are not a JSON object");
                Value::Object(Map::new())
            }
        };

        BadgeGroup {
            id: entity.id,
            name: entity.group_name,
            is_default: entity.is_default,
            is_active: entity.is_active,
            required_plugin: entity
                .required_plugin
                .as_deref()
                .and_then(|p| p.parse::<RequiredPlugin>().ok()),
            settings,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(settings: &str, required_plugin: Option<&str>) -> BadgeGroupEntity {
        BadgeGroupEntity {
            seq: 1,
            id: "footer".to_string(),
            group_name: "Footer".to_string(),
            is_default: true,
            is_active: true,
            required_plugin: required_plugin.map(str::to_string),
            settings: settings.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_to_domain() {
        let group: BadgeGroup = entity(r#"{"position":"left"}"#, Some("edd")).into();
        assert_eq!(group.id, "footer");
        assert_eq!(group.name, "Footer");
        assert_eq!(group.required_plugin, Some(RequiredPlugin::Edd));
        assert_eq!(group.settings, json!({ "position": "left" }));
    }

    #[test]
    fn test_unreadable_settings_become_empty_object() {
        let group: BadgeGroup = entity("not json", None).into();
        assert_eq!(group.settings, json!({}));

        let group: BadgeGroup = entity("[1,2]", None).into();
        assert_eq!(group.settings, json!({}));
    }

    #[test]
    fn test_unknown_required_plugin_is_none() {
        let group: BadgeGroup = entity("{}", Some("shopify")).into();
        assert_eq!(group.required_plugin, None);
    }
}
