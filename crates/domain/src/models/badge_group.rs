//! Badge group domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::validation::validate_group_id;
use thiserror::Error;
use validator::Validate;

use super::badge_settings::{
    lenient, validate_settings_document, BadgeSettings, SettingsDocumentError,
};
use super::placement::{Placement, RequiredPlugin};

/// A named configuration bundle controlling where and how a set of badges renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeGroup {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub is_active: bool,
    pub required_plugin: Option<RequiredPlugin>,
    pub settings: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BadgeGroup {
    pub fn placement(&self) -> Placement {
        Placement::from_group_id(&self.id)
    }

    /// Typed view of the settings document.
    pub fn badge_settings(&self) -> BadgeSettings {
        BadgeSettings::from_value(&self.settings)
    }
}

/// A group as written to storage.
///
/// `is_default` and `required_plugin` only take effect when the row is
/// first inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBadgeGroup {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub is_active: bool,
    pub required_plugin: Option<RequiredPlugin>,
    pub settings: Value,
}

/// A group as sent by the admin UI. Everything except `id` and `settings`
/// may be omitted.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_default: Option<bool>,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: Option<bool>,

    #[serde(default, deserialize_with = "lenient::parsed")]
    pub required_plugin: Option<RequiredPlugin>,

    #[serde(default)]
    pub settings: Option<Value>,
}

/// Request body for `POST /settings/group`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertGroupRequest {
    pub group: GroupPayload,
}

/// Request body for `POST /settings`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateRequest {
    pub groups: Vec<GroupPayload>,
}

/// Response body for `GET /settings`.
#[derive(Debug, Clone, Serialize)]
pub struct GroupListResponse {
    pub groups: Vec<BadgeGroup>,
}

/// Response body for single-group reads and upserts.
#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    pub success: bool,
    pub group: BadgeGroup,
}

/// Response body for bulk updates and deletes.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// A write payload that cannot be turned into a stored group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupPayloadError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("{0}")]
    Settings(#[from] SettingsDocumentError),
}

impl GroupPayload {
    /// Validated group id of the payload.
    pub fn group_id(&self) -> Result<&str, GroupPayloadError> {
        let id = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(GroupPayloadError::MissingField("group.id"))?;

        validate_group_id(id).map_err(|e| GroupPayloadError::InvalidField {
            field: "group.id".to_string(),
            message: e
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string()),
        })?;

        Ok(id)
    }

    /// Checks the payload shape without touching storage.
    pub fn check(&self) -> Result<(), GroupPayloadError> {
        self.group_id()?;

        self.validate()
            .map_err(|e| GroupPayloadError::InvalidField {
                field: "group.name".to_string(),
                message: e.to_string(),
            })?;

        let settings = self
            .settings
            .as_ref()
            .ok_or(GroupPayloadError::MissingField("group.settings"))?;
        validate_settings_document(settings)?;

        Ok(())
    }

    /// Builds the row to write, merging over `existing` when the group is
    /// already stored.
    ///
    /// Partial settings are merged key by key over the stored document. On
    /// update, `is_default` and `required_plugin` are carried over from the
    /// stored row.
    pub fn prepare(&self, existing: Option<&BadgeGroup>) -> Result<NewBadgeGroup, GroupPayloadError> {
        self.check()?;
        let id = self.group_id()?.to_string();
        let patch = self.settings.clone().unwrap_or_else(|| Value::Object(Map::new()));
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        match existing {
            Some(current) => Ok(NewBadgeGroup {
                id,
                name: name.unwrap_or_else(|| current.name.clone()),
                is_default: current.is_default,
                is_active: self.is_active.unwrap_or(current.is_active),
                required_plugin: current.required_plugin,
                settings: merge_settings(&current.settings, &patch),
            }),
            None => Ok(NewBadgeGroup {
                id,
                name: name.ok_or(GroupPayloadError::MissingField("group.name"))?,
                is_default: self.is_default.unwrap_or(false),
                is_active: self.is_active.unwrap_or(true),
                required_plugin: self.required_plugin,
                settings: patch,
            }),
        }
    }
}

/// Shallow merge of a settings patch over a stored settings document.
///
/// Keys present in `patch` replace the stored value; other stored keys are
/// kept. A stored document that is not an object is treated as empty.
pub fn merge_settings(current: &Value, patch: &Value) -> Value {
    let mut merged = match current {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    if let Value::Object(patch) = patch {
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(id: &str) -> BadgeGroup {
        BadgeGroup {
            id: id.to_string(),
            name: "Footer".to_string(),
            is_default: true,
            is_active: true,
            required_plugin: None,
            settings: json!({ "badgeGap": "10", "position": "center", "selectedBadges": ["visa1color"] }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payload(value: Value) -> GroupPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_payload_deserializes_admin_shape() {
        let p = payload(json!({
            "id": "sale",
            "name": "Summer sale",
            "isActive": "1",
            "requiredPlugin": "woocommerce",
            "settings": { "badgeStyle": "card" }
        }));
        assert_eq!(p.id.as_deref(), Some("sale"));
        assert_eq!(p.is_active, Some(true));
        assert_eq!(p.required_plugin, Some(RequiredPlugin::Woocommerce));
    }

    #[test]
    fn test_empty_required_plugin_is_none() {
        let p = payload(json!({ "id": "x", "requiredPlugin": "", "settings": {} }));
        assert_eq!(p.required_plugin, None);
        let p = payload(json!({ "id": "x", "requiredPlugin": null, "settings": {} }));
        assert_eq!(p.required_plugin, None);
    }

    #[test]
    fn test_missing_id_rejected() {
        let p = payload(json!({ "name": "x", "settings": {} }));
        assert_eq!(p.check(), Err(GroupPayloadError::MissingField("group.id")));

        let p = payload(json!({ "id": "  ", "settings": {} }));
        assert_eq!(p.check(), Err(GroupPayloadError::MissingField("group.id")));
    }

    #[test]
    fn test_missing_settings_rejected() {
        let p = payload(json!({ "id": "footer" }));
        assert_eq!(p.check(), Err(GroupPayloadError::MissingField("group.settings")));
    }

    #[test]
    fn test_invalid_id_rejected() {
        let p = payload(json!({ "id": "<b>", "settings": {} }));
        assert!(matches!(p.check(), Err(GroupPayloadError::InvalidField { .. })));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let p = payload(json!({ "id": "footer", "settings": { "badgeColor": "red" } }));
        assert!(matches!(p.check(), Err(GroupPayloadError::Settings(_))));

        let p = payload(json!({ "id": "footer", "settings": [] }));
        assert_eq!(
            p.check(),
            Err(GroupPayloadError::Settings(SettingsDocumentError::NotAnObject))
        );
    }

    #[test]
    fn test_prepare_update_merges_settings() {
        let current = stored("footer");
        let p = payload(json!({
            "id": "footer",
            "isDefault": false,
            "settings": { "position": "left" }
        }));

        let row = p.prepare(Some(&current)).unwrap();
        assert_eq!(row.name, "Footer");
        assert!(row.is_default);
        assert!(row.is_active);
        assert_eq!(row.settings["position"], "left");
        assert_eq!(row.settings["badgeGap"], "10");
        assert_eq!(row.settings["selectedBadges"], json!(["visa1color"]));
    }

    #[test]
    fn test_prepare_update_can_deactivate_and_rename() {
        let current = stored("footer");
        let p = payload(json!({
            "id": "footer",
            "name": "Site footer",
            "isActive": false,
            "settings": {}
        }));

        let row = p.prepare(Some(&current)).unwrap();
        assert_eq!(row.name, "Site footer");
        assert!(!row.is_active);
        assert_eq!(row.settings, current.settings);
    }

    #[test]
    fn test_prepare_insert_defaults() {
        let p = payload(json!({
            "id": "sale",
            "name": "Sale",
            "settings": { "badgeStyle": "mono" }
        }));

        let row = p.prepare(None).unwrap();
        assert!(!row.is_default);
        assert!(row.is_active);
        assert_eq!(row.required_plugin, None);
        assert_eq!(row.settings, json!({ "badgeStyle": "mono" }));
    }

    #[test]
    fn test_prepare_insert_requires_name() {
        let p = payload(json!({ "id": "sale", "settings": {} }));
        assert_eq!(
            p.prepare(None),
            Err(GroupPayloadError::MissingField("group.name"))
        );
    }

    #[test]
    fn test_name_length_validated() {
        let p = GroupPayload {
            id: Some("sale".into()),
            name: Some("x".repeat(201)),
            settings: Some(json!({})),
            ..Default::default()
        };
        assert!(matches!(p.check(), Err(GroupPayloadError::InvalidField { .. })));
    }

    #[test]
    fn test_merge_settings() {
        let merged = merge_settings(&json!({ "a": 1, "b": 2 }), &json!({ "b": 3, "c": 4 }));
        assert_eq!(merged, json!({ "a": 1, "b": 3, "c": 4 }));

        let merged = merge_settings(&json!("garbage"), &json!({ "a": 1 }));
        assert_eq!(merged, json!({ "a": 1 }));
    }

    #[test]
    fn test_group_serializes_camel_case() {
        let value = serde_json::to_value(stored("footer")).unwrap();
        assert_eq!(value["isDefault"], true);
        assert_eq!(value["isActive"], true);
        assert!(value["requiredPlugin"].is_null());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_group_placement() {
        assert_eq!(stored("footer").placement(), Placement::Footer);
        assert_eq!(
            stored("sale").placement(),
            Placement::Custom("sale".to_string())
        );
    }
}
