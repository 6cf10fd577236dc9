//! Domain models for trust badges.

pub mod badge;
pub mod badge_group;
pub mod badge_settings;
pub mod defaults;
pub mod placement;

pub use badge::{Badge, BadgeListResponse};
pub use badge_group::{
    merge_settings, BadgeGroup, BulkUpdateRequest, GroupListResponse, GroupPayload,
    GroupPayloadError, GroupResponse, MessageResponse, NewBadgeGroup, UpsertGroupRequest,
};
pub use badge_settings::{
    Alignment, Animation, BadgeSettings, BadgeSize, BadgeStyle, Margin, ResolvedSettings,
    SettingsDocumentError,
};
pub use defaults::{default_groups, is_default_group_id, DEFAULT_GROUP_IDS};
pub use placement::{
    ActiveIntegrations, Placement, PlacementSignal, RequiredPlugin, CHECKOUT_GROUP_ID,
    FOOTER_GROUP_ID, PRODUCT_PAGE_GROUP_ID,
};
