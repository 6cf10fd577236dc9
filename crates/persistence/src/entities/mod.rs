//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod badge;
pub mod badge_group;

pub use badge::BadgeEntity;
pub use badge_group::BadgeGroupEntity;
