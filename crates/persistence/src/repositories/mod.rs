//! Repository implementations for database operations.

pub mod badge;
pub mod badge_group;

pub use badge::BadgeRepository;
pub use badge_group::{BadgeGroupError, BadgeGroupRepository};
