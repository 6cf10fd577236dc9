//! Domain services for trust badges.
//!
//! Services are pure: they read domain models and produce values, never
//! touching storage.

pub mod catalog;
pub mod placement_router;
pub mod renderer;

pub use catalog::{BadgeCatalog, BadgeCatalogEntry, CatalogError};
pub use placement_router::{group_for_signal, PlacementRouter};
pub use renderer::{BadgeRenderer, RenderOptions, RenderedFragment};
