//! Domain layer for the trust badges backend.
//!
//! This crate contains:
//! - Domain models (badge groups, typed badge settings, placements)
//! - The static badge catalog
//! - The pure HTML/CSS renderer and the placement router
//! - Default group seed data

pub mod models;
pub mod services;
