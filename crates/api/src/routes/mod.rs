//! HTTP route handlers.

pub mod badges;
pub mod catalog;
pub mod health;
pub mod plugins;
pub mod render;
pub mod session;
pub mod settings;
