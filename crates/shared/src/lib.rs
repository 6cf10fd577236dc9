//! Shared utilities for the trust badges backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Hashing and anti-forgery nonce derivation
//! - Admin session tokens (JWT)
//! - Field validators for badge group payloads

pub mod crypto;
pub mod jwt;
pub mod validation;
