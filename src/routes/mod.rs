//! Router module index.
//!
//! Organizes the application's routing logic into security-segregated modules
//! so access control is applied explicitly at the module level (via Axum
//! layers) instead of being re-checked handler by handler.

/// Routes accessible to any client: liveness, diagnostics, and the read-only
/// map/lore surface the game and website consume.
pub mod public;

/// Routes under /api/admin. Everything except login sits behind the
/// AdminToken guard layer.
pub mod admin;
