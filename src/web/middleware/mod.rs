//! Middleware for the HTTP surface.

pub mod auth;
pub mod cors;

pub use auth::{auth_gate, CurrentUser, OptionalCurrentUser};
pub use cors::create_cors_layer;
