//! HTTP surface.
//!
//! The `/api/v1` routes sit behind the request gate; the account routes
//! (registration, login, profile, password reset) manage their own session
//! cookie.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::{create_app, create_router};
pub use server::WebServer;
