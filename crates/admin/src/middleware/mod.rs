//! HTTP middleware for admin: authentication and sessions.

pub mod auth;
pub mod session;

pub use auth::{RequireAdminAuth, clear_current_admin, set_current_admin};
pub use session::{create_session_layer, create_session_store};
