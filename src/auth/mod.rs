//! Authentication
//!
//! JWT credentials, per-user sessions, and the request authentication gate.

pub mod jwt;
pub mod middleware;
pub mod session;

pub use jwt::{Claims, CurrentUser, TokenConfig, TokenError, TokenService};
pub use middleware::{require_auth, require_role};
pub use session::SessionStore;
