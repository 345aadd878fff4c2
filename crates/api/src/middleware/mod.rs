//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. CORS (open, so any frontend can consume the API)
//! 3. `TraceLayer` (per-request audit line)
//! 4. Request ID (add unique ID to each request)
//! 5. Rate limiting (governor, auth route group only)

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{CurrentUser, RequireAuth, bearer_token};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
