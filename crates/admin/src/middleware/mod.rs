//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Security headers
//!
//! Route protection is not a layer: `/dashboard` handlers take the
//! [`AdminSession`] extractor, which runs the [`guard`] for the request.

pub mod auth;
pub mod guard;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AdminSession, AdminSessionRejection};
pub use guard::{AdminRoute, GateDecision, GuardState, Rendering, RouteGuard, role_gate};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
