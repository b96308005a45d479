//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions), added in `main`
//! 2. Security headers
//! 3. `TraceLayer` (`http_request` span)
//! 4. Request ID (recorded on the span above)
//! 5. Cookie session (profile binding)

pub mod auth;
pub mod profile;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AccessRejection, RequireAdmin, RequireSession};
pub use profile::Profile;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
