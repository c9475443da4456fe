//! Lectern Observability
//!
//! - Tracing, with an optional OpenTelemetry OTLP exporter
//! - Prometheus metrics for HTTP traffic and session lifecycle events
//! - Per-request logging middleware
//!
//! Everything beyond console logging sits behind the `observability` feature
//! (on by default). At runtime `OBSERVABILITY_ENABLED=false` falls back to
//! console logging and turns metrics into no-ops.
//!
//! ```no_run
//! use lectern_observability::{init_tracing, shutdown_tracer};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     // ... application code ...
//!     shutdown_tracer().await;
//! }
//! ```

pub mod basic_logging;
#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, logging_middleware, shutdown_tracer};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, is_observability_enabled, metrics_app, metrics_middleware,
    track_authorization_check, track_login_failure, track_refresh_denied, track_session_created,
    track_session_refreshed, track_sessions_revoked, track_tokens_swept,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{Router, extract::Request, middleware::Next, response::Response};

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    /// Console logging only.
    pub fn init_tracing() {
        super::init_basic_console_logging();
    }

    pub async fn shutdown_tracer() {}

    pub fn init_metrics() -> Option<()> {
        None
    }

    pub fn metrics_app(_handle: ()) -> Router {
        Router::new()
    }

    pub fn track_session_created(_role: &str) {}
    pub fn track_session_refreshed() {}
    pub fn track_refresh_denied(_reason: &str) {}
    pub fn track_sessions_revoked(_scope: &str, _count: u64) {}
    pub fn track_tokens_swept(_count: u64) {}
    pub fn track_login_failure(_reason: &str) {}
    pub fn track_authorization_check(_allowed: bool, _role: &str) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
