//! Built-in middleware stages.
//!
//! - [`correlation`] - resolve and echo the correlation token
//! - [`request_logging`] - log requests and responses

pub mod correlation;
pub mod request_logging;

pub use correlation::{CorrelationTokenMiddleware, CorrelationTokens, CORRELATION_TOKEN_HEADER};
pub use request_logging::RequestLoggingMiddleware;
