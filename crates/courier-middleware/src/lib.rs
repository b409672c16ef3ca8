//! # Courier Middleware
//!
//! The ordered request chain Courier endpoints are installed into.
//!
//! A [`Pipeline`] runs its stages in the order they were added. Each stage
//! either answers a request or hands it to the rest of the chain through
//! [`Next`]; a request nobody answers gets `404 Not Found`.
//!
//! ```text
//! Request → CorrelationToken → RequestLogging → Endpoint … → Redirect → 404
//!                                                                    ↓
//! Response ←─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Built-in stages
//!
//! | Stage | Purpose |
//! |-------|---------|
//! | [`CorrelationTokenMiddleware`](stages::CorrelationTokenMiddleware) | Resolve the correlation token and echo it on the response |
//! | [`RequestLoggingMiddleware`](stages::RequestLoggingMiddleware) | Log request and response lines through `tracing` |
//! | [`FnMiddleware`] / [`MapRequest`] | Ad-hoc stages from closures |
//!
//! Endpoint dispatch and the redirect fallback live in `courier-server`.

#![doc(html_root_url = "https://docs.rs/courier-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use context::MiddlewareContext;
pub use middleware::{BoxFuture, FnMiddleware, MapRequest, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder};
pub use stages::{CorrelationTokenMiddleware, CorrelationTokens, RequestLoggingMiddleware};
pub use types::{Request, Response, ResponseExt};
