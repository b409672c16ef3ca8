//! Logging setup for Courier services.
//!
//! Courier's crates emit `tracing` events (dispatch at `debug`, rejected
//! requests at `warn`, failed invocations at `error`, redirects at `info`).
//! [`init_logging`] installs a `tracing-subscriber` that writes them as JSON
//! lines or pretty text, filtered with `EnvFilter` directives.
//!
//! ```rust,ignore
//! use courier_telemetry::{init_logging, LogConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&LogConfig::development().with_service_name("gateway"))?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/courier-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
