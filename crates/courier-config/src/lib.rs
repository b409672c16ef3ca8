//! Typed configuration for Courier services.
//!
//! [`CourierConfig`] holds everything a service host needs: where to listen,
//! how to log, which header carries the correlation token, where remote
//! contracts live, and which redirect fallbacks to install. Values come from
//! defaults, a TOML or JSON file, and `COURIER__SECTION__KEY` environment
//! variables, in that order. Unknown fields are rejected.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:5001"
//! shutdown_timeout_secs = 30
//!
//! [logging]
//! level = "info,courier_server=debug"
//! json_format = true
//! service_name = "gateway"
//!
//! [correlation]
//! header = "Correlation-Token"
//!
//! [endpoints.Orders]
//! base_url = "http://orders:5001/api/orders"
//! content_type = "application/json"
//!
//! [[redirects]]
//! contract = "Catalog"
//! prefix = "api/catalog"
//! base_url = "http://catalog:5002"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
