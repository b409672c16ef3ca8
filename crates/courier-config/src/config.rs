//! Configuration types.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use courier_core::ContentType;
use courier_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default HTTP listen address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Default correlation header name.
pub const DEFAULT_CORRELATION_HEADER: &str = "Correlation-Token";

/// Configuration of one Courier service.
///
/// Every section has defaults, so an empty file is a valid configuration.
/// Unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CourierConfig {
    /// HTTP server settings.
    pub server: ServerSection,

    /// Logging settings.
    pub logging: LogConfig,

    /// Correlation token settings.
    pub correlation: CorrelationConfig,

    /// Remote endpoints, keyed by contract name.
    pub endpoints: BTreeMap<String, EndpointConfig>,

    /// Redirect fallbacks, installed in order.
    pub redirects: Vec<RedirectConfig>,
}

impl CourierConfig {
    /// Debug-level, human-readable logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// JSON logging.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            ..Self::default()
        }
    }

    /// Returns the endpoint configured for a contract.
    #[must_use]
    pub fn endpoint(&self, contract: &str) -> Option<&EndpointConfig> {
        self.endpoints.get(contract)
    }

    /// Checks every value that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;

        if self.server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "server.shutdown_timeout_secs",
                "must be greater than zero",
            ));
        }

        courier_telemetry::create_env_filter(&self.logging.level)
            .map_err(|e| ConfigError::invalid("logging.level", e.to_string()))?;

        http::HeaderName::from_bytes(self.correlation.header.as_bytes()).map_err(|_| {
            ConfigError::invalid(
                "correlation.header",
                format!("{:?} is not a valid header name", self.correlation.header),
            )
        })?;

        for (contract, endpoint) in &self.endpoints {
            validate_url(&format!("endpoints.{contract}.base_url"), &endpoint.base_url)?;
        }

        for (i, redirect) in self.redirects.iter().enumerate() {
            if redirect.contract.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("redirects[{i}].contract"),
                    "must not be empty",
                ));
            }
            validate_url(&format!("redirects[{i}].base_url"), &redirect.base_url)?;
        }

        Ok(())
    }
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    let uri: http::Uri = url
        .parse()
        .map_err(|e: http::uri::InvalidUri| ConfigError::invalid(field, e.to_string()))?;
    match uri.scheme_str() {
        Some("http" | "https") if uri.authority().is_some() => Ok(()),
        _ => Err(ConfigError::invalid(
            field,
            format!("{url:?} is not an absolute http(s) URL"),
        )),
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Listen address.
    pub http_addr: String,

    /// Seconds to wait for open connections on shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout_secs: 30,
        }
    }
}

impl ServerSection {
    /// Parses the listen address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.http_addr.parse().map_err(|_| {
            ConfigError::invalid(
                "server.http_addr",
                format!("{:?} is not a socket address", self.http_addr),
            )
        })
    }
}

/// Correlation token settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorrelationConfig {
    /// Header carrying the token.
    pub header: String,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            header: DEFAULT_CORRELATION_HEADER.to_string(),
        }
    }
}

/// Where a contract is served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Base URL, including any mount path.
    pub base_url: String,

    /// Body format for calls made outside a request scope.
    #[serde(default)]
    pub content_type: ContentType,
}

/// A redirect fallback for a contract hosted elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedirectConfig {
    /// Contract name.
    pub contract: String,

    /// Local path prefix the contract is reached under.
    #[serde(default)]
    pub prefix: String,

    /// Base URL of the remote owner.
    pub base_url: String,
}
