//! Layered configuration loading.
//!
//! Layers apply in order, later ones winning:
//! 1. defaults (or a preset),
//! 2. a TOML or JSON file or string,
//! 3. `PREFIX__SECTION__KEY` environment variables.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, CourierConfig, EndpointConfig};

/// Configuration loader.
///
/// ```no_run
/// use courier_config::ConfigLoader;
///
/// # fn main() -> Result<(), courier_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("courier.toml")?
///     .with_env_prefix("COURIER")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: CourierConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader holding the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CourierConfig::default(),
            env_prefix: None,
        }
    }

    /// Resets to the defaults.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = CourierConfig::default();
        self
    }

    /// Starts from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = CourierConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = CourierConfig::production();
        self
    }

    /// Loads a `.toml` or `.json` file, replacing the current values.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        self.with_string(&content, &format)
    }

    /// Loads a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration text in `format` (`toml` or `json`).
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::Format(format.to_string())),
        };
        Ok(self)
    }

    /// Applies `PREFIX__SECTION__KEY` environment variables on load.
    ///
    /// - `COURIER__SERVER__HTTP_ADDR=0.0.0.0:9000`
    /// - `COURIER__LOGGING__LEVEL=debug`
    /// - `COURIER__ENDPOINTS__ORDERS__BASE_URL=http://orders:5001`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads a `.env` file into the process environment, if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "failed to load .env file");
            }
        }
        self
    }

    /// Applies environment overrides and validates.
    pub fn load(mut self) -> Result<CourierConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(k, _)| k.starts_with(&format!("{prefix}__")))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> CourierConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let rest = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env(key, "invalid key format"))?;
        let parts: Vec<&str> = rest.split("__").collect();

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => self.config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env(key, "expected integer"))?;
            }

            ["LOGGING", "ENABLED"] => self.config.logging.enabled = bool_var(key, value)?,
            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "JSON_FORMAT"] => self.config.logging.json_format = bool_var(key, value)?,
            ["LOGGING", "SERVICE_NAME"] => self.config.logging.service_name = value.to_string(),

            ["CORRELATION", "HEADER"] => self.config.correlation.header = value.to_string(),

            ["ENDPOINTS", contract, field] => {
                let name = self
                    .config
                    .endpoints
                    .keys()
                    .find(|k| k.eq_ignore_ascii_case(contract))
                    .cloned()
                    .unwrap_or_else(|| (*contract).to_string());
                let endpoint = self
                    .config
                    .endpoints
                    .entry(name)
                    .or_insert_with(|| EndpointConfig {
                        base_url: String::new(),
                        content_type: courier_core::ContentType::Json,
                    });
                match *field {
                    "BASE_URL" => endpoint.base_url = value.to_string(),
                    "CONTENT_TYPE" => {
                        endpoint.content_type = value
                            .parse()
                            .map_err(|_| ConfigError::env(key, "expected a content type"))?;
                    }
                    _ => return Err(ConfigError::env(key, "unknown endpoint field")),
                }
            }

            _ => return Err(ConfigError::env(key, "unknown configuration key")),
        }

        Ok(())
    }
}

fn bool_var(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env(key, "expected boolean"))
}

/// Parses `true/false`, `1/0`, `yes/no` and `on/off`, ignoring case.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::ContentType;
    use std::io::Write;

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_loader_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_loader_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [server]
            http_addr = "127.0.0.1:5001"

            [endpoints.Orders]
            base_url = "http://orders:5001/api"
            content_type = "application/xml"

            [[redirects]]
            contract = "Orders"
            prefix = "api/orders"
            base_url = "http://host:5002"
            "#
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:5001");
        let orders = config.endpoint("Orders").unwrap();
        assert_eq!(orders.base_url, "http://orders:5001/api");
        assert_eq!(orders.content_type, ContentType::Xml);
        assert_eq!(config.redirects[0].prefix, "api/orders");
    }

    #[test]
    fn test_loader_json_string() {
        let config = ConfigLoader::new()
            .with_string(r#"{"correlation":{"header":"X-Correlation"}}"#, "json")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.correlation.header, "X-Correlation");
    }

    #[test]
    fn test_loader_missing_file() {
        let result = ConfigLoader::new().with_file("/nonexistent/courier.toml");
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
        assert!(ConfigLoader::new()
            .with_optional_file("/nonexistent/courier.toml")
            .is_ok());
    }

    #[test]
    fn test_loader_rejects_unknown_fields() {
        let result = ConfigLoader::new().with_string("[server]\nport = 1\n", "toml");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_loader_rejects_unknown_format() {
        assert!(ConfigLoader::new().with_string("", "yaml").is_err());
    }

    #[test]
    fn test_loader_validates() {
        let result = ConfigLoader::new()
            .with_string("[server]\nhttp_addr = \"nowhere\"\n", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
        let unvalidated = ConfigLoader::new()
            .with_string("[server]\nhttp_addr = \"nowhere\"\n", "toml")
            .unwrap()
            .load_unvalidated();
        assert_eq!(unvalidated.server.http_addr, "nowhere");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_apply_env_var_server() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__SERVER__HTTP_ADDR", "192.168.1.1:9000", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__SERVER__SHUTDOWN_TIMEOUT_SECS", "5", "TEST")
            .unwrap();
        assert_eq!(loader.config.server.http_addr, "192.168.1.1:9000");
        assert_eq!(loader.config.server.shutdown_timeout_secs, 5);
        assert!(loader
            .apply_env_var("TEST__SERVER__SHUTDOWN_TIMEOUT_SECS", "soon", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_logging() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__LOGGING__LEVEL", "debug", "TEST").unwrap();
        loader.apply_env_var("TEST__LOGGING__JSON_FORMAT", "no", "TEST").unwrap();
        assert_eq!(loader.config.logging.level, "debug");
        assert!(!loader.config.logging.json_format);
    }

    #[test]
    fn test_apply_env_var_endpoint_matches_existing_key() {
        let mut loader = ConfigLoader::new()
            .with_string("[endpoints.Orders]\nbase_url = \"http://a\"\n", "toml")
            .unwrap();
        loader
            .apply_env_var("TEST__ENDPOINTS__ORDERS__BASE_URL", "http://b:1", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__ENDPOINTS__ORDERS__CONTENT_TYPE", "application/xml", "TEST")
            .unwrap();
        let orders = &loader.config.endpoints["Orders"];
        assert_eq!(orders.base_url, "http://b:1");
        assert_eq!(orders.content_type, ContentType::Xml);
        assert_eq!(loader.config.endpoints.len(), 1);
    }

    #[test]
    fn test_apply_env_var_unknown_key() {
        let mut loader = ConfigLoader::new();
        assert!(loader.apply_env_var("TEST__SERVER__PORT", "1", "TEST").is_err());
    }
}
