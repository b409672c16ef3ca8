//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// A configuration source could not be read, parsed or accepted.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required file does not exist.
    #[error("no configuration at {}", path.display())]
    Missing {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read {}", path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML.
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Inline content was given in a format other than `toml` or `json`.
    #[error("unsupported configuration format {0:?}")]
    Format(String),

    /// A value parsed but is not usable, e.g. a relative endpoint URL.
    #[error("{field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field (`endpoints.orders.base_url`).
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An override variable could not be applied.
    #[error("environment variable {var}: {reason}")]
    Env {
        /// The variable name.
        var: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Env {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Dotted path of the offending field, for [`ConfigError::Invalid`].
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }
}
