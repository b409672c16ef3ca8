//! Error types for Courier.
//!
//! Two types cross the process boundary:
//!
//! - [`ExceptionInfo`] is the only error representation that is ever written
//!   to the wire. It is always serialized as JSON.
//! - [`CourierError`] is the in-process error. Every contract method returns
//!   `Result<T, CourierError>` on both sides, so server implementations and
//!   generated clients share one signature.
//!
//! # Error kinds
//!
//! | `ErrorKind` | Raised by | HTTP status |
//! |---|---|---|
//! | `UnsupportedContentType` | dispatcher | 400 |
//! | `ParameterBinding` | dispatcher | 500 |
//! | `AmbiguousOrMissingMethod` | descriptor derivation | 500 |
//! | `Invocation` | the implementation | 500 |
//! | `Remote` | client proxy | n/a |
//! | `Transport` | client transport | n/a |
//!
//! On the client side every failure is normalized into
//! [`CourierError::Remote`], so callers have one variant to handle.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`CourierError`].
pub type CourierResult<T> = Result<T, CourierError>;

/// Classification of a [`CourierError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request's content type is missing or not one of the codec tokens.
    UnsupportedContentType,
    /// A parameter could not be bound from the request.
    ParameterBinding,
    /// No unique contract method matched a name and argument types.
    AmbiguousOrMissingMethod,
    /// The implementation failed.
    Invocation,
    /// The remote side reported a failure.
    Remote,
    /// The outbound call could not complete.
    Transport,
}

impl ErrorKind {
    /// Returns the status code the dispatcher answers with.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedContentType => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the type name written into [`ExceptionInfo::type`] for
    /// framework-raised errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::UnsupportedContentType => "UnsupportedContentType",
            Self::ParameterBinding => "ParameterBindingError",
            Self::AmbiguousOrMissingMethod => "AmbiguousOrMissingMethod",
            Self::Invocation => "InvocationFailure",
            Self::Remote => "RemoteError",
            Self::Transport => "TransportFault",
        }
    }
}

/// One key/value pair of auxiliary error data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEntry {
    /// The key.
    pub key: String,
    /// The value, rendered as text.
    pub value: String,
}

/// A serializable snapshot of an error.
///
/// Built once at the point an error crosses the server boundary and never
/// mutated afterwards. Only the first level of the cause chain is captured:
/// `inner_exception` never has an inner exception of its own.
///
/// Wire shape (JSON, camelCase):
///
/// ```json
/// {"type": "...", "message": "...", "source": "...", "stackTrace": "...",
///  "innerException": null, "data": [{"key": "...", "value": "..."}]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExceptionInfo {
    /// Fully qualified type name of the error.
    pub r#type: String,
    /// Display message.
    pub message: String,
    /// The component the error originated from.
    pub source: Option<String>,
    /// Captured stack text, if backtraces are enabled.
    pub stack_trace: Option<String>,
    /// The first cause, if any.
    pub inner_exception: Option<Box<ExceptionInfo>>,
    /// Auxiliary key/value data.
    pub data: Vec<DataEntry>,
}

impl ExceptionInfo {
    /// Creates an info with a type name and message.
    #[must_use]
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            r#type: type_name.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Captures a typed error.
    ///
    /// The type name is `std::any::type_name::<E>()`, the source is the crate
    /// segment of that path, and the first `source()` of the error (if any)
    /// becomes the inner exception.
    ///
    /// ```
    /// use courier_core::ExceptionInfo;
    ///
    /// let err = "x".parse::<i32>().unwrap_err();
    /// let info = ExceptionInfo::from_error(&err);
    /// assert_eq!(info.r#type, "core::num::error::ParseIntError");
    /// assert_eq!(info.source.as_deref(), Some("core"));
    /// ```
    #[must_use]
    pub fn from_error<E>(err: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        let type_name = std::any::type_name::<E>();
        Self {
            r#type: type_name.to_string(),
            message: err.to_string(),
            source: crate_of(type_name),
            stack_trace: capture_stack(),
            inner_exception: err.source().map(|inner| Box::new(Self::shallow(inner))),
            data: Vec::new(),
        }
    }

    /// Captures an untyped error without its cause chain.
    ///
    /// The concrete type is not recoverable through `dyn Error`, so the type
    /// name is read from the leading identifier of its `Debug` output.
    #[must_use]
    pub fn shallow(err: &(dyn StdError + 'static)) -> Self {
        Self {
            r#type: debug_type_name(err),
            message: err.to_string(),
            ..Self::default()
        }
    }

    /// Adds an auxiliary data entry.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.push(DataEntry {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Sets the source component.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the inner exception, dropping any cause it carries itself.
    #[must_use]
    pub fn with_inner(mut self, mut inner: ExceptionInfo) -> Self {
        inner.inner_exception = None;
        self.inner_exception = Some(Box::new(inner));
        self
    }

    /// Looks up an auxiliary data value.
    #[must_use]
    pub fn data_value(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }
}

impl fmt::Display for ExceptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.r#type, self.message)
    }
}

fn crate_of(type_name: &str) -> Option<String> {
    type_name
        .split("::")
        .next()
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
}

fn capture_stack() -> Option<String> {
    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

fn debug_type_name(err: &(dyn StdError + 'static)) -> String {
    let debug = format!("{err:?}");
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if name.is_empty() {
        "Error".to_string()
    } else {
        name
    }
}

/// The error returned by every contract method.
///
/// # Example
///
/// ```
/// use courier_core::{CourierError, ErrorKind};
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("product {0} not found")]
/// struct ProductNotFound(u32);
///
/// let err = CourierError::invocation(&ProductNotFound(7));
/// assert_eq!(err.kind(), ErrorKind::Invocation);
/// assert!(err.to_info().r#type.ends_with("ProductNotFound"));
/// ```
#[derive(Error, Debug)]
pub enum CourierError {
    /// The request carried no recognized content type.
    #[error("Unsupported content type: {message}")]
    UnsupportedContentType {
        /// Human-readable error message.
        message: String,
    },

    /// A parameter could not be bound or converted.
    #[error("Parameter binding error: {message}")]
    ParameterBinding {
        /// Human-readable error message.
        message: String,
        /// Wire name of the offending parameter, if known.
        parameter: Option<String>,
    },

    /// Descriptor derivation found zero or several candidate methods.
    #[error("Ambiguous or missing method {contract}.{method}: {message}")]
    AmbiguousOrMissingMethod {
        /// Contract name.
        contract: String,
        /// Requested method name.
        method: String,
        /// Human-readable error message.
        message: String,
    },

    /// The implementation reported a failure.
    #[error("Invocation failure: {info}")]
    Invocation {
        /// The captured failure.
        info: Box<ExceptionInfo>,
    },

    /// The remote endpoint reported a failure, or the call could not be
    /// completed.
    #[error("Remote error: {info}")]
    Remote {
        /// The decoded or synthesized failure.
        info: Box<ExceptionInfo>,
    },

    /// The outbound HTTP call could not be completed.
    #[error("Transport fault: {message}")]
    Transport {
        /// Human-readable error message.
        message: String,
        /// The underlying fault.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl CourierError {
    /// Creates an unsupported content type error.
    #[must_use]
    pub fn unsupported_content_type(message: impl Into<String>) -> Self {
        Self::UnsupportedContentType {
            message: message.into(),
        }
    }

    /// Creates a parameter binding error.
    #[must_use]
    pub fn binding(message: impl Into<String>) -> Self {
        Self::ParameterBinding {
            message: message.into(),
            parameter: None,
        }
    }

    /// Creates a parameter binding error for a named parameter.
    #[must_use]
    pub fn binding_for(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParameterBinding {
            message: message.into(),
            parameter: Some(parameter.into()),
        }
    }

    /// Creates an ambiguous-or-missing-method error.
    #[must_use]
    pub fn ambiguous_or_missing(
        contract: impl Into<String>,
        method: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::AmbiguousOrMissingMethod {
            contract: contract.into(),
            method: method.into(),
            message: message.into(),
        }
    }

    /// Captures a typed error raised by an implementation.
    #[must_use]
    pub fn invocation<E>(err: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        Self::Invocation {
            info: Box::new(ExceptionInfo::from_error(err)),
        }
    }

    /// Raises an implementation failure from a prepared info.
    #[must_use]
    pub fn from_info(info: ExceptionInfo) -> Self {
        Self::Invocation {
            info: Box::new(info),
        }
    }

    /// Creates a remote error from a decoded info.
    #[must_use]
    pub fn remote(info: ExceptionInfo) -> Self {
        Self::Remote {
            info: Box::new(info),
        }
    }

    /// Creates a transport fault.
    pub fn transport(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedContentType { .. } => ErrorKind::UnsupportedContentType,
            Self::ParameterBinding { .. } => ErrorKind::ParameterBinding,
            Self::AmbiguousOrMissingMethod { .. } => ErrorKind::AmbiguousOrMissingMethod,
            Self::Invocation { .. } => ErrorKind::Invocation,
            Self::Remote { .. } => ErrorKind::Remote,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind().default_status_code()
    }

    /// Returns the carried info for invocation and remote errors.
    #[must_use]
    pub fn info(&self) -> Option<&ExceptionInfo> {
        match self {
            Self::Invocation { info } | Self::Remote { info } => Some(info),
            _ => None,
        }
    }

    /// Converts this error into its wire representation.
    #[must_use]
    pub fn to_info(&self) -> ExceptionInfo {
        match self {
            Self::Invocation { info } | Self::Remote { info } => (**info).clone(),
            Self::ParameterBinding {
                message,
                parameter,
            } => {
                let info = ExceptionInfo::new(self.kind().type_name(), message.clone())
                    .with_source(env!("CARGO_PKG_NAME"));
                match parameter {
                    Some(name) => info.with_data("parameter", name.clone()),
                    None => info,
                }
            }
            Self::AmbiguousOrMissingMethod {
                contract, method, ..
            } => ExceptionInfo::new(self.kind().type_name(), self.to_string())
                .with_source(env!("CARGO_PKG_NAME"))
                .with_data("contract", contract.clone())
                .with_data("method", method.clone()),
            Self::Transport { message, source } => {
                let info = ExceptionInfo::new(self.kind().type_name(), message.clone())
                    .with_source(env!("CARGO_PKG_NAME"));
                match source {
                    Some(source) => info.with_inner(ExceptionInfo::shallow(&**source)),
                    None => info,
                }
            }
            Self::UnsupportedContentType { message } => {
                ExceptionInfo::new(self.kind().type_name(), message.clone())
                    .with_source(env!("CARGO_PKG_NAME"))
            }
        }
    }

    /// Normalizes any error into [`CourierError::Remote`].
    ///
    /// Remote errors pass through unchanged; everything else is wrapped in
    /// its own info.
    #[must_use]
    pub fn into_remote(self) -> Self {
        match self {
            Self::Remote { .. } => self,
            other => Self::remote(other.to_info()),
        }
    }
}
