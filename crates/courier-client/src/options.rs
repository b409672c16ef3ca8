//! Per-endpoint client settings.

use courier_core::ContentType;
use serde::{Deserialize, Serialize};

/// Where a contract is served and how to talk to it.
///
/// ```rust
/// use courier_client::EndpointOptions;
/// use courier_core::ContentType;
///
/// let options = EndpointOptions::new("http://localhost:5002/")
///     .with_content_type(ContentType::Xml);
/// assert_eq!(options.url_for("/get?limit=2"), "http://localhost:5002/get?limit=2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointOptions {
    /// Base address of the remote process, e.g. `http://host:5002`.
    pub base_url: String,
    /// Content type used when no inbound request dictates one.
    #[serde(default)]
    pub content_type: ContentType,
}

impl EndpointOptions {
    /// Creates options with the JSON default.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            content_type: ContentType::default(),
        }
    }

    /// Sets the default content type.
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Joins the base address and a path-and-query starting with `/`.
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path_and_query.trim_start_matches('/')
        )
    }
}
