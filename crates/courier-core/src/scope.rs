//! Ambient per-request state.
//!
//! While the dispatcher runs an implementation it enters a [`RequestScope`]
//! holding the inbound request's `Content-Type` and correlation token. Any
//! client proxy awaited inside that scope reads them back so chained calls
//! keep the caller's content type and token.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::codec::ContentType;

tokio::task_local! {
    static CURRENT: RequestScope;
}

/// State of the inbound request currently being handled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestScope {
    /// Raw `Content-Type` header of the inbound request.
    pub content_type: Option<String>,
    /// Correlation token resolved for the inbound request.
    pub correlation_token: Option<String>,
}

impl RequestScope {
    /// Creates a scope from header values.
    #[must_use]
    pub fn new(content_type: Option<String>, correlation_token: Option<String>) -> Self {
        Self {
            content_type,
            correlation_token,
        }
    }

    /// Returns the negotiated content type of the inbound request, if any.
    #[must_use]
    pub fn negotiated(&self) -> Option<ContentType> {
        self.content_type.as_deref().and_then(ContentType::negotiate)
    }

    /// Runs `fut` with this scope as the current one.
    pub async fn run<F>(self, fut: F) -> F::Output
    where
        F: Future,
    {
        CURRENT.scope(self, fut).await
    }

    /// Returns a copy of the current scope, or `None` outside of one.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(Clone::clone).ok()
    }
}
