//! Correlation token middleware.
//!
//! One correlation token is shared by every call in a logical request graph.
//! The token is read from the inbound request, or minted as a random UUID if
//! the caller sent none, stored in the [`MiddlewareContext`] for the rest of
//! the chain, and echoed on the response.

use http::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderName};
use uuid::Uuid;

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};

/// The default header carrying the correlation token.
pub const CORRELATION_TOKEN_HEADER: &str = "Correlation-Token";

/// Resolves correlation tokens from header maps.
///
/// # Example
///
/// ```
/// use courier_middleware::stages::CorrelationTokens;
/// use http::HeaderMap;
///
/// let tokens = CorrelationTokens::new();
///
/// let mut inbound = HeaderMap::new();
/// inbound.insert("correlation-token", "abc, def".parse().unwrap());
/// assert_eq!(tokens.resolve(&inbound, None), "abc");
///
/// let fresh = tokens.resolve(&HeaderMap::new(), None);
/// assert_eq!(fresh.len(), 36);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationTokens {
    header: HeaderName,
}

impl CorrelationTokens {
    /// Uses the default `Correlation-Token` header.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: HeaderName::from_static("correlation-token"),
        }
    }

    /// Uses a custom header name.
    pub fn with_header(name: &str) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            header: HeaderName::from_bytes(name.as_bytes())?,
        })
    }

    /// The header the token travels in.
    #[must_use]
    pub fn header_name(&self) -> &HeaderName {
        &self.header
    }

    /// Returns the first value of the header on the request, else on the
    /// in-flight response, else a fresh random token.
    ///
    /// Comma-separated values count individually; an empty value is absent.
    #[must_use]
    pub fn resolve(&self, request: &HeaderMap, response: Option<&HeaderMap>) -> String {
        self.first_value(request)
            .or_else(|| response.and_then(|headers| self.first_value(headers)))
            .unwrap_or_else(Self::fresh)
    }

    /// Mints a new token.
    #[must_use]
    pub fn fresh() -> String {
        Uuid::new_v4().to_string()
    }

    fn first_value(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(&self.header)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .next()
            .filter(|token| !token.is_empty())
            .map(ToString::to_string)
    }
}

impl Default for CorrelationTokens {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware that resolves the correlation token of each request.
///
/// # Behavior
///
/// 1. Resolve the token from the request headers (or mint one)
/// 2. Store it in [`MiddlewareContext`]
/// 3. Run the rest of the chain
/// 4. Add the token to the response unless a later stage already did
#[derive(Debug, Clone, Default)]
pub struct CorrelationTokenMiddleware {
    tokens: CorrelationTokens,
}

impl CorrelationTokenMiddleware {
    /// Uses the default header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given provider.
    #[must_use]
    pub fn with_tokens(tokens: CorrelationTokens) -> Self {
        Self { tokens }
    }

    /// The provider in use.
    #[must_use]
    pub fn tokens(&self) -> &CorrelationTokens {
        &self.tokens
    }
}

impl Middleware for CorrelationTokenMiddleware {
    fn name(&self) -> &'static str {
        "correlation_token"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let token = self.tokens.resolve(request.headers(), None);
            ctx.set_correlation_token(token.clone());

            let mut response = next.run(ctx, request).await;

            if !response.headers().contains_key(self.tokens.header_name()) {
                if let Ok(value) = HeaderValue::from_str(&token) {
                    response
                        .headers_mut()
                        .insert(self.tokens.header_name().clone(), value);
                }
            }

            response
        })
    }
}
