//! Redirect fallback for contracts owned by another process.
//!
//! A gateway mounts a remote contract under a local prefix. Each
//! [`RedirectMiddleware`] lets the rest of the chain run first; only when the
//! chain answered `404`, the path starts with the prefix and the remainder
//! matches the stage's descriptor does it rewrite the answer into a
//! `307 Temporary Redirect` to the owner. `307` keeps the verb and body.

use std::fmt;

use courier_core::Contract;
use courier_middleware::context::MiddlewareContext;
use courier_middleware::{
    BoxFuture, Middleware, Next, PipelineBuilder, Request, Response, ResponseExt,
};
use courier_router::RouteDescriptor;
use http::header::LOCATION;
use http::{HeaderValue, StatusCode, Uri};

use crate::error::ServerError;

/// Where redirected requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    origin: String,
    base_path: String,
}

impl RedirectTarget {
    /// Parses an absolute base URL such as `http://host:5002/v1`.
    pub fn parse(base_url: &str) -> Result<Self, ServerError> {
        let invalid = |reason: &str| ServerError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };

        let uri: Uri = base_url.trim().parse().map_err(|e: http::uri::InvalidUri| invalid(&e.to_string()))?;
        let scheme = uri.scheme_str().ok_or_else(|| invalid("missing scheme"))?;
        if scheme != "http" && scheme != "https" {
            return Err(invalid("scheme must be http or https"));
        }
        let authority = uri.authority().ok_or_else(|| invalid("missing host"))?;

        Ok(Self {
            origin: format!("{scheme}://{authority}"),
            base_path: uri.path().trim_matches('/').to_string(),
        })
    }

    /// Builds the `Location` for a stripped path and the original query.
    #[must_use]
    pub fn location(&self, remainder: &str, query: Option<&str>) -> String {
        let segments = self
            .base_path
            .split('/')
            .chain(remainder.trim_matches('/').split('/'))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        let mut location = format!("{}/{}", self.origin, segments);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            location.push('?');
            location.push_str(query);
        }
        location
    }
}

/// Redirects unanswered requests for one remote contract method.
pub struct RedirectMiddleware {
    descriptor: RouteDescriptor,
    local_prefix: String,
    target: RedirectTarget,
}

impl RedirectMiddleware {
    /// Creates the stage for `descriptor`, mounted locally under
    /// `local_prefix`.
    pub fn new(descriptor: RouteDescriptor, local_prefix: &str, target: RedirectTarget) -> Self {
        Self {
            descriptor,
            local_prefix: local_prefix.trim_matches('/').to_string(),
            target,
        }
    }

    /// Returns the path with the local prefix stripped, if this stage owns
    /// `path`.
    #[must_use]
    pub fn remainder<'p>(&self, path: &'p str) -> Option<&'p str> {
        let full = path.trim_matches('/');
        let remainder = full.strip_prefix(self.local_prefix.as_str())?;
        self.descriptor.is_match(remainder).then_some(remainder)
    }
}

impl Middleware for RedirectMiddleware {
    fn name(&self) -> &'static str {
        "redirect"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let uri = request.uri().clone();
            let response = next.run(ctx, request).await;

            if response.status() != StatusCode::NOT_FOUND {
                return response;
            }
            let Some(remainder) = self.remainder(uri.path()) else {
                return response;
            };

            let location = self.target.location(remainder, uri.query());
            let Ok(value) = HeaderValue::from_str(&location) else {
                tracing::warn!(location, "redirect location is not a valid header value");
                return response;
            };

            tracing::info!(
                contract = self.descriptor.contract().name,
                method = self.descriptor.method().name,
                from = uri.path(),
                location,
                "redirecting to remote owner"
            );
            let mut redirect = Response::status_only(StatusCode::TEMPORARY_REDIRECT);
            redirect.headers_mut().insert(LOCATION, value);
            redirect
        })
    }
}

impl fmt::Debug for RedirectMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedirectMiddleware")
            .field("descriptor", &self.descriptor.to_string())
            .field("local_prefix", &self.local_prefix)
            .field("target", &self.target)
            .finish()
    }
}

/// Adds one redirect stage per method of the remote contract `C`.
///
/// Requests under `local_prefix` that nothing else answered are redirected
/// to `base_url`.
pub fn install_redirect<C>(
    mut builder: PipelineBuilder,
    local_prefix: &str,
    base_url: &str,
) -> Result<PipelineBuilder, ServerError>
where
    C: ?Sized + Contract,
{
    let target = RedirectTarget::parse(base_url)?;
    for descriptor in RouteDescriptor::derive_all(C::spec(), None) {
        tracing::debug!(route = %descriptor, local_prefix, base_url, "installing redirect");
        builder = builder.stage(RedirectMiddleware::new(descriptor, local_prefix, target.clone()));
    }
    Ok(builder)
}
