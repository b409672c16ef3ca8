//! Request logging middleware.
//!
//! Logs each request on the way in (method, path, headers) and the response
//! on the way out (status, headers, latency). Paths containing any of the
//! configured exclusion fragments are passed through without logging.

use http::HeaderMap;

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};

/// Middleware that logs requests and responses through `tracing`.
///
/// # Example
///
/// ```
/// use courier_middleware::stages::RequestLoggingMiddleware;
///
/// let logging = RequestLoggingMiddleware::new(["/health", "favicon"]);
/// assert!(logging.is_excluded("/Health/live"));
/// assert!(!logging.is_excluded("/api/orders/get"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestLoggingMiddleware {
    exclude: Vec<String>,
}

impl RequestLoggingMiddleware {
    /// Creates the middleware with path fragments to skip.
    ///
    /// Fragments are compared against the lower-cased path.
    pub fn new<I, S>(exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude: exclude
                .into_iter()
                .map(|s| s.into().to_lowercase())
                .collect(),
        }
    }

    /// Returns `true` if requests to `path` are not logged.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        let path = path.trim().to_lowercase();
        self.exclude.iter().any(|fragment| path.contains(fragment.as_str()))
    }
}

/// Renders headers as `'name':[v1;v2]` pairs.
fn headers_to_string(headers: &HeaderMap) -> String {
    headers
        .keys()
        .map(|name| {
            let values: Vec<&str> = headers
                .get_all(name)
                .iter()
                .map(|v| v.to_str().unwrap_or("<binary>"))
                .collect();
            format!("'{}':[{}]", name, values.join(";"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl Middleware for RequestLoggingMiddleware {
    fn name(&self) -> &'static str {
        "request_logging"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if self.is_excluded(request.uri().path()) {
                return next.run(ctx, request).await;
            }

            let method = request.method().clone();
            let path = request.uri().path().to_string();
            tracing::info!(
                http.method = %method,
                http.path = %path,
                headers = %headers_to_string(request.headers()),
                "Incoming request"
            );

            let response = next.run(ctx, request).await;

            tracing::info!(
                http.method = %method,
                http.path = %path,
                http.status_code = response.status().as_u16(),
                correlation_token = ctx.correlation_token().unwrap_or_default(),
                latency_ms = ctx.elapsed().as_millis() as u64,
                headers = %headers_to_string(response.headers()),
                "Outgoing response"
            );

            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::{HeaderValue, StatusCode};
    use http_body_util::Full;

    #[test]
    fn test_exclusion_is_case_insensitive_substring() {
        let logging = RequestLoggingMiddleware::new(["/API/LOGS"]);
        assert!(logging.is_excluded(" /api/logs/get "));
        assert!(logging.is_excluded("/gateway/api/logs"));
        assert!(!logging.is_excluded("/api/orders"));
    }

    #[test]
    fn test_no_exclusions() {
        assert!(!RequestLoggingMiddleware::default().is_excluded("/anything"));
    }

    #[test]
    fn test_headers_to_string() {
        let mut headers = HeaderMap::new();
        headers.append("accept", HeaderValue::from_static("a"));
        headers.append("accept", HeaderValue::from_static("b"));
        assert_eq!(headers_to_string(&headers), "'accept':[a;b]");
    }

    #[tokio::test]
    async fn test_passes_response_through() {
        let logging = RequestLoggingMiddleware::new(["/skip"]);
        for path in ["/skip/me", "/log/me"] {
            let mut ctx = MiddlewareContext::new();
            let request = http::Request::builder()
                .uri(path)
                .body(Full::new(Bytes::new()))
                .unwrap();
            let next = Next::handler(|_ctx, _req| {
                Box::pin(async { Response::status_only(StatusCode::CREATED) })
            });
            let response = logging.process(&mut ctx, request, next).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }
    }
}
