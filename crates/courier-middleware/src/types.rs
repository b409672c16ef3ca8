//! Common types used throughout the middleware pipeline.

use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};
use http_body_util::Full;

/// The HTTP request type used in the middleware pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Shorthands for building pipeline responses.
pub trait ResponseExt {
    /// A response with only a status code.
    fn status_only(status: StatusCode) -> Response;

    /// A response with a body and content type.
    fn with_body(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Response;

    /// The `404 Not Found` answered when nothing in the chain handled a request.
    fn not_found() -> Response;
}

impl ResponseExt for Response {
    fn status_only(status: StatusCode) -> Response {
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    fn with_body(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Response {
        let mut response = Response::new(Full::new(body.into()));
        *response.status_mut() = status;
        if let Ok(value) = HeaderValue::from_str(content_type) {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        response
    }

    fn not_found() -> Response {
        Self::status_only(StatusCode::NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only() {
        let response = Response::status_only(StatusCode::NO_CONTENT);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().is_empty());
    }

    #[test]
    fn test_with_body_sets_content_type() {
        let response = Response::with_body(StatusCode::OK, "application/json", "{}");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_not_found() {
        assert_eq!(Response::not_found().status(), StatusCode::NOT_FOUND);
    }
}
