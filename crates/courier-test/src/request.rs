//! Test request building.

use bytes::Bytes;
use courier_core::ContentType;
use courier_middleware::Request;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use http_body_util::Full;
use serde::Serialize;

use crate::error::TestError;

/// Builder for requests fed to a pipeline.
///
/// Header and body errors are remembered and reported by [`build`](Self::build).
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Sets a header, replacing earlier values.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref());
        let value = HeaderValue::try_from(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(e), _) => self.fail(TestError::InvalidHeader(e.to_string())),
            (_, Err(e)) => self.fail(TestError::InvalidHeader(e.to_string())),
        }
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Encodes the body with `content_type` and sets the matching header.
    pub fn encoded<T: Serialize + ?Sized>(mut self, content_type: ContentType, value: &T) -> Self {
        match content_type.encode(value) {
            Ok(text) => self.body = Bytes::from(text),
            Err(e) => self.fail(TestError::RequestBuild(e.to_string())),
        }
        self.content_type(content_type.as_str())
    }

    /// Encodes the body as JSON.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.encoded(ContentType::Json, value)
    }

    /// Encodes the body as XML.
    pub fn xml<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.encoded(ContentType::Xml, value)
    }

    fn fail(&mut self, error: TestError) {
        self.error.get_or_insert(error);
    }

    /// Builds the pipeline request.
    pub fn build(self) -> Result<Request, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let mut request = http::Request::builder()
            .method(self.method)
            .uri(self.uri)
            .body(Full::new(self.body))?;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sets_method_uri_and_headers() {
        let request = TestRequestBuilder::new(Method::PUT, "/addorder/1/2?x=y")
            .header("Correlation-Token", "abc")
            .build()
            .unwrap();
        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.uri().path(), "/addorder/1/2");
        assert_eq!(request.uri().query(), Some("x=y"));
        assert_eq!(request.headers()["correlation-token"], "abc");
    }

    #[test]
    fn test_json_body_sets_content_type() {
        #[derive(Serialize)]
        struct Note {
            body_text: String,
        }

        let request = TestRequestBuilder::new(Method::POST, "/postnote")
            .json(&Note {
                body_text: "hi".to_string(),
            })
            .build()
            .unwrap();
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_invalid_header_is_reported() {
        let result = TestRequestBuilder::new(Method::GET, "/get")
            .header("bad header", "x")
            .build();
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
