//! In-memory client for a pipeline.

use std::sync::Arc;

use courier_middleware::Pipeline;
use http::Method;

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;

/// Sends requests straight into a [`Pipeline`] without binding a port.
///
/// ```ignore
/// let client = TestClient::new(pipeline);
/// let response = client.get("/get").content_type("application/json").send().await?;
/// response.assert_status(StatusCode::OK);
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    pipeline: Arc<Pipeline>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for `pipeline`.
    pub fn new(pipeline: impl Into<Arc<Pipeline>>) -> Self {
        Self {
            pipeline: pipeline.into(),
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Creates a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Creates a PATCH request.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Creates a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Creates a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest {
            client: self,
            builder,
        }
    }
}

/// A request bound to a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Applies a change to the underlying builder.
    pub fn with(mut self, f: impl FnOnce(TestRequestBuilder) -> TestRequestBuilder) -> Self {
        self.builder = f(self.builder);
        self
    }

    /// Sets a header.
    pub fn header(self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.with(|b| b.header(name, value))
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.with(|b| b.content_type(content_type))
    }

    /// Sets the raw body.
    pub fn body(self, body: impl Into<bytes::Bytes>) -> Self {
        self.with(|b| b.body(body))
    }

    /// Encodes the body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(self, value: &T) -> Self {
        self.with(|b| b.json(value))
    }

    /// Encodes the body as XML.
    pub fn xml<T: serde::Serialize + ?Sized>(self, value: &T) -> Self {
        self.with(|b| b.xml(value))
    }

    /// Runs the request through the pipeline.
    pub async fn send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        let response = self.client.pipeline.handle(request).await;
        TestResponse::from_http(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_middleware::{FnMiddleware, Response, ResponseExt};
    use http::StatusCode;

    fn echo_pipeline() -> Pipeline {
        Pipeline::builder()
            .stage(FnMiddleware::new("echo", |_ctx, req, _next| {
                Box::pin(async move {
                    let body = format!("{} {}", req.method(), req.uri());
                    Response::with_body(StatusCode::OK, "text/plain", body)
                })
            }))
            .build()
    }

    #[tokio::test]
    async fn test_unanswered_request_is_404() {
        let client = TestClient::new(Pipeline::builder().build());
        let response = client.get("/anything").send().await.unwrap();
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_reaches_pipeline() {
        let client = TestClient::new(echo_pipeline());
        let response = client.put("/addorder/1/2?x=1").send().await.unwrap();
        assert_eq!(response.text().unwrap(), "PUT /addorder/1/2?x=1");
    }

    #[tokio::test]
    async fn test_default_headers_are_sent() {
        let client = TestClient::new(
            Pipeline::builder()
                .stage(FnMiddleware::new("header", |_ctx, req, _next| {
                    Box::pin(async move {
                        let value = req
                            .headers()
                            .get("x-tenant")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("none")
                            .to_string();
                        Response::with_body(StatusCode::OK, "text/plain", value)
                    })
                }))
                .build(),
        )
        .with_default_header("X-Tenant", "blue");

        let response = client.get("/get").send().await.unwrap();
        assert_eq!(response.text().unwrap(), "blue");
    }
}
