//! Client transport that answers from in-process pipelines.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use courier_client::{HttpTransport, OutboundRequest, OutboundResponse, TransportError};
use courier_middleware::Pipeline;
use http::Uri;
use http_body_util::{BodyExt, Full};

/// [`HttpTransport`] that hands every request to a [`Pipeline`].
///
/// Requests are routed by URL authority (`host:port`) when hosts are
/// registered with [`with_host`](Self::with_host), otherwise to the default
/// pipeline. An unknown authority with no default is a transport fault, the
/// same as a refused connection.
#[derive(Debug, Clone, Default)]
pub struct PipelineTransport {
    default: Option<Arc<Pipeline>>,
    hosts: HashMap<String, Arc<Pipeline>>,
}

impl PipelineTransport {
    /// Sends everything to `pipeline`.
    pub fn new(pipeline: impl Into<Arc<Pipeline>>) -> Self {
        Self {
            default: Some(pipeline.into()),
            hosts: HashMap::new(),
        }
    }

    /// A transport with no default pipeline.
    pub fn hosts() -> Self {
        Self::default()
    }

    /// Routes requests for `authority` to `pipeline`.
    #[must_use]
    pub fn with_host(mut self, authority: impl Into<String>, pipeline: impl Into<Arc<Pipeline>>) -> Self {
        self.hosts
            .insert(authority.into().to_ascii_lowercase(), pipeline.into());
        self
    }

    /// Shares the transport as a trait object.
    pub fn shared(self) -> Arc<dyn HttpTransport> {
        Arc::new(self)
    }

    fn pipeline_for(&self, uri: &Uri) -> Option<&Arc<Pipeline>> {
        uri.authority()
            .and_then(|a| self.hosts.get(&a.as_str().to_ascii_lowercase()))
            .or(self.default.as_ref())
    }
}

#[async_trait]
impl HttpTransport for PipelineTransport {
    async fn send(&self, request: OutboundRequest) -> Result<OutboundResponse, TransportError> {
        let uri: Uri = request
            .url
            .parse()
            .map_err(|e| TransportError::Other(format!("invalid url {}: {e}", request.url)))?;
        let pipeline = self
            .pipeline_for(&uri)
            .ok_or_else(|| TransportError::Other(format!("no pipeline for {}", request.url)))?;

        let mut inbound = http::Request::builder()
            .method(request.method)
            .uri(uri)
            .body(Full::new(request.body.unwrap_or_default()))
            .map_err(|e| TransportError::Other(e.to_string()))?;
        *inbound.headers_mut() = request.headers;

        let (parts, body) = pipeline.handle(inbound).await.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?
            .to_bytes();

        Ok(OutboundResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use courier_middleware::{FnMiddleware, Response, ResponseExt};
    use http::{HeaderMap, Method, StatusCode};

    fn answering(text: &'static str) -> Pipeline {
        Pipeline::builder()
            .stage(FnMiddleware::new("answer", move |_ctx, req, _next| {
                Box::pin(async move {
                    let body = format!("{text} {}", req.uri().path());
                    Response::with_body(StatusCode::OK, "text/plain", body)
                })
            }))
            .build()
    }

    fn get(url: &str) -> OutboundRequest {
        OutboundRequest {
            method: Method::GET,
            url: url.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_default_pipeline() {
        let transport = PipelineTransport::new(answering("default"));
        let response = transport.send(get("http://anywhere/get")).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Bytes::from("default /get"));
    }

    #[tokio::test]
    async fn test_routes_by_authority() {
        let transport = PipelineTransport::hosts()
            .with_host("orders:5001", answering("orders"))
            .with_host("catalog:5002", answering("catalog"));

        let response = transport.send(get("http://catalog:5002/get")).await.unwrap();
        assert_eq!(response.body_text(), "catalog /get");

        let err = transport.send(get("http://unknown/get")).await.unwrap_err();
        assert!(err.to_string().contains("no pipeline"));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let transport = PipelineTransport::new(answering("x"));
        assert!(transport.send(get("not a url")).await.is_err());
    }
}
