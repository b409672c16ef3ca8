//! End-to-end pipeline tests.
//!
//! These drive a full chain of built-in and ad-hoc stages and check the order
//! in which stages see requests and responses.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use courier_middleware::stages::{
    CorrelationTokenMiddleware, CorrelationTokens, RequestLoggingMiddleware,
    CORRELATION_TOKEN_HEADER,
};
use courier_middleware::{
    BoxFuture, FnMiddleware, MapRequest, Middleware, MiddlewareContext, Next, Pipeline, Request,
    Response, ResponseExt,
};
use http::StatusCode;
use http_body_util::{BodyExt, Full};

fn request(path: &str) -> Request {
    http::Request::builder()
        .uri(path)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Answers `200` with the correlation token it saw, for one path.
struct EchoToken(&'static str);

impl Middleware for EchoToken {
    fn name(&self) -> &'static str {
        "echo_token"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if request.uri().path() != self.0 {
                return next.run(ctx, request).await;
            }
            let token = ctx.correlation_token().unwrap_or_default().to_string();
            Response::with_body(StatusCode::OK, "text/plain", token)
        })
    }
}

/// Records the status every response had when it passed this stage.
struct SeenStatus(Arc<Mutex<Vec<u16>>>);

impl Middleware for SeenStatus {
    fn name(&self) -> &'static str {
        "seen_status"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let response = next.run(ctx, request).await;
            self.0.lock().unwrap().push(response.status().as_u16());
            response
        })
    }
}

#[tokio::test]
async fn test_token_reaches_answering_stage_and_response() {
    let pipeline = Pipeline::builder()
        .stage(CorrelationTokenMiddleware::new())
        .stage(RequestLoggingMiddleware::new(["/health"]))
        .stage(EchoToken("/echo"))
        .build();

    let request = http::Request::builder()
        .uri("/echo")
        .header(CORRELATION_TOKEN_HEADER, "graph-7")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = pipeline.handle(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CORRELATION_TOKEN_HEADER).unwrap(),
        "graph-7"
    );
    assert_eq!(body_text(response).await, "graph-7");
}

#[tokio::test]
async fn test_outer_stage_sees_final_status() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let pipeline = Pipeline::builder()
        .stage(SeenStatus(seen.clone()))
        .stage(EchoToken("/echo"))
        .build();

    pipeline.handle(request("/echo")).await;
    pipeline.handle(request("/missing")).await;

    assert_eq!(*seen.lock().unwrap(), vec![200, 404]);
}

#[tokio::test]
async fn test_rewrite_before_answering_stage() {
    let pipeline = Pipeline::builder()
        .stage(MapRequest::new("index", |mut request: Request| {
            if request.uri().path() == "/" {
                *request.uri_mut() = http::Uri::from_static("/echo");
            }
            request
        }))
        .stage(EchoToken("/echo"))
        .build();

    let response = pipeline.handle(request("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_fn_middleware_can_short_circuit() {
    let pipeline = Pipeline::builder()
        .stage(FnMiddleware::new("maintenance", |_ctx, _request, _next| {
            Box::pin(async { Response::status_only(StatusCode::SERVICE_UNAVAILABLE) })
        }))
        .stage(EchoToken("/echo"))
        .build();

    let response = pipeline.handle(request("/echo")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_custom_correlation_header() {
    let tokens = CorrelationTokens::with_header("X-Flow").unwrap();
    let pipeline = Pipeline::builder()
        .stage(CorrelationTokenMiddleware::with_tokens(tokens))
        .build();

    let response = pipeline.handle(request("/missing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let token = response.headers().get("x-flow").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(token).is_ok());
}
