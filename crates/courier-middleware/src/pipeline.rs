//! The ordered middleware chain.
//!
//! A [`Pipeline`] holds stages in the order they were added. Each request
//! walks the stages front to back; whatever no stage answers reaches the
//! terminal handler, which by default answers `404 Not Found`. Stages that
//! act on the way out (the redirect fallback, logging) see the response after
//! every later stage has finished.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};
use std::fmt;
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable, ordered middleware chain.
///
/// # Example
///
/// ```
/// use courier_middleware::{Pipeline, Request};
/// use courier_middleware::stages::CorrelationTokenMiddleware;
/// use http_body_util::Full;
/// use bytes::Bytes;
///
/// # tokio_test::block_on(async {
/// let pipeline = Pipeline::builder()
///     .stage(CorrelationTokenMiddleware::new())
///     .build();
///
/// let request: Request = http::Request::builder()
///     .uri("/nothing/here")
///     .body(Full::new(Bytes::new()))
///     .unwrap();
///
/// let response = pipeline.handle(request).await;
/// assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
/// assert!(response.headers().contains_key("correlation-token"));
/// # });
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs a request through every stage, then `handler`.
    pub async fn process<H>(&self, mut ctx: MiddlewareContext, request: Request, handler: H) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut ctx, request).await
    }

    /// Runs a request through every stage with the `404` terminal handler.
    pub async fn handle(&self, request: Request) -> Response {
        self.process(MiddlewareContext::new(), request, |_ctx, _req| {
            Box::pin(async { Response::not_found() })
        })
        .await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared stage.
    #[must_use]
    pub fn shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Returns the number of stages added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if no stage was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("stages", &self.stages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;

    /// Answers `200` for one exact path and passes everything else on.
    struct Answer(&'static str);

    impl Middleware for Answer {
        fn name(&self) -> &'static str {
            self.0
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                if request.uri().path() == self.0 {
                    Response::with_body(StatusCode::OK, "text/plain", self.0)
                } else {
                    next.run(ctx, request).await
                }
            })
        }
    }

    fn request(path: &str) -> Request {
        http::Request::builder()
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_builder_preserves_order() {
        let pipeline = Pipeline::builder()
            .stage(Answer("/a"))
            .stage(Answer("/b"))
            .build();
        assert_eq!(pipeline.stage_names(), vec!["/a", "/b"]);
        assert_eq!(pipeline.stage_count(), 2);
    }

    #[tokio::test]
    async fn test_first_answering_stage_wins() {
        let pipeline = Pipeline::builder()
            .stage(Answer("/a"))
            .stage(Answer("/a"))
            .stage(Answer("/b"))
            .build();
        let response = pipeline.handle(request("/b")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unanswered_request_is_not_found() {
        let pipeline = Pipeline::builder().stage(Answer("/a")).build();
        let response = pipeline.handle(request("/zzz")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_custom_terminal_handler() {
        let pipeline = Pipeline::builder().build();
        let response = pipeline
            .process(MiddlewareContext::new(), request("/"), |_ctx, _req| {
                Box::pin(async { Response::status_only(StatusCode::ACCEPTED) })
            })
            .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
