//! Core middleware trait and types.
//!
//! Every stage of the host chain implements [`Middleware`]. A stage receives
//! the request and a [`Next`] continuation; it either answers on its own or
//! calls `next.run()` and may inspect or replace what comes back. Stages run
//! strictly in registration order, one request at a time per task.
//!
//! # Example
//!
//! ```
//! use courier_middleware::{BoxFuture, Middleware, Next, Request, Response};
//! use courier_middleware::context::MiddlewareContext;
//!
//! struct ServerHeader;
//!
//! impl Middleware for ServerHeader {
//!     fn name(&self) -> &'static str {
//!         "server_header"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let mut response = next.run(ctx, request).await;
//!             response
//!                 .headers_mut()
//!                 .insert("server", http::HeaderValue::from_static("courier"));
//!             response
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use crate::types::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The terminal handler at the end of a chain.
pub type TerminalHandler<'a> =
    Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a>;

/// One stage of the host chain.
///
/// A stage that does not recognise a request MUST pass it on unchanged and
/// without side effects.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this stage, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request, usually by awaiting `next`.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Continuation that runs the rest of the chain.
///
/// Consumed by [`run`](Next::run), so the rest of the chain runs at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(TerminalHandler<'a>),
}

impl<'a> Next<'a> {
    /// Creates a continuation that runs `middleware` before `next`.
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal continuation.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Runs the next stage, or the terminal handler.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                middleware.process(ctx, request, *next).await
            }
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

/// A stage built from a closure.
///
/// ```
/// use courier_middleware::FnMiddleware;
///
/// let stage = FnMiddleware::new("pass_through", |ctx, request, next| {
///     Box::pin(async move { next.run(ctx, request).await })
/// });
/// # let _ = stage;
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a stage from a closure.
    pub fn new(name: &'static str, func: F) -> Self
    where
        F: for<'a> Fn(&'a mut MiddlewareContext, Request, Next<'a>) -> BoxFuture<'a, Response>
            + Send
            + Sync
            + 'static,
    {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext, Request, Next<'a>) -> BoxFuture<'a, Response>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        (self.func)(ctx, request, next)
    }
}

/// A stage that rewrites every request before passing it on.
///
/// ```
/// use courier_middleware::MapRequest;
///
/// // Serve the gateway's landing page for `/`.
/// let stage = MapRequest::new("index", |mut request: courier_middleware::Request| {
///     if request.uri().path() == "/" {
///         *request.uri_mut() = http::Uri::from_static("/index.html");
///     }
///     request
/// });
/// # let _ = stage;
/// ```
pub struct MapRequest<F> {
    name: &'static str,
    func: F,
}

impl<F> MapRequest<F>
where
    F: Fn(Request) -> Request + Send + Sync + 'static,
{
    /// Creates a rewriting stage.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for MapRequest<F>
where
    F: Fn(Request) -> Request + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        let request = (self.func)(request);
        Box::pin(next.run(ctx, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::{HeaderValue, StatusCode};
    use http_body_util::Full;

    struct Recorder {
        name: &'static str,
    }

    #[derive(Default)]
    struct Visited(Vec<&'static str>);

    impl Middleware for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                let mut visited = ctx.remove_extension::<Visited>().unwrap_or_default();
                visited.0.push(self.name);
                ctx.set_extension(visited);
                next.run(ctx, request).await
            })
        }
    }

    fn request(path: &str) -> Request {
        http::Request::builder()
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok_handler() -> Next<'static> {
        Next::handler(|_ctx, _req| Box::pin(async { Response::status_only(StatusCode::OK) }))
    }

    #[tokio::test]
    async fn test_next_handler() {
        let mut ctx = MiddlewareContext::new();
        let response = ok_handler().run(&mut ctx, request("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let first = Recorder { name: "first" };
        let second = Recorder { name: "second" };
        let mut ctx = MiddlewareContext::new();

        let next = Next::new(&first, Next::new(&second, ok_handler()));
        let response = next.run(&mut ctx, request("/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ctx.get_extension::<Visited>().unwrap().0,
            vec!["first", "second"]
        );
    }

    #[tokio::test]
    async fn test_fn_middleware_wraps_response() {
        let stage = FnMiddleware::new("tag", |ctx, request, next| {
            Box::pin(async move {
                let mut response = next.run(ctx, request).await;
                response
                    .headers_mut()
                    .insert("x-tag", HeaderValue::from_static("seen"));
                response
            })
        });
        let mut ctx = MiddlewareContext::new();
        let response = stage.process(&mut ctx, request("/"), ok_handler()).await;
        assert_eq!(response.headers().get("x-tag").unwrap(), "seen");
    }

    #[tokio::test]
    async fn test_map_request_rewrites_path() {
        let stage = MapRequest::new("index", |mut request: Request| {
            if request.uri().path() == "/" {
                *request.uri_mut() = http::Uri::from_static("/index.html");
            }
            request
        });
        let echo = Next::handler(|_ctx, req: Request| {
            let path = req.uri().path().to_string();
            Box::pin(async move { Response::with_body(StatusCode::OK, "text/plain", path) })
        });
        let mut ctx = MiddlewareContext::new();
        let response = stage.process(&mut ctx, request("/"), echo).await;
        let body = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        assert_eq!(&body[..], b"/index.html");
    }
}
