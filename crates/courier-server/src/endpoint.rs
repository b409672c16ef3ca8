//! The contract dispatcher.
//!
//! [`install_endpoint`] adds one [`EndpointMiddleware`] per contract method
//! to a pipeline. Each stage answers only requests whose verb and path match
//! its descriptor and passes everything else on untouched.
//!
//! For a matching request a stage:
//!
//! 1. negotiates the content type, answering `400` with a JSON
//!    [`ExceptionInfo`](courier_core::ExceptionInfo) if none is recognised;
//! 2. resolves the implementation;
//! 3. binds placeholders, query and body, and awaits the method inside a
//!    [`RequestScope`] so chained client calls inherit the content type and
//!    correlation token (taken from the context, else from the
//!    `Correlation-Token` header, else freshly generated);
//! 4. answers `200` with the encoded result (no body for `()`), or `500`
//!    with a JSON `ExceptionInfo` for any failure in steps 2 and 3.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use courier_core::{ContentType, Container, CourierError, RequestScope};
use courier_middleware::context::MiddlewareContext;
use courier_middleware::{
    BoxFuture, CorrelationTokens, Middleware, Next, PipelineBuilder, Request, Response,
    ResponseExt,
};
use courier_router::RouteDescriptor;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use http_body_util::BodyExt;

use crate::call::{Dispatch, ServerCall};

/// Message of the `400` answer to an unrecognised content type.
pub const UNSUPPORTED_CONTENT_TYPE_MESSAGE: &str =
    "Http request must contain a 'Content-Type' header 'application/xml' or 'application/json'";

type ResolveFn<C> = dyn Fn() -> Result<Arc<C>, CourierError> + Send + Sync;

/// Produces the implementation of contract `C` for each request.
pub struct Resolver<C: ?Sized> {
    resolve: Arc<ResolveFn<C>>,
}

impl<C> Resolver<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    /// Always returns the same instance.
    pub fn instance(instance: Arc<C>) -> Self {
        Self::from_fn(move || Ok(Arc::clone(&instance)))
    }

    /// Resolves `C` from a container on every request.
    pub fn container(container: Arc<Container>) -> Self {
        Self::from_fn(move || {
            container
                .resolve_required::<C>()
                .map_err(|e| CourierError::invocation(&e))
        })
    }

    /// Uses a closure.
    pub fn from_fn<F>(resolve: F) -> Self
    where
        F: Fn() -> Result<Arc<C>, CourierError> + Send + Sync + 'static,
    {
        Self {
            resolve: Arc::new(resolve),
        }
    }

    /// Resolves the implementation.
    pub fn resolve(&self) -> Result<Arc<C>, CourierError> {
        (self.resolve)()
    }
}

impl<C: ?Sized> Clone for Resolver<C> {
    fn clone(&self) -> Self {
        Self {
            resolve: Arc::clone(&self.resolve),
        }
    }
}

impl<C: ?Sized> fmt::Debug for Resolver<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("contract", &std::any::type_name::<C>())
            .finish()
    }
}

/// The dispatching stage for one contract method.
pub struct EndpointMiddleware<C: ?Sized> {
    descriptor: RouteDescriptor,
    resolver: Resolver<C>,
    _contract: PhantomData<fn() -> Arc<C>>,
}

impl<C> EndpointMiddleware<C>
where
    C: ?Sized + Dispatch,
{
    /// Creates the stage serving `descriptor`.
    pub fn new(descriptor: RouteDescriptor, resolver: Resolver<C>) -> Self {
        Self {
            descriptor,
            resolver,
            _contract: PhantomData,
        }
    }

    /// The descriptor this stage serves.
    pub const fn descriptor(&self) -> &RouteDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, content_type: ContentType, request: Request) -> Result<String, CourierError> {
        let implementation = self.resolver.resolve()?;

        let (parts, body) = request.into_parts();
        let body: Bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        let bindings = self.descriptor.bind(parts.uri.path(), parts.uri.query())?;
        let call = ServerCall::new(&self.descriptor, bindings, body, content_type);

        implementation.dispatch(self.descriptor.index(), &call).await
    }
}

impl<C> Middleware for EndpointMiddleware<C>
where
    C: ?Sized + Dispatch,
{
    fn name(&self) -> &'static str {
        "endpoint"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if !self.descriptor.is_match(request.uri().path())
                || !self.descriptor.verb().matches(request.method())
            {
                return next.run(ctx, request).await;
            }

            let contract = self.descriptor.contract().name;
            let method = self.descriptor.method().name;
            tracing::debug!(contract, method, route = %self.descriptor, "request matched");

            let header = request
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let Some(content_type) = header.as_deref().and_then(ContentType::negotiate) else {
                tracing::warn!(contract, method, content_type = ?header, "unsupported content type");
                let err = CourierError::unsupported_content_type(UNSUPPORTED_CONTENT_TYPE_MESSAGE);
                return error_response(StatusCode::BAD_REQUEST, &err);
            };

            // Without a correlation stage the token still flows from the default header.
            let token = ctx.correlation_token().map_or_else(
                || CorrelationTokens::new().resolve(request.headers(), None),
                str::to_string,
            );
            let scope = RequestScope::new(header, Some(token));
            match scope.run(self.invoke(content_type, request)).await {
                Ok(body) => {
                    let body = if self.descriptor.method().returns_unit {
                        String::new()
                    } else {
                        body
                    };
                    Response::with_body(StatusCode::OK, content_type.as_str(), body)
                }
                Err(err) => {
                    tracing::error!(contract, method, error = %err, "invocation failed");
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, &err)
                }
            }
        })
    }
}

impl<C: ?Sized> fmt::Debug for EndpointMiddleware<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointMiddleware")
            .field("descriptor", &self.descriptor.to_string())
            .finish()
    }
}

/// Writes `err` as a JSON `ExceptionInfo`, whatever the request negotiated.
fn error_response(status: StatusCode, err: &CourierError) -> Response {
    let body = serde_json::to_string(&err.to_info()).unwrap_or_default();
    Response::with_body(status, ContentType::JSON, body)
}

/// Adds one dispatching stage per method of `C`, mounted under `mount_root`.
///
/// ```rust,ignore
/// let pipeline = Pipeline::builder()
///     .stage(CorrelationTokenMiddleware::new());
/// let pipeline = install_endpoint::<dyn Catalog>(
///     pipeline,
///     Some("catalog"),
///     Resolver::instance(Arc::new(InMemoryCatalog::default()) as Arc<dyn Catalog>),
/// )
/// .build();
/// ```
pub fn install_endpoint<C>(
    mut builder: PipelineBuilder,
    mount_root: Option<&str>,
    resolver: Resolver<C>,
) -> PipelineBuilder
where
    C: ?Sized + Dispatch,
{
    for descriptor in RouteDescriptor::derive_all(C::spec(), mount_root) {
        tracing::debug!(route = %descriptor, "installing endpoint");
        builder = builder.stage(EndpointMiddleware::new(descriptor, resolver.clone()));
    }
    builder
}
