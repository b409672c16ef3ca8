//! The server half of a contract call.
//!
//! `#[courier::contract]` implements [`Dispatch`] for `dyn Trait`. The
//! generated `dispatch` matches on the method's position in the contract
//! table, reads each argument from the [`ServerCall`], awaits the
//! implementation and encodes the result with [`ServerCall::reply`].

use async_trait::async_trait;
use bytes::Bytes;
use courier_core::{ContentType, Contract, ContractSpec, CourierError, MethodSpec};
use courier_router::{Bindings, RouteArg, RouteDescriptor};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Server-side glue generated for each contract.
#[async_trait]
pub trait Dispatch: Contract {
    /// Invokes the method at `index` of [`Contract::spec`] and returns the
    /// encoded result.
    async fn dispatch(&self, index: usize, call: &ServerCall) -> Result<String, CourierError>;
}

/// Everything bound from one matched request.
#[derive(Debug, Clone)]
pub struct ServerCall {
    contract: &'static ContractSpec,
    method: &'static MethodSpec,
    bindings: Bindings,
    body: Bytes,
    content_type: ContentType,
}

impl ServerCall {
    /// Creates a call for the method served by `descriptor`.
    #[must_use]
    pub fn new(
        descriptor: &RouteDescriptor,
        bindings: Bindings,
        body: Bytes,
        content_type: ContentType,
    ) -> Self {
        Self {
            contract: descriptor.contract(),
            method: descriptor.method(),
            bindings,
            body,
            content_type,
        }
    }

    /// The negotiated content type.
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// The method being called.
    #[must_use]
    pub const fn method(&self) -> &'static MethodSpec {
        self.method
    }

    /// Placeholder and query values.
    #[must_use]
    pub const fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Reads a placeholder or query parameter.
    pub fn param<T: RouteArg>(&self, name: &str) -> Result<T, CourierError> {
        T::read_route(name, &self.bindings).map_err(Into::into)
    }

    /// Decodes the request body as the body parameter `name`.
    pub fn body<T: DeserializeOwned>(&self, name: &str) -> Result<T, CourierError> {
        let text = std::str::from_utf8(&self.body).map_err(|e| {
            CourierError::binding_for(name, format!("request body is not UTF-8: {e}"))
        })?;
        self.content_type
            .decode(text)
            .map_err(|e| CourierError::binding_for(name, format!("cannot read request body: {e}")))
    }

    /// Encodes a return value with the negotiated content type.
    pub fn reply<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CourierError> {
        self.content_type
            .encode(value)
            .map_err(|e| CourierError::invocation(&e))
    }

    /// The error for an index the implementation does not serve.
    #[must_use]
    pub fn missing_method(&self) -> CourierError {
        CourierError::ambiguous_or_missing(
            self.contract.name,
            self.method.name,
            "the implementation has no method for this route",
        )
    }
}
