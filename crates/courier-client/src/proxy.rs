//! The client half of a contract call.
//!
//! A generated client method looks up its descriptor, writes its arguments
//! into a [`ClientCall`] and awaits [`ClientCall::send`]:
//!
//! ```rust,ignore
//! self.proxy
//!     .call("AddOrder", &["Uuid", "i32"])?
//!     .arg("productId", &product_id)
//!     .arg("qty", &qty)
//!     .send()
//!     .await
//! ```
//!
//! Every failure leaving this module is a [`CourierError::Remote`]: a
//! structured error reported by the remote side, an undecodable error body,
//! or a transport fault.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use courier_core::{ContentType, ContractSpec, CourierError, ExceptionInfo, RequestScope};
use courier_middleware::CorrelationTokens;
use courier_router::{RouteArg, RouteDescriptor};
use http::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::options::EndpointOptions;
use crate::transport::{HttpTransport, OutboundRequest, OutboundResponse};

/// Sends calls of one contract to one endpoint.
#[derive(Clone)]
pub struct ClientProxy {
    contract: &'static ContractSpec,
    options: EndpointOptions,
    transport: Arc<dyn HttpTransport>,
    tokens: CorrelationTokens,
}

impl ClientProxy {
    /// Creates a proxy for `contract`.
    pub fn new(
        contract: &'static ContractSpec,
        options: EndpointOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            contract,
            options,
            transport,
            tokens: CorrelationTokens::new(),
        }
    }

    /// Uses a non-default correlation header.
    pub fn with_tokens(mut self, tokens: CorrelationTokens) -> Self {
        self.tokens = tokens;
        self
    }

    /// The contract this proxy calls.
    pub const fn contract(&self) -> &'static ContractSpec {
        self.contract
    }

    /// The endpoint settings.
    pub const fn options(&self) -> &EndpointOptions {
        &self.options
    }

    /// Starts a call to the method `name` taking `arg_types`.
    ///
    /// The content type and correlation token come from the inbound request
    /// being handled, if any, else from the options and a fresh token.
    pub fn call(&self, name: &str, arg_types: &[&str]) -> Result<ClientCall<'_>, CourierError> {
        let descriptor = RouteDescriptor::derive_one(self.contract, name, arg_types)
            .map_err(CourierError::into_remote)?;

        let scope = RequestScope::current();
        let content_type = scope
            .as_ref()
            .and_then(RequestScope::negotiated)
            .unwrap_or(self.options.content_type);
        let correlation_token = scope
            .and_then(|s| s.correlation_token)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(CorrelationTokens::fresh);

        Ok(ClientCall {
            proxy: self,
            descriptor,
            content_type,
            correlation_token,
            pairs: Vec::new(),
            body: None,
        })
    }
}

impl fmt::Debug for ClientProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientProxy")
            .field("contract", &self.contract.name)
            .field("options", &self.options)
            .field("correlation_header", self.tokens.header_name())
            .finish_non_exhaustive()
    }
}

/// One outbound contract call being assembled.
#[derive(Debug)]
pub struct ClientCall<'p> {
    proxy: &'p ClientProxy,
    descriptor: RouteDescriptor,
    content_type: ContentType,
    correlation_token: String,
    pairs: Vec<(String, String)>,
    body: Option<String>,
}

impl ClientCall<'_> {
    /// The descriptor of the called method.
    pub const fn descriptor(&self) -> &RouteDescriptor {
        &self.descriptor
    }

    /// The content type the call is sent with.
    pub const fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// The correlation token the call carries.
    pub fn correlation_token(&self) -> &str {
        &self.correlation_token
    }

    /// Adds a placeholder or query argument.
    pub fn arg<T: RouteArg>(mut self, name: &str, value: &T) -> Self {
        value.write_route(name, &mut self.pairs);
        self
    }

    /// Sets the body argument.
    pub fn body<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, CourierError> {
        let text = self
            .content_type
            .encode(value)
            .map_err(|e| CourierError::invocation(&e).into_remote())?;
        self.body = Some(text);
        Ok(self)
    }

    /// Sends the call and decodes the result.
    pub async fn send<R: DeserializeOwned>(self) -> Result<R, CourierError> {
        let built = self.descriptor.build_request(self.pairs);
        let url = self.proxy.options.url_for(&built.path_and_query());

        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(self.content_type.as_str())
            .map_err(|e| CourierError::transport("invalid content type header", e).into_remote())?;
        headers.insert(ACCEPT, token.clone());
        headers.insert(CONTENT_TYPE, token);
        if let Ok(value) = HeaderValue::from_str(&self.correlation_token) {
            headers.insert(self.proxy.tokens.header_name().clone(), value);
        }

        let method = self.descriptor.verb().to_method();
        tracing::debug!(
            contract = self.proxy.contract.name,
            method = self.descriptor.method().name,
            http.method = %method,
            url,
            correlation_token = %self.correlation_token,
            "sending contract call"
        );

        let request = OutboundRequest {
            method,
            url: url.clone(),
            headers,
            body: self.body.map(Bytes::from),
        };
        let response = match self.proxy.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url, error = %e, "contract call failed in transport");
                return Err(CourierError::transport(format!("call to {url} failed"), e).into_remote());
            }
        };

        if response.is_success() {
            decode_success(&response, self.content_type)
        } else {
            Err(decode_failure(&response))
        }
    }
}

/// Decodes a 2xx body with the response's own content type.
fn decode_success<R: DeserializeOwned>(
    response: &OutboundResponse,
    requested: ContentType,
) -> Result<R, CourierError> {
    let content_type = response
        .content_type()
        .and_then(ContentType::negotiate)
        .unwrap_or(requested);
    content_type
        .decode(&response.body_text())
        .map_err(|e| CourierError::invocation(&e).into_remote())
}

/// Turns a non-2xx answer into a remote error.
fn decode_failure(response: &OutboundResponse) -> CourierError {
    let text = response.body_text();
    match serde_json::from_str::<ExceptionInfo>(&text) {
        Ok(info) => CourierError::remote(info),
        Err(_) => CourierError::remote(
            ExceptionInfo::new(
                "RemoteError",
                format!("remote answered {}: {}", response.status, text),
            )
            .with_data("status", response.status.as_u16().to_string()),
        ),
    }
}
