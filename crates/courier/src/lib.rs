//! # Courier
//!
//! **Convention-based HTTP RPC for Rust traits**
//!
//! Courier exposes an async trait over HTTP and lets another process call it
//! through a generated client that implements the same trait:
//!
//! - 📜 **Contracts** – annotate a trait with `#[courier::contract]`
//! - 🧭 **Conventional routes** – method names become paths and verbs, with overrides
//! - 🔁 **Both sides from one table** – server and client derive routes identically
//! - 🧾 **Structured errors** – failures cross the wire as JSON exception info
//! - 🪪 **Correlation tokens** – propagated through chained calls
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! #[courier::contract(prefix = "cart")]
//! pub trait ShoppingCart {
//!     async fn get(&self) -> Result<Vec<Order>, CourierError>;
//!
//!     #[put]
//!     #[route("addorder/{productId}/{qty}")]
//!     async fn add_order(&self, product_id: Uuid, qty: i32) -> Result<Order, CourierError>;
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cart: Arc<dyn ShoppingCart> = Arc::new(MemoryCart::default());
//!
//!     let pipeline = Pipeline::builder().stage(CorrelationTokenMiddleware::new());
//!     let pipeline = install_endpoint::<dyn ShoppingCart>(pipeline, None, Resolver::instance(cart));
//!
//!     Server::new(ServerConfig::default(), pipeline.build()).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! And from another service:
//!
//! ```rust,ignore
//! let endpoints = Endpoints::reqwest()
//!     .with_endpoint::<ShoppingCartClient>(EndpointOptions::new("http://cart:8080/cart"));
//! let cart = endpoints.client::<ShoppingCartClient>()?;
//! let order = cart.add_order(product_id, 3).await?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! client call → ClientProxy → HttpTransport ──HTTP──▶ Server → Pipeline
//!                                                              ↓
//!                         CorrelationToken → RequestLogging → Endpoint(s) → Redirect → 404
//! ```

#![doc(html_root_url = "https://docs.rs/courier/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use courier_core as core;

// Re-export route derivation and parameter binding
pub use courier_router as router;

// Re-export the middleware chain
pub use courier_middleware as middleware;

// Re-export the dispatcher, redirect fallback and serving loop
pub use courier_server as server;

// Re-export the client proxy
pub use courier_client as client;

// Re-export macros
pub use courier_macros::{contract, RouteArg};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    pub use async_trait::async_trait;
    pub use uuid::Uuid;

    pub use courier_core::{
        Container, ContentType, Contract, CourierError, CourierResult, ExceptionInfo,
        RequestScope,
    };

    pub use courier_router::{RouteArg, RouteDescriptor};

    pub use courier_middleware::stages::{
        CorrelationTokenMiddleware, CorrelationTokens, RequestLoggingMiddleware,
    };
    pub use courier_middleware::{FnMiddleware, MapRequest, Middleware, Pipeline};

    pub use courier_server::{
        install_endpoint, install_redirect, Resolver, Server, ServerConfig,
    };

    pub use courier_client::{ContractClient, EndpointOptions, Endpoints};

    pub use courier_macros::{contract, RouteArg};
}

/// Items referenced by macro-generated code. Not a public API.
#[doc(hidden)]
pub mod __private {
    pub use async_trait::async_trait;

    pub use courier_client::{ClientProxy, ContractClient};
    pub use courier_core::{Contract, ContractSpec, CourierError, MethodSpec, ParamSpec, Verb};
    pub use courier_router::{BindingError, Bindings, RouteArg};
    pub use courier_server::{Dispatch, ServerCall};
}
