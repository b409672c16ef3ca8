//! # courier-server
//!
//! Server side of courier contracts.
//!
//! - [`install_endpoint`] adds the dispatching stages of a contract to a
//!   pipeline; the implementation is found through a [`Resolver`].
//! - [`install_redirect`] adds the redirect fallback for a contract owned by
//!   another process.
//! - [`Server`] serves a pipeline over HTTP/1.1 with graceful shutdown.
//!
//! The glue between a request and a trait method is the [`Dispatch`] impl
//! that `#[courier::contract]` generates for `dyn Trait`.

#![doc(html_root_url = "https://docs.rs/courier-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod call;
pub mod config;
mod endpoint;
mod error;
mod redirect;
mod server;
pub mod shutdown;

pub use call::{Dispatch, ServerCall};
pub use config::ServerConfig;
pub use endpoint::{install_endpoint, EndpointMiddleware, Resolver, UNSUPPORTED_CONTENT_TYPE_MESSAGE};
pub use error::ServerError;
pub use redirect::{install_redirect, RedirectMiddleware, RedirectTarget};
pub use server::Server;
pub use shutdown::{ConnectionTracker, ShutdownSignal};
