//! # Courier Test
//!
//! In-memory testing for Courier services. Nothing binds a port:
//!
//! - [`TestClient`] sends hand-built requests into a `Pipeline` and returns a
//!   [`TestResponse`] with decoding and assertion helpers.
//! - [`PipelineTransport`] is an `HttpTransport` for generated clients, so a
//!   full client → dispatcher → implementation round trip runs in one
//!   process.
//!
//! ## Example
//!
//! ```ignore
//! use courier_test::{PipelineTransport, TestClient};
//!
//! let pipeline = Arc::new(install_endpoint::<dyn Orders>(
//!     Pipeline::builder(),
//!     None,
//!     Resolver::instance(orders),
//! ).build());
//!
//! // Raw HTTP
//! let response = TestClient::new(pipeline.clone())
//!     .get("/get")
//!     .content_type("application/json")
//!     .send()
//!     .await?;
//! response.assert_status(StatusCode::OK);
//!
//! // Through the generated client
//! let endpoints = Endpoints::new(PipelineTransport::new(pipeline).shared())
//!     .with_endpoint::<OrdersClient>(EndpointOptions::new("http://orders"));
//! let orders = endpoints.client::<OrdersClient>()?.get().await?;
//! ```

#![doc(html_root_url = "https://docs.rs/courier-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;
mod transport;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
pub use transport::PipelineTransport;
