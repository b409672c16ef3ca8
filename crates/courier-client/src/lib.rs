//! # courier-client
//!
//! Client side of courier contracts.
//!
//! `#[courier::contract]` generates a `TraitClient` for every contract. Each
//! of its methods resolves the method's descriptor, fills a [`ClientCall`]
//! and sends it through a [`ClientProxy`], so a remote service is called
//! exactly like a local implementation:
//!
//! ```rust,ignore
//! let endpoints = Endpoints::reqwest()
//!     .with_endpoint::<OrdersClient>(EndpointOptions::new("http://localhost:5002"));
//! let orders = endpoints.client::<OrdersClient>()?;
//! let order = orders.add_order(product_id, 3).await?;
//! ```
//!
//! Every failure of a client call is a `CourierError::Remote` carrying an
//! `ExceptionInfo`.

#![doc(html_root_url = "https://docs.rs/courier-client/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod endpoints;
mod options;
mod proxy;
pub mod transport;

pub use endpoints::{ContractClient, Endpoints};
pub use options::EndpointOptions;
pub use proxy::{ClientCall, ClientProxy};
pub use transport::{HttpTransport, OutboundRequest, OutboundResponse, ReqwestTransport, TransportError};
