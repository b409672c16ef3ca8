//! # Courier Core
//!
//! Core types shared by the Courier server dispatcher and client proxy.
//!
//! - [`ContractSpec`] / [`MethodSpec`] / [`ParamSpec`] - static contract metadata
//! - [`Contract`] - implemented for every `dyn Trait` annotated as a contract
//! - [`ContentType`] - content negotiation and the JSON/XML body codecs
//! - [`CourierError`] / [`ExceptionInfo`] - in-process and wire errors
//! - [`Container`] - service registry used to resolve implementations
//! - [`RequestScope`] - ambient state of the request being handled

#![doc(html_root_url = "https://docs.rs/courier-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod contract;
pub mod di;
mod error;
mod scope;

pub use codec::{CodecError, ContentType};
pub use contract::{Contract, ContractSpec, MethodSpec, ParamSource, ParamSpec, UnknownVerb, Verb};
pub use di::{Container, ResolveError};
pub use error::{CourierError, CourierResult, DataEntry, ErrorKind, ExceptionInfo};
pub use scope::RequestScope;
