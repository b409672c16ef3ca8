//! Route derivation and parameter binding for Courier contracts.
//!
//! This crate turns the static method table of a contract into
//! [`RouteDescriptor`]s and moves parameter values between Rust values and
//! request paths and query strings.
//!
//! # Example
//!
//! ```rust
//! use courier_core::{ContractSpec, MethodSpec, ParamSpec, Verb};
//! use courier_router::{RouteArg, RouteDescriptor};
//!
//! static CART: ContractSpec = ContractSpec {
//!     name: "ShoppingCart",
//!     prefix: None,
//!     methods: &[MethodSpec::new(
//!         "AddOrder",
//!         &[ParamSpec::route("productId", "u32"), ParamSpec::route("qty", "i32")],
//!     )
//!     .with_verb(Verb::Put)
//!     .with_route("addorder/{productId}/{qty}")],
//! };
//!
//! let route = RouteDescriptor::derive_one(&CART, "AddOrder", &["u32", "i32"]).unwrap();
//!
//! // Client side: values to a request target.
//! let mut pairs = Vec::new();
//! 17u32.write_route("productId", &mut pairs);
//! 3i32.write_route("qty", &mut pairs);
//! let target = route.build_request(pairs);
//! assert_eq!(target.path, "/addorder/17/3");
//!
//! // Server side: request target back to values.
//! assert!(route.is_match(&target.path));
//! let bindings = route.bind(&target.path, target.query.as_deref()).unwrap();
//! assert_eq!(i32::read_route("qty", &bindings).unwrap(), 3);
//! ```

mod arg;
mod bindings;
mod descriptor;

pub use arg::{BindingError, RouteArg};
pub use bindings::{Bindings, Origin};
pub use descriptor::{BuiltRequest, RouteDescriptor, Segment};
