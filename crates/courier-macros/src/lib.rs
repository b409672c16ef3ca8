//! Procedural macros for Courier contracts.
//!
//! # Contracts
//!
//! `#[contract]` turns an async trait into an HTTP contract. The server side
//! dispatches requests to any implementation, and a generated `<Trait>Client`
//! implements the same trait by calling a remote server.
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! #[courier::contract(prefix = "cart")]
//! pub trait ShoppingCart {
//!     async fn get(&self) -> Result<Cart, CourierError>;
//!
//!     #[put]
//!     #[route("addorder/{productId}/{qty}")]
//!     async fn add_order(&self, product_id: Uuid, qty: i32) -> Result<Order, CourierError>;
//!
//!     async fn post_note(&self, #[body] note: Note) -> Result<(), CourierError>;
//! }
//! ```
//!
//! Method attributes:
//!
//! - `#[get]`, `#[put]`, `#[post]`, `#[patch]`, `#[delete]` - verb override;
//!   otherwise the verb is taken from the method name's prefix
//! - `#[route("...")]` - route template relative to the contract prefix
//! - `#[name = "..."]` - wire name, by default the UpperCamel method name
//!
//! Parameters are named on the wire in lowerCamel. At most one may be marked
//! `#[body]`; all others travel in placeholders or the query string and must
//! implement `RouteArg`.
//!
//! # Structured query parameters
//!
//! `#[derive(RouteArg)]` spreads a struct's fields over the query string.

mod case;
mod contract;
mod parse;
mod route_arg;

use proc_macro::TokenStream;

/// Declares a trait as a Courier contract.
///
/// Accepts an optional `prefix = "..."` literal prepended to every route.
#[proc_macro_attribute]
pub fn contract(attr: TokenStream, item: TokenStream) -> TokenStream {
    contract::expand_contract(attr.into(), item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives `RouteArg` for a struct with named fields.
///
/// The struct must implement `Default`. Field options:
///
/// - `#[courier(rename = "...")]` - wire name instead of the lowerCamel field name
/// - `#[courier(skip)]` - never written, left at its default when read
#[proc_macro_derive(RouteArg, attributes(courier))]
pub fn derive_route_arg(input: TokenStream) -> TokenStream {
    route_arg::expand_route_arg(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
