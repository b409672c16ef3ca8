//! Static contract metadata.
//!
//! A contract is a Rust trait annotated with `#[courier::contract]`. The
//! attribute macro emits one immutable [`ContractSpec`] per trait; both the
//! server dispatcher and the client proxy derive their routes from that table,
//! which is what lets the two sides agree on URLs without coordination.
//!
//! The table can also be written by hand, which is how the lower crates test
//! themselves without the macro:
//!
//! ```
//! use courier_core::contract::{ContractSpec, MethodSpec, ParamSpec, Verb};
//!
//! static CART: ContractSpec = ContractSpec {
//!     name: "ShoppingCart",
//!     prefix: None,
//!     methods: &[
//!         MethodSpec::new("Get", &[]),
//!         MethodSpec::new(
//!             "AddOrder",
//!             &[ParamSpec::route("productId", "Uuid"), ParamSpec::route("qty", "i32")],
//!         )
//!         .with_verb(Verb::Put)
//!         .with_route("addorder/{productId}/{qty}"),
//!     ],
//! };
//!
//! assert_eq!(CART.methods[0].verb(), Verb::Get);
//! assert_eq!(CART.methods[1].verb(), Verb::Put);
//! ```

use std::fmt;
use std::str::FromStr;

/// HTTP verbs a contract method can be served under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Verb {
    /// Verbs in the order method-name prefixes are tested.
    pub const NAME_PREFIX_ORDER: [Verb; 5] = [
        Verb::Delete,
        Verb::Get,
        Verb::Patch,
        Verb::Post,
        Verb::Put,
    ];

    /// Returns the upper-case verb token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Derives a verb from a method name.
    ///
    /// The name is upper-cased and tested against `DELETE`, `GET`, `PATCH`,
    /// `POST` and `PUT` in that order; the first prefix that matches wins.
    /// Names without a verb prefix map to `GET`.
    ///
    /// ```
    /// use courier_core::contract::Verb;
    ///
    /// assert_eq!(Verb::from_method_name("deleteOrder"), Verb::Delete);
    /// assert_eq!(Verb::from_method_name("AddOrder"), Verb::Get);
    /// ```
    #[must_use]
    pub fn from_method_name(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        Self::NAME_PREFIX_ORDER
            .into_iter()
            .find(|verb| upper.starts_with(verb.as_str()))
            .unwrap_or(Self::Get)
    }

    /// Converts to an [`http::Method`].
    #[must_use]
    pub fn to_method(&self) -> http::Method {
        match self {
            Self::Get => http::Method::GET,
            Self::Put => http::Method::PUT,
            Self::Post => http::Method::POST,
            Self::Patch => http::Method::PATCH,
            Self::Delete => http::Method::DELETE,
        }
    }

    /// Returns `true` if `method` is this verb.
    #[must_use]
    pub fn matches(&self, method: &http::Method) -> bool {
        method.as_str().eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown verb token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown HTTP verb: {0}")]
pub struct UnknownVerb(pub String);

impl FromStr for Verb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAME_PREFIX_ORDER
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVerb(s.to_string()))
    }
}

/// Where a parameter's value travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// Placeholder segment or query-string key(s).
    Route,
    /// The whole request body.
    Body,
}

/// A declared contract method parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Wire name used for placeholders and query keys.
    pub name: &'static str,
    /// Declared type, as written in the contract.
    pub type_name: &'static str,
    /// How the value is carried.
    pub source: ParamSource,
}

impl ParamSpec {
    /// A parameter bound from a placeholder or the query string.
    #[must_use]
    pub const fn route(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            source: ParamSource::Route,
        }
    }

    /// A parameter read from the request body.
    #[must_use]
    pub const fn body(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            source: ParamSource::Body,
        }
    }

    /// Returns `true` for the body parameter.
    #[must_use]
    pub const fn is_body(&self) -> bool {
        matches!(self.source, ParamSource::Body)
    }
}

/// A declared contract method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    /// Contract-level method name (`AddOrder`).
    pub name: &'static str,
    /// Explicit verb override.
    pub verb_override: Option<Verb>,
    /// Explicit route template (`addorder/{productId}/{qty}`).
    pub route: Option<&'static str>,
    /// Ordered parameters.
    pub params: &'static [ParamSpec],
    /// `true` when the method returns nothing.
    pub returns_unit: bool,
}

impl MethodSpec {
    /// Creates a method with no overrides and a non-unit return type.
    #[must_use]
    pub const fn new(name: &'static str, params: &'static [ParamSpec]) -> Self {
        Self {
            name,
            verb_override: None,
            route: None,
            params,
            returns_unit: false,
        }
    }

    /// Sets the verb override.
    #[must_use]
    pub const fn with_verb(mut self, verb: Verb) -> Self {
        self.verb_override = Some(verb);
        self
    }

    /// Sets the route template override.
    #[must_use]
    pub const fn with_route(mut self, route: &'static str) -> Self {
        self.route = Some(route);
        self
    }

    /// Marks the method as returning `()`.
    #[must_use]
    pub const fn returning_unit(mut self) -> Self {
        self.returns_unit = true;
        self
    }

    /// The effective verb: the override, else derived from the name.
    #[must_use]
    pub fn verb(&self) -> Verb {
        self.verb_override
            .unwrap_or_else(|| Verb::from_method_name(self.name))
    }

    /// Returns the body parameter and its position, if declared.
    #[must_use]
    pub fn body_param(&self) -> Option<(usize, &'static ParamSpec)> {
        self.params.iter().enumerate().find(|(_, p)| p.is_body())
    }

    /// Returns `true` if this method accepts arguments of the given types.
    ///
    /// Arity must be equal and every declared type must equal the argument
    /// type at the same position.
    #[must_use]
    pub fn accepts(&self, arg_types: &[&str]) -> bool {
        self.params.len() == arg_types.len()
            && self
                .params
                .iter()
                .zip(arg_types)
                .all(|(param, arg)| same_type(param.type_name, arg))
    }
}

/// Compares type names ignoring whitespace, so `Option < i32 >` equals `Option<i32>`.
fn same_type(declared: &str, actual: &str) -> bool {
    declared
        .chars()
        .filter(|c| !c.is_whitespace())
        .eq(actual.chars().filter(|c| !c.is_whitespace()))
}

/// The static description of one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractSpec {
    /// Contract name (the trait name).
    pub name: &'static str,
    /// Literal path prefix declared on the contract itself.
    pub prefix: Option<&'static str>,
    /// Declared methods, in declaration order.
    pub methods: &'static [MethodSpec],
}

impl ContractSpec {
    /// Returns the prefix split into literal segments.
    pub fn prefix_segments(&self) -> impl Iterator<Item = &'static str> {
        self.prefix
            .into_iter()
            .flat_map(|p| p.trim_matches('/').split('/'))
            .filter(|s| !s.is_empty())
    }

    /// Returns every method with the given contract name.
    pub fn methods_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (usize, &'static MethodSpec)> + 'a {
        self.methods
            .iter()
            .enumerate()
            .filter(move |(_, m)| m.name == name)
    }
}

/// Implemented by `dyn Trait` for every `#[courier::contract]` trait.
///
/// The implementation only exposes the static table; routing lives in
/// `courier-router` and dispatch in `courier-server`.
pub trait Contract: Send + Sync + 'static {
    /// The contract's static method table.
    fn spec() -> &'static ContractSpec;
}
