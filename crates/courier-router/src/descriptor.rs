//! Route descriptors.
//!
//! A [`RouteDescriptor`] is derived once per contract method and never
//! changes afterwards. Its segment list is built from, in order:
//!
//! 1. the mount root, split on `/` into literal segments;
//! 2. the contract's own prefix, split the same way;
//! 3. the method's route template if it has one, else a single literal equal
//!    to the method name lower-cased.
//!
//! Matching compares segment counts, then each literal exactly (case
//! sensitive); placeholders accept any text.

use std::fmt;

use courier_core::{ContractSpec, CourierError, MethodSpec, Verb};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::arg::BindingError;
use crate::bindings::{Bindings, Origin};

/// Characters escaped in query-string keys and values.
const QUERY_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'%');

/// One path token of a route template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches only itself.
    Literal(String),
    /// Matches any text and binds it to the named parameter.
    Placeholder(String),
}

impl Segment {
    /// Parses one template token; `{name}` is a placeholder.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token.strip_prefix('{') {
            Some(rest) => Self::Placeholder(rest.strip_suffix('}').unwrap_or(rest).to_string()),
            None => Self::Literal(token.to_string()),
        }
    }

    /// Returns the placeholder name, if this is a placeholder.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Self::Placeholder(name) => Some(name),
            Self::Literal(_) => None,
        }
    }

    /// Returns `true` if this segment accepts `text` at its position.
    #[must_use]
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == text,
            Self::Placeholder(_) => true,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => f.write_str(literal),
            Self::Placeholder(name) => write!(f, "{{{name}}}"),
        }
    }
}

/// An outbound request target built from argument values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRequest {
    /// Path with a leading `/` and placeholders substituted.
    pub path: String,
    /// Query string without the leading `?`, if any values went there.
    pub query: Option<String>,
}

impl BuiltRequest {
    /// Returns the path and query joined with `?`.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

/// The derived route of one contract method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    segments: Vec<Segment>,
    verb: Verb,
    contract: &'static ContractSpec,
    index: usize,
}

impl RouteDescriptor {
    /// Derives the descriptor of `contract.methods[index]`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn new(contract: &'static ContractSpec, index: usize, mount_root: Option<&str>) -> Self {
        let method = &contract.methods[index];

        let mut segments: Vec<Segment> = mount_root
            .into_iter()
            .flat_map(|root| root.trim().trim_matches('/').split('/'))
            .filter(|s| !s.is_empty())
            .map(|s| Segment::Literal(s.to_string()))
            .collect();

        segments.extend(
            contract
                .prefix_segments()
                .map(|s| Segment::Literal(s.to_string())),
        );

        match method.route {
            Some(template) => {
                segments.extend(template.trim_matches('/').split('/').map(Segment::parse));
            }
            None => segments.push(Segment::Literal(method.name.to_lowercase())),
        }

        Self {
            segments,
            verb: method.verb(),
            contract,
            index,
        }
    }

    /// Derives one descriptor per declared method, in declaration order.
    #[must_use]
    pub fn derive_all(contract: &'static ContractSpec, mount_root: Option<&str>) -> Vec<Self> {
        (0..contract.methods.len())
            .map(|index| Self::new(contract, index, mount_root))
            .collect()
    }

    /// Derives the descriptor of the one method named `name` whose declared
    /// parameter types equal `arg_types`.
    ///
    /// Fails with [`CourierError::AmbiguousOrMissingMethod`] when no method
    /// or more than one method qualifies.
    pub fn derive_one(
        contract: &'static ContractSpec,
        name: &str,
        arg_types: &[&str],
    ) -> Result<Self, CourierError> {
        let mut candidates = contract
            .methods_named(name)
            .filter(|(_, method)| method.accepts(arg_types))
            .map(|(index, _)| index);

        match (candidates.next(), candidates.next()) {
            (Some(index), None) => Ok(Self::new(contract, index, None)),
            (None, _) => Err(CourierError::ambiguous_or_missing(
                contract.name,
                name,
                format!("no method accepts ({})", arg_types.join(", ")),
            )),
            (Some(_), Some(_)) => Err(CourierError::ambiguous_or_missing(
                contract.name,
                name,
                format!("several methods accept ({})", arg_types.join(", ")),
            )),
        }
    }

    /// The ordered segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The HTTP verb.
    #[must_use]
    pub const fn verb(&self) -> Verb {
        self.verb
    }

    /// The contract this descriptor belongs to.
    #[must_use]
    pub const fn contract(&self) -> &'static ContractSpec {
        self.contract
    }

    /// Position of the method in the contract's table.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The method this descriptor serves.
    #[must_use]
    pub fn method(&self) -> &'static MethodSpec {
        &self.contract.methods[self.index]
    }

    /// Returns the template, e.g. `addorder/{productId}/{qty}`.
    #[must_use]
    pub fn template(&self) -> String {
        self.segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Returns `true` if `path` has this descriptor's shape.
    ///
    /// Leading and trailing slashes are ignored.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        let parts: Vec<&str> = split_path(path).collect();
        parts.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&parts)
                .all(|(segment, part)| segment.accepts(part))
    }

    /// Returns `true` if both the verb and the path match.
    #[must_use]
    pub fn matches(&self, method: &http::Method, path: &str) -> bool {
        self.verb.matches(method) && self.is_match(path)
    }

    /// Binds placeholder values from `path`, then every query-string pair.
    ///
    /// Path segments are percent-decoded.
    pub fn bind(&self, path: &str, query: Option<&str>) -> Result<Bindings, BindingError> {
        let mut bindings = Bindings::new();

        for (segment, part) in self.segments.iter().zip(split_path(path)) {
            if let Some(name) = segment.placeholder() {
                let value = percent_decode_str(part).decode_utf8_lossy();
                bindings.push(name, value.into_owned(), Origin::Placeholder);
            }
        }

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            let pairs: Vec<(String, String)> =
                serde_urlencoded::from_str(query).map_err(|e| BindingError::Invalid {
                    name: "query".to_string(),
                    reason: e.to_string(),
                })?;
            for (name, value) in pairs {
                bindings.push(name, value, Origin::Query);
            }
        }

        Ok(bindings)
    }

    /// Builds the request target from `(name, value)` pairs.
    ///
    /// Each pair fills the first unfilled placeholder of the same name
    /// (compared case-insensitively); everything else goes to the query
    /// string. Placeholder substitution is textual. A placeholder that
    /// received no value is left empty.
    #[must_use]
    pub fn build_request(&self, pairs: Vec<(String, String)>) -> BuiltRequest {
        let mut filled: Vec<Option<String>> = vec![None; self.segments.len()];
        let mut query = Vec::new();

        for (name, value) in pairs {
            let slot = self.segments.iter().enumerate().position(|(i, segment)| {
                filled[i].is_none()
                    && segment
                        .placeholder()
                        .is_some_and(|p| p.eq_ignore_ascii_case(&name))
            });
            match slot {
                Some(i) => filled[i] = Some(value),
                None => query.push(format!(
                    "{}={}",
                    utf8_percent_encode(&name, QUERY_ESCAPE),
                    utf8_percent_encode(&value, QUERY_ESCAPE)
                )),
            }
        }

        let path = self
            .segments
            .iter()
            .zip(filled)
            .map(|(segment, value)| match segment {
                Segment::Literal(literal) => literal.clone(),
                Segment::Placeholder(_) => value.unwrap_or_default(),
            })
            .collect::<Vec<_>>()
            .join("/");

        BuiltRequest {
            path: format!("/{path}"),
            query: (!query.is_empty()).then(|| query.join("&")),
        }
    }
}

impl fmt::Display for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.template())
    }
}

fn split_path(path: &str) -> std::str::Split<'_, char> {
    path.trim_matches('/').split('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{ErrorKind, ParamSpec};
    use proptest::prelude::*;

    static CART: ContractSpec = ContractSpec {
        name: "ShoppingCart",
        prefix: None,
        methods: &[
            MethodSpec::new("Get", &[]),
            MethodSpec::new(
                "AddOrder",
                &[
                    ParamSpec::route("productId", "Uuid"),
                    ParamSpec::route("qty", "i32"),
                ],
            )
            .with_verb(Verb::Put)
            .with_route("addorder/{productId}/{qty}"),
            MethodSpec::new("DeleteOrder", &[ParamSpec::route("orderId", "Uuid")]).returning_unit(),
            MethodSpec::new("GetCartEvents", &[ParamSpec::route("timestamp", "i64")])
                .with_route("getevents/{timestamp}"),
        ],
    };

    static CATALOG: ContractSpec = ContractSpec {
        name: "ProductCatalog",
        prefix: Some("catalog"),
        methods: &[
            MethodSpec::new("Get", &[]),
            MethodSpec::new("Get", &[ParamSpec::route("productId", "Uuid")])
                .with_route("get/{productId}"),
            MethodSpec::new("Find", &[ParamSpec::route("name", "String")]),
            MethodSpec::new("Find", &[ParamSpec::route("name", "String")]),
        ],
    };

    fn literal(s: &str) -> Segment {
        Segment::Literal(s.to_string())
    }

    fn placeholder(s: &str) -> Segment {
        Segment::Placeholder(s.to_string())
    }

    #[test]
    fn test_add_order_descriptor() {
        let d = RouteDescriptor::new(&CART, 1, None);
        assert_eq!(
            d.segments(),
            &[literal("addorder"), placeholder("productId"), placeholder("qty")]
        );
        assert_eq!(d.verb(), Verb::Put);
        assert_eq!(d.to_string(), "PUT addorder/{productId}/{qty}");
    }

    #[test]
    fn test_add_order_binding() {
        let d = RouteDescriptor::new(&CART, 1, None);
        let path = "/addorder/6bf3a1ce-1a4f-4d3b-9a3c-2f6c5c1f0e11/3";
        assert!(d.matches(&http::Method::PUT, path));
        assert!(!d.matches(&http::Method::GET, path));

        let bindings = d.bind(path, None).unwrap();
        assert_eq!(
            bindings.get("productid"),
            Some("6bf3a1ce-1a4f-4d3b-9a3c-2f6c5c1f0e11")
        );
        assert_eq!(bindings.get("qty"), Some("3"));
    }

    #[test]
    fn test_get_without_override() {
        let d = RouteDescriptor::new(&CART, 0, None);
        assert_eq!(d.segments(), &[literal("get")]);
        assert_eq!(d.verb(), Verb::Get);
        assert!(d.is_match("/get"));
        assert!(d.is_match("get/"));
        assert!(!d.is_match("/Get"));
        assert!(!d.is_match("/get/extra"));
    }

    #[test]
    fn test_verb_from_name() {
        assert_eq!(RouteDescriptor::new(&CART, 2, None).verb(), Verb::Delete);
        assert_eq!(RouteDescriptor::new(&CART, 3, None).verb(), Verb::Get);
    }

    #[test]
    fn test_mount_root_and_prefix() {
        let d = RouteDescriptor::new(&CATALOG, 1, Some("/api/products/"));
        assert_eq!(
            d.segments(),
            &[
                literal("api"),
                literal("products"),
                literal("catalog"),
                literal("get"),
                placeholder("productId"),
            ]
        );
        assert!(d.is_match("/api/products/catalog/get/42"));
    }

    #[test]
    fn test_derive_all_preserves_order() {
        let all = RouteDescriptor::derive_all(&CART, None);
        let names: Vec<_> = all.iter().map(|d| d.method().name).collect();
        assert_eq!(names, ["Get", "AddOrder", "DeleteOrder", "GetCartEvents"]);
    }

    #[test]
    fn test_derive_one_resolves_overloads() {
        let none = RouteDescriptor::derive_one(&CATALOG, "Get", &[]).unwrap();
        assert_eq!(none.index(), 0);
        let one = RouteDescriptor::derive_one(&CATALOG, "Get", &["Uuid"]).unwrap();
        assert_eq!(one.index(), 1);
        assert_eq!(one.template(), "catalog/get/{productId}");
    }

    #[test]
    fn test_derive_one_missing() {
        let err = RouteDescriptor::derive_one(&CATALOG, "Get", &["i32"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousOrMissingMethod);
        let err = RouteDescriptor::derive_one(&CATALOG, "Remove", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousOrMissingMethod);
    }

    #[test]
    fn test_derive_one_ambiguous() {
        let err = RouteDescriptor::derive_one(&CATALOG, "Find", &["String"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousOrMissingMethod);
        assert!(err.to_string().contains("several"));
    }

    #[test]
    fn test_bind_reads_query_after_placeholders() {
        let d = RouteDescriptor::new(&CART, 3, None);
        let bindings = d
            .bind("/getevents/100", Some("timestamp=5&extra=a%20b"))
            .unwrap();
        assert_eq!(bindings.get("timestamp"), Some("100"));
        assert_eq!(bindings.get("extra"), Some("a b"));
    }

    #[test]
    fn test_bind_decodes_path_segments() {
        let d = RouteDescriptor::new(&CART, 3, None);
        let bindings = d.bind("/getevents/a%2Fb", None).unwrap();
        assert_eq!(bindings.get("timestamp"), Some("a/b"));
    }

    #[test]
    fn test_build_request_substitutes_and_queries() {
        let d = RouteDescriptor::new(&CART, 1, None);
        let built = d.build_request(vec![
            ("productId".to_string(), "abc".to_string()),
            ("qty".to_string(), "2".to_string()),
            ("note".to_string(), "a b&c".to_string()),
        ]);
        assert_eq!(built.path, "/addorder/abc/2");
        assert_eq!(built.query.as_deref(), Some("note=a%20b%26c"));
        assert_eq!(built.path_and_query(), "/addorder/abc/2?note=a%20b%26c");
    }

    #[test]
    fn test_build_request_without_query() {
        let d = RouteDescriptor::new(&CART, 0, None);
        let built = d.build_request(Vec::new());
        assert_eq!(built.path, "/get");
        assert!(built.query.is_none());
    }

    #[test]
    fn test_build_then_bind_recovers_values() {
        let d = RouteDescriptor::new(&CART, 1, None);
        let built = d.build_request(vec![
            ("productId".to_string(), "p-1".to_string()),
            ("qty".to_string(), "9".to_string()),
            ("coupon".to_string(), "x=y".to_string()),
        ]);
        assert!(d.is_match(&built.path));
        let bindings = d.bind(&built.path, built.query.as_deref()).unwrap();
        assert_eq!(bindings.get("productId"), Some("p-1"));
        assert_eq!(bindings.get("qty"), Some("9"));
        assert_eq!(bindings.get("coupon"), Some("x=y"));
    }

    proptest! {
        #[test]
        fn literal_case_must_match(name in "[a-z]{1,8}") {
            let d = RouteDescriptor {
                segments: vec![Segment::Literal(name.clone())],
                verb: Verb::Get,
                contract: &CART,
                index: 0,
            };
            let exact = format!("/{name}");
            let upper = format!("/{}", name.to_uppercase());
            prop_assert!(d.is_match(&exact));
            prop_assert!(!d.is_match(&upper));
        }

        #[test]
        fn placeholder_accepts_any_value(value in "[A-Za-z0-9._~-]{1,16}") {
            let d = RouteDescriptor::new(&CART, 3, None);
            let path = format!("/getevents/{value}");
            prop_assert!(d.is_match(&path));
            let bindings = d.bind(&path, None).unwrap();
            prop_assert_eq!(bindings.get("timestamp"), Some(value.as_str()));
        }

        #[test]
        fn segment_count_must_match(extra in 1usize..4) {
            let d = RouteDescriptor::new(&CART, 1, None);
            let mut path = String::from("/addorder/a/b");
            for _ in 0..extra {
                path.push_str("/x");
            }
            prop_assert!(!d.is_match(&path));
        }
    }
}
