//! Named values bound from a request.
//!
//! Placeholder values are pushed before query-string values, and lookups
//! return the first entry whose name matches case-insensitively, so a
//! placeholder always shadows a query key of the same name.

use smallvec::SmallVec;

/// Number of bindings stored inline before spilling to the heap.
const INLINE_BINDINGS: usize = 4;

/// Where a bound value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A placeholder segment of the path.
    Placeholder,
    /// A query-string key.
    Query,
}

/// Values bound from a request path and query string.
///
/// # Example
///
/// ```rust
/// use courier_router::{Bindings, Origin};
///
/// let mut bindings = Bindings::new();
/// bindings.push("productId", "42", Origin::Placeholder);
/// bindings.push("productid", "7", Origin::Query);
///
/// assert_eq!(bindings.get("PRODUCTID"), Some("42"));
/// assert_eq!(bindings.get("qty"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bindings {
    inner: SmallVec<[(String, String, Origin); INLINE_BINDINGS]>,
}

impl Bindings {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>, origin: Origin) {
        self.inner.push((name.into(), value.into(), origin));
    }

    /// Returns the first value bound under `name`, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v, _)| v.as_str())
    }

    /// Returns the origin of the value [`get`](Self::get) would return.
    #[must_use]
    pub fn origin(&self, name: &str) -> Option<Origin> {
        self.inner
            .iter()
            .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, _, o)| *o)
    }

    /// Returns `true` if a value is bound under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of bound values, shadowed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over `(name, value)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v, _)| (n.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_new() {
        let bindings = Bindings::new();
        assert!(bindings.is_empty());
        assert_eq!(bindings.len(), 0);
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let mut bindings = Bindings::new();
        bindings.push("productId", "abc", Origin::Query);
        assert_eq!(bindings.get("productid"), Some("abc"));
        assert_eq!(bindings.get("PRODUCTID"), Some("abc"));
        assert!(bindings.contains("ProductId"));
    }

    #[test]
    fn test_placeholder_shadows_query() {
        let mut bindings = Bindings::new();
        bindings.push("qty", "3", Origin::Placeholder);
        bindings.push("qty", "9", Origin::Query);
        assert_eq!(bindings.get("qty"), Some("3"));
        assert_eq!(bindings.origin("qty"), Some(Origin::Placeholder));
        assert_eq!(bindings.len(), 2);
    }

    #[test]
    fn test_iter_preserves_order() {
        let mut bindings = Bindings::new();
        bindings.push("a", "1", Origin::Placeholder);
        bindings.push("b", "2", Origin::Query);
        let pairs: Vec<_> = bindings.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_many_bindings_spill() {
        let mut bindings = Bindings::new();
        for i in 0..10 {
            bindings.push(format!("key{i}"), format!("value{i}"), Origin::Query);
        }
        assert_eq!(bindings.len(), 10);
        assert_eq!(bindings.get("KEY5"), Some("value5"));
    }
}
