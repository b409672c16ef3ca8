//! Conversion of parameter values to and from route text.
//!
//! Every non-body contract parameter implements [`RouteArg`]. Primitive
//! types write one `(name, text)` pair and read the value bound under their
//! own name; structured types (see `#[derive(RouteArg)]`) write and read one
//! pair per field, keyed by the field's wire name.
//!
//! A primitive with no bound value is parsed from the empty string, which
//! fails for everything except `String` and `Option<T>`.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use courier_core::CourierError;
use thiserror::Error;
use uuid::Uuid;

use crate::bindings::Bindings;

/// Format used to write and read [`NaiveDateTime`] values.
const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A value could not be bound to a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The bound text did not parse as the declared type.
    #[error("cannot convert {value:?} for parameter '{name}' to {type_name}: {reason}")]
    Parse {
        /// Wire name of the parameter or field.
        name: String,
        /// The text that was bound (empty when nothing was bound).
        value: String,
        /// The declared type.
        type_name: &'static str,
        /// The parser's message.
        reason: String,
    },

    /// A custom conversion rejected the value.
    #[error("invalid value for parameter '{name}': {reason}")]
    Invalid {
        /// Wire name of the parameter or field.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl BindingError {
    /// Creates a parse error.
    pub fn parse<T>(name: &str, value: &str, reason: impl fmt::Display) -> Self {
        Self::Parse {
            name: name.to_string(),
            value: value.to_string(),
            type_name: std::any::type_name::<T>(),
            reason: reason.to_string(),
        }
    }

    /// Returns the wire name of the offending parameter.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Parse { name, .. } | Self::Invalid { name, .. } => name,
        }
    }
}

impl From<BindingError> for CourierError {
    fn from(err: BindingError) -> Self {
        CourierError::binding_for(err.name().to_string(), err.to_string())
    }
}

/// A value carried in placeholders or the query string.
pub trait RouteArg: Sized {
    /// Appends this value's `(name, text)` pairs.
    fn write_route(&self, name: &str, out: &mut Vec<(String, String)>);

    /// Reads a value from the bindings.
    fn read_route(name: &str, bindings: &Bindings) -> Result<Self, BindingError>;
}

fn bound<'a>(name: &str, bindings: &'a Bindings) -> &'a str {
    bindings.get(name).unwrap_or_default()
}

macro_rules! route_arg_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RouteArg for $ty {
                fn write_route(&self, name: &str, out: &mut Vec<(String, String)>) {
                    out.push((name.to_string(), self.to_string()));
                }

                fn read_route(name: &str, bindings: &Bindings) -> Result<Self, BindingError> {
                    let text = bound(name, bindings);
                    text.trim()
                        .parse::<$ty>()
                        .map_err(|e| BindingError::parse::<$ty>(name, text, e))
                }
            }
        )*
    };
}

route_arg_from_str!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, Uuid,
    NaiveDate,
);

impl RouteArg for String {
    fn write_route(&self, name: &str, out: &mut Vec<(String, String)>) {
        out.push((name.to_string(), self.clone()));
    }

    fn read_route(name: &str, bindings: &Bindings) -> Result<Self, BindingError> {
        Ok(bound(name, bindings).to_string())
    }
}

impl RouteArg for bool {
    fn write_route(&self, name: &str, out: &mut Vec<(String, String)>) {
        out.push((name.to_string(), self.to_string()));
    }

    fn read_route(name: &str, bindings: &Bindings) -> Result<Self, BindingError> {
        let text = bound(name, bindings);
        text.trim()
            .to_ascii_lowercase()
            .parse::<bool>()
            .map_err(|e| BindingError::parse::<bool>(name, text, e))
    }
}

impl RouteArg for DateTime<Utc> {
    fn write_route(&self, name: &str, out: &mut Vec<(String, String)>) {
        out.push((name.to_string(), self.to_rfc3339()));
    }

    fn read_route(name: &str, bindings: &Bindings) -> Result<Self, BindingError> {
        let text = bound(name, bindings);
        DateTime::parse_from_rfc3339(text.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| BindingError::parse::<Self>(name, text, e))
    }
}

impl RouteArg for NaiveDateTime {
    fn write_route(&self, name: &str, out: &mut Vec<(String, String)>) {
        out.push((
            name.to_string(),
            self.format(NAIVE_DATETIME_FORMAT).to_string(),
        ));
    }

    fn read_route(name: &str, bindings: &Bindings) -> Result<Self, BindingError> {
        let text = bound(name, bindings);
        NaiveDateTime::parse_from_str(text.trim(), NAIVE_DATETIME_FORMAT)
            .map_err(|e| BindingError::parse::<Self>(name, text, e))
    }
}

impl<T: RouteArg> RouteArg for Option<T> {
    fn write_route(&self, name: &str, out: &mut Vec<(String, String)>) {
        if let Some(value) = self {
            value.write_route(name, out);
        }
    }

    fn read_route(name: &str, bindings: &Bindings) -> Result<Self, BindingError> {
        match bindings.get(name) {
            None | Some("") => Ok(None),
            Some(_) => T::read_route(name, bindings).map(Some),
        }
    }
}
