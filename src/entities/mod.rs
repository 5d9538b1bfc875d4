//! MemberPress entity wrappers
//!
//! Typed, read-only views over the JSON objects MemberPress sends for
//! members, memberships, subscriptions and transactions. Every accessor
//! coerces defensively (see [`fields`]); a wrapper built from a malformed or
//! empty object simply answers `None`, `0` or `false`.

use serde_json::{Map, Value};
use tracing::debug;

use crate::schema::{EntityKind, Schema};

/// Shared behavior of the four entity wrappers
pub trait Entity {
    /// Which entity this wrapper represents
    const KIND: EntityKind;

    /// Wrap an already-extracted object
    fn from_map(fields: Map<String, Value>) -> Self;

    /// The underlying object
    fn fields(&self) -> &Map<String, Value>;

    /// Wrap any JSON value; anything but an object yields an empty wrapper
    fn from_value(value: &Value) -> Self
    where
        Self: Sized,
    {
        match value {
            Value::Object(map) => Self::from_map(map.clone()),
            other => {
                debug!(
                    entity = %Self::KIND,
                    received = json_type_name(other),
                    "Expected an object, wrapping an empty one"
                );
                Self::from_map(Map::new())
            }
        }
    }

    /// True when every documented field is present
    fn is_complete(&self) -> bool {
        Schema::from_keys(Self::KIND.complete_keys().iter().copied()).is_satisfied_by(self.fields())
    }

    /// True when every business-rule field is present
    fn is_minimum(&self) -> bool {
        Schema::from_keys(Self::KIND.minimum_keys().iter().copied()).is_satisfied_by(self.fields())
    }

    /// Documented fields absent from the object
    fn missing_keys(&self) -> Vec<&'static str> {
        Schema::from_keys(Self::KIND.complete_keys().iter().copied()).missing_from(self.fields())
    }

    /// Raw access to any field
    fn raw(&self, key: &str) -> Option<&Value> {
        self.fields().get(key)
    }
}

/// Human-readable JSON type, used in diagnostics
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// Defined ahead of the wrapper modules so they are in textual scope there.

/// Declares the boilerplate every wrapper shares: the struct, its
/// constructor and the [`Entity`] impl.
macro_rules! entity_wrapper {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            fields: serde_json::Map<String, serde_json::Value>,
        }

        impl $name {
            /// Wrap an object
            pub fn new(fields: serde_json::Map<String, serde_json::Value>) -> Self {
                Self { fields }
            }
        }

        impl $crate::entities::Entity for $name {
            const KIND: $crate::schema::EntityKind = $kind;

            fn from_map(fields: serde_json::Map<String, serde_json::Value>) -> Self {
                Self::new(fields)
            }

            fn fields(&self) -> &serde_json::Map<String, serde_json::Value> {
                &self.fields
            }
        }
    };
}

/// Generates one accessor per field, grouped by coercion policy.
macro_rules! field_accessors {
    (strings: $($field:ident),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($field), "` as a string")]
            pub fn $field(&self) -> Option<&str> {
                $crate::entities::fields::string(&self.fields, stringify!($field))
            }
        )*
    };
    (ids: $($field:ident),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($field), "` identifier, `None` when unreadable")]
            pub fn $field(&self) -> Option<i64> {
                $crate::entities::fields::integer(&self.fields, stringify!($field))
            }
        )*
    };
    (counts: $($field:ident),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($field), "`, `0` when unreadable")]
            pub fn $field(&self) -> i64 {
                $crate::entities::fields::count(&self.fields, stringify!($field))
            }
        )*
    };
    (amounts: $($field:ident),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($field), "` as a decimal amount")]
            pub fn $field(&self) -> Option<f64> {
                $crate::entities::fields::amount(&self.fields, stringify!($field))
            }
        )*
    };
    (flags: $($field:ident),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($field), "` flag")]
            pub fn $field(&self) -> bool {
                $crate::entities::fields::flag(&self.fields, stringify!($field))
            }
        )*
    };
    (datetimes: $($field:ident),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($field), "` timestamp")]
            pub fn $field(&self) -> Option<chrono::NaiveDateTime> {
                $crate::entities::fields::datetime(&self.fields, stringify!($field))
            }
        )*
    };
    (raw: $($field:ident),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($field), "` as sent, whatever its shape")]
            pub fn $field(&self) -> Option<&serde_json::Value> {
                self.fields.get(stringify!($field))
            }
        )*
    };
}

pub mod fields;
mod member;
mod membership;
mod subscription;
mod transaction;

pub use member::Member;
pub use membership::Membership;
pub use subscription::Subscription;
pub use transaction::Transaction;
