//! Roll-up scope labels for region and year dimensions.

use schemars::{json_schema, JsonSchema, Schema, SchemaGenerator};
use serde::{Serialize, Serializer};
use std::borrow::Cow;

/// Literal used for a collapsed dimension in output tables.
pub const ALL_LABEL: &str = "All";

/// Either a concrete dimension value or the roll-up over all values.
///
/// Concrete values order before `All`, so roll-up rows sort after the
/// rows they summarize.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope<T> {
    Each(T),
    All,
}

impl<T> Scope<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Scope::All)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Scope::Each(v) => Some(v),
            Scope::All => None,
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Scope<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Each(v) => write!(f, "{}", v),
            Scope::All => write!(f, "{}", ALL_LABEL),
        }
    }
}

impl<T: Serialize> Serialize for Scope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scope::Each(v) => v.serialize(serializer),
            Scope::All => serializer.serialize_str(ALL_LABEL),
        }
    }
}

impl<T: JsonSchema> JsonSchema for Scope<T> {
    fn schema_name() -> Cow<'static, str> {
        format!("Scope_{}", T::schema_name()).into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        let inner = generator.subschema_for::<T>();
        json_schema!({
            "anyOf": [inner, { "const": ALL_LABEL }]
        })
    }
}
