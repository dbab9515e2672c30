//! Schema reflection surface consumed by the planner.
//!
//! The planner never introspects models at runtime. Everything it knows about
//! a model arrives through the [`Reflection`] capability supplied by the caller.

pub mod schema;

#[cfg(test)]
mod tests;

use crate::query::JoinQualifier;
use derive_more::{Display, From};
use std::fmt;

// re-exports
pub use schema::{ModelDef, Schema, SchemaError};

///
/// ModelId
///
/// Stable identifier of a model known to the schema reflection layer.
///

#[derive(Clone, Debug, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
pub struct ModelId(String);

impl ModelId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

///
/// FieldType
///
/// Declared type of a model field, as reported by reflection.
/// `Any` stands for "unknown / untyped" and is what schemaless sources yield.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum FieldType {
    Any,
    Array(Box<Self>),
    Binary,
    Boolean,
    Date,
    Decimal,
    Float,
    Id,
    Integer,
    String,
    Timestamp,
}

impl FieldType {
    #[must_use]
    pub fn array(inner: Self) -> Self {
        Self::Array(Box::new(inner))
    }

    /// Assignment compatibility between a declared type and an expected one.
    ///
    /// Structural equality, with two relaxations: `Any` on either side matches,
    /// and `Id` and `Integer` are interchangeable. There is no numeric widening.
    #[must_use]
    pub fn matches(&self, expected: &Self) -> bool {
        match (self, expected) {
            (Self::Any, _) | (_, Self::Any) => true,
            (Self::Id | Self::Integer, Self::Id | Self::Integer) => true,
            (Self::Array(left), Self::Array(right)) => left.matches(right),
            _ => self == expected,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Array(inner) => write!(f, "array({inner})"),
            Self::Binary => f.write_str("binary"),
            Self::Boolean => f.write_str("boolean"),
            Self::Date => f.write_str("date"),
            Self::Decimal => f.write_str("decimal"),
            Self::Float => f.write_str("float"),
            Self::Id => f.write_str("id"),
            Self::Integer => f.write_str("integer"),
            Self::String => f.write_str("string"),
            Self::Timestamp => f.write_str("timestamp"),
        }
    }
}

///
/// Association
///
/// Reflection metadata for one association declared on a model.
/// Joining through it produces `related.assoc_key == owner.owner_key`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Association {
    pub related: ModelId,
    pub owner_key: String,
    pub assoc_key: String,
    /// Join kind the association prefers when the generator materializes it.
    pub qualifier_hint: JoinQualifier,
}

impl Association {
    #[must_use]
    pub fn new(
        related: impl Into<ModelId>,
        owner_key: impl Into<String>,
        assoc_key: impl Into<String>,
    ) -> Self {
        Self {
            related: related.into(),
            owner_key: owner_key.into(),
            assoc_key: assoc_key.into(),
            qualifier_hint: JoinQualifier::Inner,
        }
    }

    #[must_use]
    pub const fn with_qualifier_hint(mut self, qualifier: JoinQualifier) -> Self {
        self.qualifier_hint = qualifier;
        self
    }
}

///
/// Reflection
///
/// Schema lookup capability injected into the planner.
/// Implementations must be cheap and non-blocking; the planner calls them
/// once per field reference and per association.
///

pub trait Reflection {
    /// Default table backing `model`, or `None` if the model is unknown.
    fn source(&self, model: &ModelId) -> Option<&str>;

    /// Declared type of `field` on `model`.
    fn field_type(&self, model: &ModelId, field: &str) -> Option<&FieldType>;

    /// Association named `name` on `model`.
    fn association(&self, model: &ModelId, name: &str) -> Option<&Association>;
}
