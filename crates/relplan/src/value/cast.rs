//! Literal casting against resolved field types.
//!
//! The planner only depends on the [`Caster`] contract: `cast(type, value)`
//! either yields the cast value or fails. Composite `In` types are unwrapped
//! here so casters only ever see plain field types.

use crate::{model::FieldType, value::Value};
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error as ThisError;
use time::{
    Date, OffsetDateTime,
    format_description::well_known::{Iso8601, Rfc3339},
};

///
/// CastFailure
///
/// Opaque cast rejection. Callers attach the value and type themselves.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
#[error("value cannot be cast to the requested type")]
pub struct CastFailure;

///
/// CastType
///
/// Type a parameter is cast against once its descriptor has been resolved.
/// `In` wraps the element type of a membership list.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CastType {
    Of(FieldType),
    In(Box<Self>),
}

impl CastType {
    #[must_use]
    pub fn in_(inner: Self) -> Self {
        Self::In(Box::new(inner))
    }

    /// Innermost field type, with every `In` wrapper removed.
    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        match self {
            Self::Of(ty) => ty,
            Self::In(inner) => inner.field_type(),
        }
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Of(ty) => write!(f, "{ty}"),
            Self::In(inner) => write!(f, "in({inner})"),
        }
    }
}

///
/// Caster
///
/// External cast contract. Implementations must be pure.
///

pub trait Caster {
    fn cast(&self, ty: &FieldType, value: Value) -> Result<Value, CastFailure>;
}

/// Cast `value` against a possibly composite type.
///
/// `In` requires a list value and casts every element against the inner type.
pub fn cast_param(
    caster: &dyn Caster,
    ty: &CastType,
    value: Value,
) -> Result<Value, CastFailure> {
    match ty {
        CastType::Of(field_type) => caster.cast(field_type, value),
        CastType::In(inner) => match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| cast_param(caster, inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            _ => Err(CastFailure),
        },
    }
}

///
/// DefaultCaster
///
/// Built-in casting rules: values already of the right shape pass through,
/// text is parsed into scalars where the reading is unambiguous, and integers
/// widen into float and decimal.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCaster;

impl Caster for DefaultCaster {
    fn cast(&self, ty: &FieldType, value: Value) -> Result<Value, CastFailure> {
        match (ty, value) {
            (FieldType::Any, value) => Ok(value),

            (FieldType::Id | FieldType::Integer, Value::Int(v)) => Ok(Value::Int(v)),
            (FieldType::Id | FieldType::Integer, Value::Text(text)) => {
                text.trim().parse().map(Value::Int).map_err(|_| CastFailure)
            }

            (FieldType::Float, Value::Float(v)) => Ok(Value::Float(v)),
            (FieldType::Float, Value::Int(v)) => Ok(Value::Float(int_to_float(v))),
            (FieldType::Float, Value::Text(text)) => {
                text.trim().parse().map(Value::Float).map_err(|_| CastFailure)
            }

            (FieldType::Decimal, Value::Decimal(v)) => Ok(Value::Decimal(v)),
            (FieldType::Decimal, Value::Int(v)) => Ok(Value::Decimal(Decimal::from(v))),
            (FieldType::Decimal, Value::Float(v)) => Decimal::from_f64_retain(v)
                .map(Value::Decimal)
                .ok_or(CastFailure),
            (FieldType::Decimal, Value::Text(text)) => text
                .trim()
                .parse::<Decimal>()
                .map(Value::Decimal)
                .map_err(|_| CastFailure),

            (FieldType::Boolean, Value::Bool(v)) => Ok(Value::Bool(v)),
            (FieldType::Boolean, Value::Text(text)) => match text.as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(CastFailure),
            },

            (FieldType::String, Value::Text(text)) => Ok(Value::Text(text)),

            (FieldType::Binary, Value::Blob(bytes)) => Ok(Value::Blob(bytes)),
            (FieldType::Binary, Value::Text(text)) => Ok(Value::Blob(text.into_bytes())),

            (FieldType::Date, Value::Date(v)) => Ok(Value::Date(v)),
            (FieldType::Date, Value::Text(text)) => Date::parse(&text, &Iso8601::DATE)
                .map(Value::Date)
                .map_err(|_| CastFailure),

            (FieldType::Timestamp, Value::Timestamp(v)) => Ok(Value::Timestamp(v)),
            (FieldType::Timestamp, Value::Text(text)) => OffsetDateTime::parse(&text, &Rfc3339)
                .map(Value::Timestamp)
                .map_err(|_| CastFailure),

            (FieldType::Array(inner), Value::List(items)) => items
                .into_iter()
                .map(|item| self.cast(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),

            _ => Err(CastFailure),
        }
    }
}

#[expect(clippy::cast_precision_loss)]
const fn int_to_float(v: i64) -> f64 {
    v as f64
}
