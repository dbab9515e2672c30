use crate::{
    model::{FieldType, ModelId},
    query::{Clause, JoinQualifier, Location},
    value::{CastType, Value},
};
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// PlannerError
///
/// Single error surface returned by every planning entry point.
///

#[derive(Debug, ThisError)]
pub enum PlannerError {
    #[error("{0}")]
    Plan(#[from] PlanError),

    #[error("{0}")]
    Cast(#[from] CastError),
}

impl PlannerError {
    #[must_use]
    pub const fn as_plan(&self) -> Option<&PlanError> {
        match self {
            Self::Plan(err) => Some(err),
            Self::Cast(_) => None,
        }
    }

    #[must_use]
    pub const fn as_cast(&self) -> Option<&CastError> {
        match self {
            Self::Cast(err) => Some(err),
            Self::Plan(_) => None,
        }
    }
}

///
/// SourceAction
///
/// What the planner was trying to do with a source that turned out to have
/// no model.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum SourceAction {
    #[display("join on")]
    Join,
    #[display("select")]
    Select,
    #[display("preload")]
    Preload,
}

///
/// PlanError
///
/// Structural or semantic invalidity of a query against its sources and schema.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PlanError {
    #[error("query must have a from expression")]
    MissingFrom,

    #[error("model '{model}' has no source table in the schema")]
    UnknownModel { model: ModelId },

    #[error("cannot {action} source '{table}' at binding {binding} because it has no model")]
    SourceWithoutModel {
        action: SourceAction,
        binding: usize,
        table: String,
    },

    #[error("could not find association '{name}' on model '{model}'")]
    UnknownAssociation { model: ModelId, name: String },

    #[error("binding {binding} in `{clause}` is out of range, query has {sources} source(s)")]
    BindingOutOfRange {
        clause: Clause,
        binding: usize,
        sources: usize,
    },

    #[error("field '{model}.{field}' in `{clause}` does not exist in source at {location}")]
    UnknownField {
        clause: Clause,
        model: ModelId,
        field: String,
        location: Location,
    },

    #[error(
        "field '{model}.{field}' in `{clause}` does not type check: it has type {actual} but {expected} was expected at {location}"
    )]
    TypeMismatch {
        clause: Clause,
        model: ModelId,
        field: String,
        actual: FieldType,
        expected: FieldType,
        location: Location,
    },

    #[error("from binding must be selected when preload is used")]
    FromNotSelected,

    #[error("'{name}' is not an association of model '{model}'")]
    NotAnAssociation { model: ModelId, name: String },

    #[error(
        "association '{model}.{name}' in preload doesn't match join model: expected '{expected}', got {}",
        .found.as_ref().map_or_else(|| "a source without model".to_string(), |m| format!("'{m}'"))
    )]
    AssociationModelMismatch {
        model: ModelId,
        name: String,
        expected: ModelId,
        found: Option<ModelId>,
    },

    #[error("association '{model}.{name}' in preload requires an inner or left join, got {qualifier} join")]
    InvalidPreloadJoin {
        model: ModelId,
        name: String,
        qualifier: JoinQualifier,
    },

    #[error("only filter expressions are allowed in this query")]
    OnlyWhere,
}

///
/// CastError
///
/// A parameter value failed to cast to the type resolved for it.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum CastError {
    #[error(
        "value nil in `{clause}` cannot be cast to type {ty} at {location}: comparison with nil is forbidden as it is unsafe, use an is-null check instead"
    )]
    Nil {
        clause: Clause,
        ty: CastType,
        location: Location,
    },

    #[error(
        "value `{value}` in `{clause}` cannot be cast to type {ty}{} at {location}",
        .field.as_ref().map_or_else(String::new, |f| format!(" (field '{f}')"))
    )]
    Invalid {
        clause: Clause,
        value: Value,
        ty: CastType,
        /// `<model>.<field>` when the type was resolved from a field reference.
        field: Option<String>,
        location: Location,
    },
}

impl CastError {
    /// Attach `<model>.<field>` context to a cast failure.
    #[must_use]
    pub(crate) fn within_field(self, model: &ModelId, field: &str) -> Self {
        match self {
            Self::Invalid {
                clause,
                value,
                ty,
                location,
                ..
            } => Self::Invalid {
                clause,
                value,
                ty,
                field: Some(format!("{model}.{field}")),
                location,
            },
            nil @ Self::Nil { .. } => nil,
        }
    }
}
