//! Planning stage of a relational query compiler.
//!
//! Takes a `Query` tree produced by a query-building layer and, in two
//! passes, turns it into a validated, parameter-normalized form ready for a
//! SQL generator:
//!
//! - `prepare` resolves sources and extracts every literal parameter into one
//!   ordered list, leaving a structure that can be cached independently of
//!   parameter values
//! - `normalize` renumbers placeholders, validates field references against
//!   schema reflection, expands the select clause and validates preloads
#![warn(unreachable_pub)]

pub mod error;
pub mod model;
pub mod plan;
pub mod query;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Domain vocabulary needed to build and plan a query.
///

pub mod prelude {
    pub use crate::{
        error::{CastError, PlanError, PlannerError},
        model::{Association, FieldType, ModelDef, ModelId, Reflection, Schema},
        plan::{CacheKey, PlanOptions, Planner, Prepared},
        query::{
            AssocTree, Expr, JoinQualifier, Location, ParamType, Query, QueryBuilder, QueryExpr,
            SourceRef,
        },
        value::{Caster, DefaultCaster, Value},
    };
}
