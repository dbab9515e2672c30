//! Parameter merging: cast every clause-local parameter against its resolved
//! type and move it into one ordered list.
//!
//! Keys are assigned in clause traversal order starting at the base count.
//! Once merged, a clause keeps no parameters of its own.

use crate::{
    error::{CastError, PlanError, PlannerError},
    model::{FieldType, ModelId, Reflection},
    plan::traverse_exprs,
    query::{Clause, Location, Param, ParamType, Query, QueryExpr, Source},
    value::{CastType, Caster, Value, cast::cast_param},
};
use tracing::trace;

pub(crate) fn merge(
    reflection: &dyn Reflection,
    caster: &dyn Caster,
    query: Query,
    base: usize,
) -> Result<(Query, Vec<(usize, Value)>), PlannerError> {
    traverse_exprs(query, Vec::new(), |clause, expr, sources, merged| {
        merge_expr(reflection, caster, base, clause, expr, sources, merged)
    })
}

fn merge_expr(
    reflection: &dyn Reflection,
    caster: &dyn Caster,
    base: usize,
    clause: Clause,
    expr: QueryExpr,
    sources: &[Source],
    mut merged: Vec<(usize, Value)>,
) -> Result<(QueryExpr, Vec<(usize, Value)>), PlannerError> {
    let QueryExpr {
        expr,
        params: mut local,
        location,
    } = expr;

    local.sort_by_key(|(key, _)| *key);

    for (_, Param { value, ty }) in local {
        let (ty, field) = resolve_type(reflection, clause, sources, &location, &ty)?;
        let value = cast(caster, clause, &location, value, &ty, field.as_ref())?;
        let key = base + merged.len();

        trace!(key, %clause, ty = %ty, "merged parameter");
        merged.push((key, value));
    }

    let expr = QueryExpr {
        expr,
        params: Vec::new(),
        location,
    };

    Ok((expr, merged))
}

// The `(model, field)` pair is returned when the type came from reflection,
// so cast failures can name the field.
fn resolve_type(
    reflection: &dyn Reflection,
    clause: Clause,
    sources: &[Source],
    location: &Location,
    ty: &ParamType,
) -> Result<(CastType, Option<(ModelId, String)>), PlanError> {
    match ty {
        ParamType::Type(ty) => Ok((CastType::Of(ty.clone()), None)),
        ParamType::Field { binding, field } => {
            let source = sources
                .get(*binding)
                .ok_or(PlanError::BindingOutOfRange {
                    clause,
                    binding: *binding,
                    sources: sources.len(),
                })?;

            let Some(model) = &source.model else {
                return Ok((CastType::Of(FieldType::Any), None));
            };

            let ty = reflection
                .field_type(model, field)
                .ok_or_else(|| PlanError::UnknownField {
                    clause,
                    model: model.clone(),
                    field: field.clone(),
                    location: location.clone(),
                })?;

            Ok((CastType::Of(ty.clone()), Some((model.clone(), field.clone()))))
        }
        ParamType::In(inner) => {
            let (inner, field) = resolve_type(reflection, clause, sources, location, inner)?;

            Ok((CastType::in_(inner), field))
        }
    }
}

fn cast(
    caster: &dyn Caster,
    clause: Clause,
    location: &Location,
    value: Value,
    ty: &CastType,
    field: Option<&(ModelId, String)>,
) -> Result<Value, CastError> {
    if value.is_null() {
        return Err(CastError::Nil {
            clause,
            ty: ty.clone(),
            location: location.clone(),
        });
    }

    cast_param(caster, ty, value.clone()).map_err(|_| {
        let err = CastError::Invalid {
            clause,
            value,
            ty: ty.clone(),
            field: None,
            location: location.clone(),
        };

        match field {
            Some((model, field)) => err.within_field(model, field),
            None => err,
        }
    })
}
