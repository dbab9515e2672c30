//! Source resolution: turn `from` and every join into a concrete
//! `(table, model)` source, replacing association joins with an explicit
//! key equality.

use crate::{
    error::{PlanError, SourceAction},
    model::Reflection,
    query::{Clause, Expr, JoinExpr, JoinSource, Query, QueryExpr, Source, SourceRef},
    value::Value,
};
use tracing::trace;

/// Resolve `query.sources`. Index 0 is the from source, index `k` the k-th join.
pub(crate) fn resolve(reflection: &dyn Reflection, mut query: Query) -> Result<Query, PlanError> {
    let Some(from) = &query.from else {
        return Err(PlanError::MissingFrom);
    };

    let from = resolve_ref(reflection, from)?;
    let joins = std::mem::take(&mut query.joins);

    // Joins resolve left to right; each may only reference bindings before it.
    let mut sources = Vec::with_capacity(joins.len() + 1);
    sources.push(from);
    let mut resolved_joins = Vec::with_capacity(joins.len());

    for join in joins {
        let (join, source) = resolve_join(reflection, join, &sources)?;
        trace!(binding = sources.len(), table = %source.table, "resolved join source");
        sources.push(source);
        resolved_joins.push(join);
    }

    Ok(Query {
        joins: resolved_joins,
        sources,
        ..query
    })
}

fn resolve_ref(reflection: &dyn Reflection, source: &SourceRef) -> Result<Source, PlanError> {
    match source {
        SourceRef::Table(table) => Ok(Source::new(table.clone(), None)),
        SourceRef::Model(model) => {
            let table = reflection
                .source(model)
                .ok_or_else(|| PlanError::UnknownModel {
                    model: model.clone(),
                })?;

            Ok(Source::new(table, Some(model.clone())))
        }
        SourceRef::TableModel { table, model } => {
            Ok(Source::new(table.clone(), Some(model.clone())))
        }
    }
}

fn resolve_join(
    reflection: &dyn Reflection,
    join: JoinExpr,
    resolved: &[Source],
) -> Result<(JoinExpr, Source), PlanError> {
    let JoinExpr {
        qualifier,
        source,
        on,
    } = join;

    match source {
        JoinSource::Explicit(source_ref) => {
            let source = resolve_ref(reflection, &source_ref)?;
            let join = JoinExpr::new(qualifier, JoinSource::Explicit(source_ref), on);

            Ok((join, source))
        }
        JoinSource::Assoc { binding, name } => {
            let count = resolved.len();
            let Some(owner) = resolved.get(binding) else {
                return Err(PlanError::BindingOutOfRange {
                    clause: Clause::Join,
                    binding,
                    sources: count,
                });
            };

            let Some(model) = &owner.model else {
                return Err(PlanError::SourceWithoutModel {
                    action: SourceAction::Join,
                    binding,
                    table: owner.table.clone(),
                });
            };

            let assoc = reflection.association(model, &name).ok_or_else(|| {
                PlanError::UnknownAssociation {
                    model: model.clone(),
                    name: name.clone(),
                }
            })?;

            let table =
                reflection
                    .source(&assoc.related)
                    .ok_or_else(|| PlanError::UnknownModel {
                        model: assoc.related.clone(),
                    })?;

            let keys = Expr::eq(
                Expr::field(count, assoc.assoc_key.clone()),
                Expr::field(binding, assoc.owner_key.clone()),
            );
            let on = combine_on(keys, on);
            let source = Source::new(table, Some(assoc.related.clone()));
            let join = JoinExpr::new(
                qualifier,
                JoinSource::Explicit(SourceRef::TableModel {
                    table: source.table.clone(),
                    model: assoc.related.clone(),
                }),
                on,
            );

            Ok((join, source))
        }
    }
}

// A literal `true` on-condition is replaced by the key equality; anything
// else is AND-ed onto it and keeps its parameters.
fn combine_on(keys: Expr, on: QueryExpr) -> QueryExpr {
    let QueryExpr {
        expr,
        params,
        location,
    } = on;

    let expr = match expr {
        Expr::Literal(Value::Bool(true)) => keys,
        other => Expr::and(keys, other),
    };

    QueryExpr {
        expr,
        params,
        location,
    }
}
