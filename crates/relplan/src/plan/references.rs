//! Placeholder renumbering and field reference validation.
//!
//! One depth-first, left-to-right walk per clause expression. Placeholders
//! are shifted past the parameters bound before this expression, and every
//! field access is checked against the declared fields of its source.

use crate::{
    error::PlanError,
    model::Reflection,
    plan::traverse_exprs,
    query::{Clause, Expr, FieldAccess, Location, Query, QueryExpr, Source},
};
use tracing::trace;

pub(crate) fn validate(
    reflection: &dyn Reflection,
    query: Query,
    counter: usize,
) -> Result<(Query, usize), PlanError> {
    traverse_exprs(query, counter, |clause, expr, sources, counter| {
        validate_expr(reflection, clause, expr, sources, counter)
    })
}

fn validate_expr(
    reflection: &dyn Reflection,
    clause: Clause,
    expr: QueryExpr,
    sources: &[Source],
    counter: usize,
) -> Result<(QueryExpr, usize), PlanError> {
    let QueryExpr {
        expr,
        params,
        location,
    } = expr;

    let walker = Walker {
        reflection,
        clause,
        sources,
        location: &location,
        base: counter,
    };
    let (expr, next) = walker.prewalk(expr, counter)?;

    trace!(%clause, placeholders = next - counter, "validated expression");

    let expr = QueryExpr {
        expr,
        params,
        location,
    };

    Ok((expr, next))
}

///
/// Walker
///
/// Per-expression rewrite context. `base` is the counter value when the
/// expression was entered; local placeholder `k` becomes `base + k`.
///

struct Walker<'a> {
    reflection: &'a dyn Reflection,
    clause: Clause,
    sources: &'a [Source],
    location: &'a Location,
    base: usize,
}

impl Walker<'_> {
    fn prewalk(&self, expr: Expr, counter: usize) -> Result<(Expr, usize), PlanError> {
        match expr {
            Expr::Param(key) => Ok((Expr::Param(self.base + key), counter + 1)),
            Expr::Field(access) => {
                self.check_field(&access)?;
                Ok((Expr::Field(access), counter))
            }
            Expr::Binding(binding) => {
                self.source(binding)?;
                Ok((Expr::Binding(binding), counter))
            }
            Expr::Literal(value) => Ok((Expr::Literal(value), counter)),
            Expr::Apply { op, args } => {
                let (args, counter) = self.prewalk_all(args, counter)?;
                Ok((Expr::Apply { op, args }, counter))
            }
            Expr::Tuple(items) => {
                let (items, counter) = self.prewalk_all(items, counter)?;
                Ok((Expr::Tuple(items), counter))
            }
            Expr::List(items) => {
                let (items, counter) = self.prewalk_all(items, counter)?;
                Ok((Expr::List(items), counter))
            }
        }
    }

    fn prewalk_all(
        &self,
        exprs: Vec<Expr>,
        mut counter: usize,
    ) -> Result<(Vec<Expr>, usize), PlanError> {
        let mut out = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let (expr, next) = self.prewalk(expr, counter)?;
            counter = next;
            out.push(expr);
        }

        Ok((out, counter))
    }

    fn source(&self, binding: usize) -> Result<&Source, PlanError> {
        self.sources
            .get(binding)
            .ok_or(PlanError::BindingOutOfRange {
                clause: self.clause,
                binding,
                sources: self.sources.len(),
            })
    }

    // Sources without a model accept any field.
    fn check_field(&self, access: &FieldAccess) -> Result<(), PlanError> {
        let source = self.source(access.binding)?;
        let Some(model) = &source.model else {
            return Ok(());
        };

        let actual = self
            .reflection
            .field_type(model, &access.name)
            .ok_or_else(|| PlanError::UnknownField {
                clause: self.clause,
                model: model.clone(),
                field: access.name.clone(),
                location: self.location.clone(),
            })?;

        if let Some(expected) = &access.expected
            && !actual.matches(expected)
        {
            return Err(PlanError::TypeMismatch {
                clause: self.clause,
                model: model.clone(),
                field: access.name.clone(),
                actual: actual.clone(),
                expected: expected.clone(),
                location: self.location.clone(),
            });
        }

        Ok(())
    }
}
