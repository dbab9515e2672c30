//! Select normalization: flatten the select expression into the ordered
//! field list the generator projects, with association bindings up front.

use crate::{
    error::{PlanError, SourceAction},
    plan::PlanOptions,
    query::{AssocTree, Clause, Expr, Query, QueryExpr, SelectExpr, Source},
};
use tracing::trace;

pub(crate) fn normalize(query: Query, options: PlanOptions) -> Result<Query, PlanError> {
    if options.only_where {
        return Ok(query);
    }

    let mut query = query;
    let select = query
        .select
        .take()
        .unwrap_or_else(|| SelectExpr::new(QueryExpr::new(Expr::Binding(0))));

    let mut flat = Vec::new();
    let include_from = collect_fields(&select.expr.expr, &query.sources, &mut flat)?;

    let mut fields = Vec::with_capacity(flat.len() + 1);
    let assoc_fields = if query.assocs.is_empty() {
        if include_from {
            fields.push(Expr::Binding(0));
        }
        0
    } else {
        if !include_from {
            return Err(PlanError::FromNotSelected);
        }

        let mut assocs = Vec::new();
        collect_assocs(&query.assocs, &mut assocs);

        fields.push(Expr::Binding(0));
        let count = assocs.len();
        fields.extend(assocs);
        count
    };
    fields.extend(flat);

    trace!(fields = fields.len(), assoc_fields, include_from, "normalized select");

    query.select = Some(SelectExpr {
        expr: select.expr,
        fields,
        include_from,
        assoc_fields,
    });

    Ok(query)
}

// Flatten tuples and lists. A reference to binding 0 is reported through the
// return value instead of being emitted as a field.
fn collect_fields(expr: &Expr, sources: &[Source], out: &mut Vec<Expr>) -> Result<bool, PlanError> {
    match expr {
        Expr::Binding(binding) => {
            require_model(*binding, sources)?;
            if *binding == 0 {
                return Ok(true);
            }
            out.push(Expr::Binding(*binding));
            Ok(false)
        }
        Expr::Tuple(items) | Expr::List(items) => {
            let mut include_from = false;
            for item in items {
                include_from |= collect_fields(item, sources, out)?;
            }
            Ok(include_from)
        }
        other => {
            out.push(other.clone());
            Ok(false)
        }
    }
}

fn require_model(binding: usize, sources: &[Source]) -> Result<(), PlanError> {
    let source = sources.get(binding).ok_or(PlanError::BindingOutOfRange {
        clause: Clause::Select,
        binding,
        sources: sources.len(),
    })?;

    if source.model.is_none() {
        return Err(PlanError::SourceWithoutModel {
            action: SourceAction::Select,
            binding,
            table: source.table.clone(),
        });
    }

    Ok(())
}

// Pre-order: each node, then its children, then its siblings.
fn collect_assocs(tree: &AssocTree, out: &mut Vec<Expr>) {
    for node in tree {
        out.push(Expr::Binding(node.binding));
        collect_assocs(&node.children, out);
    }
}
