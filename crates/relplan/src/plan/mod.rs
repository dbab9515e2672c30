//! Two-phase query planning.
//!
//! `prepare` resolves sources and merges every literal parameter into one
//! ordered list; its output is what the cache layer keys on. `normalize`
//! runs only on a cache miss: it renumbers placeholders, validates field
//! references, expands the select clause and checks preload joins.
//!
//! Both phases are pure functions of their inputs. The only state threaded
//! through is an explicit accumulator (the parameter list or the placeholder
//! counter).

mod assocs;
mod fingerprint;
mod guard;
mod params;
mod references;
mod select;
mod sources;

#[cfg(test)]
mod tests;

use crate::{
    error::PlannerError,
    model::Reflection,
    query::{Clause, Expr, Query, QueryExpr, Source},
    value::{Caster, DefaultCaster, Value},
};
use serde::Deserialize;
use tracing::{debug, instrument};

// re-exports
pub use fingerprint::CacheKey;

///
/// PlanOptions
///
/// Per-call planner configuration.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct PlanOptions {
    /// Plan the query as an embedded boolean condition: only `where` clauses
    /// may be populated and the select clause is left untouched.
    pub only_where: bool,
}

impl PlanOptions {
    #[must_use]
    pub const fn only_where() -> Self {
        Self { only_where: true }
    }
}

///
/// Prepared
///
/// Output of the prepare phase: the cache-key-producing structure and the
/// merged parameters keyed from the base count upwards.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Prepared {
    pub query: Query,
    pub params: Vec<(usize, Value)>,
    pub cache_key: CacheKey,
}

impl Prepared {
    /// Parameter values in key order.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.params.iter().map(|(_, value)| value.clone()).collect()
    }
}

///
/// Planner
///
/// Entry point bundling the injected reflection and cast capabilities.
///

#[derive(Clone, Copy)]
pub struct Planner<'a> {
    reflection: &'a dyn Reflection,
    caster: &'a dyn Caster,
}

impl<'a> Planner<'a> {
    #[must_use]
    pub fn new(reflection: &'a dyn Reflection) -> Self {
        Self {
            reflection,
            caster: &DefaultCaster,
        }
    }

    #[must_use]
    pub fn with_caster(mut self, caster: &'a dyn Caster) -> Self {
        self.caster = caster;
        self
    }

    /// Resolve sources and merge parameters.
    ///
    /// Parameter keys start at `base`, the number of parameters already bound
    /// by an enclosing context.
    #[instrument(level = "debug", skip_all, fields(base = base))]
    pub fn prepare(&self, query: Query, base: usize) -> Result<Prepared, PlannerError> {
        let query = sources::resolve(self.reflection, query)?;
        let (query, params) = params::merge(self.reflection, self.caster, query, base)?;
        let cache_key = CacheKey::of(&query);

        debug!(
            sources = query.sources.len(),
            params = params.len(),
            cache_key = %cache_key,
            "prepared query"
        );

        Ok(Prepared {
            query,
            params,
            cache_key,
        })
    }

    /// Validate and normalize a prepared query.
    ///
    /// Returns the normalized query and the placeholder counter after
    /// renumbering, which starts at `counter`.
    #[instrument(level = "debug", skip_all, fields(counter = counter, only_where = options.only_where))]
    pub fn normalize(
        &self,
        query: Query,
        counter: usize,
        options: PlanOptions,
    ) -> Result<(Query, usize), PlannerError> {
        let query = guard::check(query, options)?;
        let (query, counter) = references::validate(self.reflection, query, counter)?;
        let query = select::normalize(query, options)?;
        let query = assocs::validate(self.reflection, query)?;

        debug!(counter, "normalized query");

        Ok((query, counter))
    }

    /// Prepare and normalize in one call.
    ///
    /// `base_params` are values already bound by an enclosing context; the
    /// returned list starts with them, followed by this query's parameters.
    #[instrument(level = "debug", skip_all, fields(base = base_params.len()))]
    pub fn plan(
        &self,
        query: Query,
        base_params: Vec<Value>,
        options: PlanOptions,
    ) -> Result<(Query, Vec<Value>), PlannerError> {
        let base = base_params.len();
        let prepared = self.prepare(query, base)?;
        let (query, _) = self.normalize(prepared.query, base, options)?;

        let mut params = base_params;
        params.extend(prepared.params.into_iter().map(|(_, value)| value));

        Ok((query, params))
    }
}

/// Visit every clause expression in traversal order, threading `acc`.
///
/// The visitor receives the resolved sources alongside each expression and
/// returns the rewritten expression with the next accumulator value.
pub(crate) fn traverse_exprs<A, E, F>(
    mut query: Query,
    mut acc: A,
    mut visit: F,
) -> Result<(Query, A), E>
where
    F: FnMut(Clause, QueryExpr, &[Source], A) -> Result<(QueryExpr, A), E>,
{
    let sources = std::mem::take(&mut query.sources);

    for clause in Clause::TRAVERSAL_ORDER {
        for slot in query.clause_exprs_mut(clause) {
            let expr = std::mem::replace(slot, QueryExpr::new(Expr::Tuple(Vec::new())));
            let (expr, next) = visit(clause, expr, &sources, acc)?;
            *slot = expr;
            acc = next;
        }
    }

    query.sources = sources;

    Ok((query, acc))
}
