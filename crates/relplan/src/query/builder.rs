use crate::{
    model::ModelId,
    query::{
        AssocTree, Expr, JoinExpr, JoinQualifier, JoinSource, Lock, Query, QueryExpr, SelectExpr,
        SourceRef,
    },
};

///
/// QueryBuilder
///
/// Fluent construction of unplanned `Query` values.
/// Applies no validation; that is the planner's job.
///

#[derive(Clone, Debug, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_source(source: SourceRef) -> Self {
        Self {
            query: Query {
                from: Some(source),
                ..Query::default()
            },
        }
    }

    #[must_use]
    pub fn from_model(model: impl Into<ModelId>) -> Self {
        Self::from_source(SourceRef::Model(model.into()))
    }

    #[must_use]
    pub fn from_table(table: impl Into<String>) -> Self {
        Self::from_source(SourceRef::Table(table.into()))
    }

    #[must_use]
    pub fn join(
        mut self,
        qualifier: JoinQualifier,
        source: SourceRef,
        on: impl Into<QueryExpr>,
    ) -> Self {
        self.query.joins.push(JoinExpr::new(
            qualifier,
            JoinSource::Explicit(source),
            on.into(),
        ));
        self
    }

    /// Join through association `name` of the source bound at `binding`.
    #[must_use]
    pub fn join_assoc(
        self,
        qualifier: JoinQualifier,
        binding: usize,
        name: impl Into<String>,
    ) -> Self {
        self.join_assoc_on(qualifier, binding, name, Expr::literal(true))
    }

    /// Association join with an additional condition AND-ed to the key equality.
    #[must_use]
    pub fn join_assoc_on(
        mut self,
        qualifier: JoinQualifier,
        binding: usize,
        name: impl Into<String>,
        on: impl Into<QueryExpr>,
    ) -> Self {
        self.query.joins.push(JoinExpr::new(
            qualifier,
            JoinSource::Assoc {
                binding,
                name: name.into(),
            },
            on.into(),
        ));
        self
    }

    #[must_use]
    pub fn filter(mut self, expr: impl Into<QueryExpr>) -> Self {
        self.query.wheres.push(expr.into());
        self
    }

    #[must_use]
    pub fn having(mut self, expr: impl Into<QueryExpr>) -> Self {
        self.query.havings.push(expr.into());
        self
    }

    #[must_use]
    pub fn group_by(mut self, expr: impl Into<QueryExpr>) -> Self {
        self.query.group_bys.push(expr.into());
        self
    }

    #[must_use]
    pub fn order_by(mut self, expr: impl Into<QueryExpr>) -> Self {
        self.query.order_bys.push(expr.into());
        self
    }

    #[must_use]
    pub fn distinct(mut self, expr: impl Into<QueryExpr>) -> Self {
        self.query.distincts.push(expr.into());
        self
    }

    #[must_use]
    pub fn select(mut self, expr: impl Into<QueryExpr>) -> Self {
        self.query.select = Some(SelectExpr::new(expr.into()));
        self
    }

    #[must_use]
    pub fn limit(mut self, expr: impl Into<QueryExpr>) -> Self {
        self.query.limit = Some(expr.into());
        self
    }

    #[must_use]
    pub fn offset(mut self, expr: impl Into<QueryExpr>) -> Self {
        self.query.offset = Some(expr.into());
        self
    }

    #[must_use]
    pub fn preload(mut self, path: impl Into<String>) -> Self {
        self.query.preloads.push(path.into());
        self
    }

    /// Project joined associations alongside the from row.
    #[must_use]
    pub fn assocs(mut self, tree: AssocTree) -> Self {
        self.query.assocs = tree;
        self
    }

    #[must_use]
    pub fn lock(mut self, lock: impl Into<String>) -> Self {
        self.query.lock = Some(Lock(lock.into()));
        self
    }

    #[must_use]
    pub fn build(self) -> Query {
        self.query
    }
}
