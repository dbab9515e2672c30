//! Query data model handed to the planner by the query-building layer.
//!
//! Values here are plain data. Every planning phase consumes a `Query` and
//! returns a new one; nothing is shared between calls.

pub mod builder;
pub mod expr;

#[cfg(test)]
mod tests;

use crate::model::ModelId;
use derive_more::Display;

// re-exports
pub use builder::QueryBuilder;
pub use expr::{Expr, FieldAccess, Location, Operator, Param, ParamType, QueryExpr};

///
/// Clause
///
/// Clause kinds, listed in the order every planning pass visits them.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Clause {
    #[display("select")]
    Select,
    #[display("distinct")]
    Distinct,
    #[display("join")]
    Join,
    #[display("where")]
    Where,
    #[display("group_by")]
    GroupBy,
    #[display("having")]
    Having,
    #[display("order_by")]
    OrderBy,
    #[display("limit")]
    Limit,
    #[display("offset")]
    Offset,
}

impl Clause {
    /// Order in which every pass visits clause expressions. Parameter keys and
    /// placeholder renumbering both follow it.
    pub const TRAVERSAL_ORDER: [Self; 9] = [
        Self::Select,
        Self::Distinct,
        Self::Join,
        Self::Where,
        Self::GroupBy,
        Self::Having,
        Self::OrderBy,
        Self::Limit,
        Self::Offset,
    ];
}

///
/// JoinQualifier
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum JoinQualifier {
    #[display("inner")]
    Inner,
    #[display("left")]
    Left,
    #[display("right")]
    Right,
    #[display("full")]
    Full,
    #[display("cross")]
    Cross,
}

impl JoinQualifier {
    /// Whether rows joined this way can ride along as preloaded associations.
    #[must_use]
    pub const fn supports_preload(self) -> bool {
        matches!(self, Self::Inner | Self::Left)
    }
}

///
/// SourceRef
///
/// Explicit source as written by the user.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SourceRef {
    /// Raw table with no model; field types degrade to `any`.
    Table(String),
    /// Model mapped onto its default table.
    Model(ModelId),
    /// Model mapped onto an explicitly named table.
    TableModel { table: String, model: ModelId },
}

///
/// Source
///
/// Resolved source occupying one binding index.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Source {
    pub table: String,
    pub model: Option<ModelId>,
}

impl Source {
    #[must_use]
    pub fn new(table: impl Into<String>, model: Option<ModelId>) -> Self {
        Self {
            table: table.into(),
            model,
        }
    }
}

///
/// JoinSource
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JoinSource {
    Explicit(SourceRef),
    /// `assoc(binding, name)`: join through an association of an earlier binding.
    Assoc { binding: usize, name: String },
}

///
/// JoinExpr
///

#[derive(Clone, Debug, PartialEq)]
pub struct JoinExpr {
    pub qualifier: JoinQualifier,
    pub source: JoinSource,
    pub on: QueryExpr,
}

impl JoinExpr {
    #[must_use]
    pub const fn new(qualifier: JoinQualifier, source: JoinSource, on: QueryExpr) -> Self {
        Self {
            qualifier,
            source,
            on,
        }
    }

    /// Binding/name pair if this join was declared through an association.
    #[must_use]
    pub fn assoc(&self) -> Option<(usize, &str)> {
        match &self.source {
            JoinSource::Assoc { binding, name } => Some((*binding, name.as_str())),
            JoinSource::Explicit(_) => None,
        }
    }
}

///
/// SelectExpr
///
/// `fields` and `assoc_fields` are filled in by select normalization:
/// the first `assoc_fields` entries after the from binding are association
/// projections rather than output columns.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SelectExpr {
    pub expr: QueryExpr,
    pub fields: Vec<Expr>,
    pub include_from: bool,
    pub assoc_fields: usize,
}

impl SelectExpr {
    #[must_use]
    pub const fn new(expr: QueryExpr) -> Self {
        Self {
            expr,
            fields: Vec::new(),
            include_from: false,
            assoc_fields: 0,
        }
    }
}

///
/// AssocNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssocNode {
    pub name: String,
    pub binding: usize,
    pub children: AssocTree,
}

///
/// AssocTree
///
/// Ordered forest of association name -> (child binding, nested tree).
/// Declaration order is preserved because it decides projection order.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AssocTree(Vec<AssocNode>);

impl AssocTree {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, binding: usize, children: Self) -> Self {
        self.0.push(AssocNode {
            name: name.into(),
            binding,
            children,
        });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssocNode> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a AssocTree {
    type Item = &'a AssocNode;
    type IntoIter = std::slice::Iter<'a, AssocNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

///
/// Lock
///
/// Opaque row-locking clause forwarded to the generator.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Lock(pub String);

///
/// Query
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    pub from: Option<SourceRef>,
    pub joins: Vec<JoinExpr>,
    pub wheres: Vec<QueryExpr>,
    pub havings: Vec<QueryExpr>,
    pub group_bys: Vec<QueryExpr>,
    pub order_bys: Vec<QueryExpr>,
    pub distincts: Vec<QueryExpr>,
    pub select: Option<SelectExpr>,
    pub limit: Option<QueryExpr>,
    pub offset: Option<QueryExpr>,
    pub sources: Vec<Source>,
    /// Preloads resolved by separate queries; carried through untouched.
    pub preloads: Vec<String>,
    pub assocs: AssocTree,
    pub lock: Option<Lock>,
}

impl Query {
    /// Model bound at `binding`, if the source is resolved and carries one.
    #[must_use]
    pub fn model_at(&self, binding: usize) -> Option<&ModelId> {
        self.sources.get(binding)?.model.as_ref()
    }

    /// Sum of local parameter counts across every clause.
    #[must_use]
    pub fn local_param_count(&self) -> usize {
        self.exprs().map(|(_, expr)| expr.params.len()).sum()
    }

    /// Expressions of one clause kind, in declaration order.
    #[must_use]
    pub fn clause_exprs(&self, clause: Clause) -> Vec<&QueryExpr> {
        match clause {
            Clause::Select => self.select.iter().map(|s| &s.expr).collect(),
            Clause::Distinct => self.distincts.iter().collect(),
            Clause::Join => self.joins.iter().map(|j| &j.on).collect(),
            Clause::Where => self.wheres.iter().collect(),
            Clause::GroupBy => self.group_bys.iter().collect(),
            Clause::Having => self.havings.iter().collect(),
            Clause::OrderBy => self.order_bys.iter().collect(),
            Clause::Limit => self.limit.iter().collect(),
            Clause::Offset => self.offset.iter().collect(),
        }
    }

    pub(crate) fn clause_exprs_mut(&mut self, clause: Clause) -> Vec<&mut QueryExpr> {
        match clause {
            Clause::Select => self.select.iter_mut().map(|s| &mut s.expr).collect(),
            Clause::Distinct => self.distincts.iter_mut().collect(),
            Clause::Join => self.joins.iter_mut().map(|j| &mut j.on).collect(),
            Clause::Where => self.wheres.iter_mut().collect(),
            Clause::GroupBy => self.group_bys.iter_mut().collect(),
            Clause::Having => self.havings.iter_mut().collect(),
            Clause::OrderBy => self.order_bys.iter_mut().collect(),
            Clause::Limit => self.limit.iter_mut().collect(),
            Clause::Offset => self.offset.iter_mut().collect(),
        }
    }

    /// Every clause expression paired with its clause kind, in traversal order.
    pub fn exprs(&self) -> impl Iterator<Item = (Clause, &QueryExpr)> {
        Clause::TRAVERSAL_ORDER.into_iter().flat_map(move |clause| {
            self.clause_exprs(clause)
                .into_iter()
                .map(move |expr| (clause, expr))
        })
    }
}
