use super::{
    AssocTree, Clause, Expr, JoinQualifier, JoinSource, Location, ParamType, Query, QueryBuilder,
    QueryExpr, Source, SourceRef,
};
use crate::model::{FieldType, ModelId};

fn where_with_params(count: usize) -> QueryExpr {
    let args = (0..count).map(Expr::Param).collect();
    let mut expr = QueryExpr::new(Expr::apply(super::Operator::In, vec![
        Expr::field(0, "id"),
        Expr::List(args),
    ]));
    for i in 0..count {
        expr = expr.param(i64::try_from(i).unwrap_or_default(), ParamType::Type(FieldType::Id));
    }

    expr
}

#[test]
fn builder_assembles_every_clause() {
    let query = QueryBuilder::from_model("User")
        .join(
            JoinQualifier::Left,
            SourceRef::Table("audit".into()),
            Expr::literal(true),
        )
        .join_assoc(JoinQualifier::Inner, 0, "posts")
        .filter(Expr::field(0, "active"))
        .group_by(Expr::field(0, "age"))
        .having(Expr::literal(true))
        .order_by(Expr::field(0, "name"))
        .distinct(Expr::field(0, "name"))
        .select(Expr::Binding(0))
        .limit(Expr::literal(10i64))
        .offset(Expr::literal(5i64))
        .preload("posts")
        .lock("FOR UPDATE")
        .build();

    assert_eq!(query.from, Some(SourceRef::Model(ModelId::from("User"))));
    assert_eq!(query.joins.len(), 2);
    assert_eq!(query.joins[0].assoc(), None);
    assert_eq!(query.joins[1].assoc(), Some((0, "posts")));
    assert_eq!(query.wheres.len(), 1);
    assert!(query.limit.is_some() && query.offset.is_some());
    assert_eq!(query.preloads, vec!["posts".to_string()]);
    assert!(query.sources.is_empty());
}

#[test]
fn assoc_join_defaults_to_true_condition() {
    let query = QueryBuilder::from_model("User")
        .join_assoc(JoinQualifier::Inner, 0, "posts")
        .build();

    assert_eq!(query.joins[0].on.expr, Expr::literal(true));
    assert!(matches!(query.joins[0].source, JoinSource::Assoc { binding: 0, .. }));
}

#[test]
fn params_are_keyed_in_call_order() {
    let expr = where_with_params(3);
    let keys: Vec<usize> = expr.params.iter().map(|(k, _)| *k).collect();

    assert_eq!(keys, vec![0, 1, 2]);
    assert_eq!(expr.expr.placeholder_count(), 3);
}

#[test]
fn exprs_follow_traversal_order() {
    let query = QueryBuilder::from_model("User")
        .offset(Expr::literal(1i64))
        .limit(Expr::literal(1i64))
        .order_by(Expr::field(0, "name"))
        .having(Expr::literal(true))
        .group_by(Expr::field(0, "age"))
        .filter(Expr::literal(true))
        .join_assoc(JoinQualifier::Inner, 0, "posts")
        .distinct(Expr::field(0, "name"))
        .select(Expr::Binding(0))
        .build();

    let clauses: Vec<Clause> = query.exprs().map(|(clause, _)| clause).collect();

    assert_eq!(clauses, Clause::TRAVERSAL_ORDER.to_vec());
}

#[test]
fn local_param_count_sums_all_clauses() {
    let query = QueryBuilder::from_model("User")
        .filter(where_with_params(2))
        .filter(where_with_params(1))
        .limit(QueryExpr::new(Expr::Param(0)).param(10i64, ParamType::Type(FieldType::Integer)))
        .build();

    assert_eq!(query.local_param_count(), 4);
}

#[test]
fn model_at_reads_resolved_sources() {
    let query = Query {
        sources: vec![
            Source::new("users", Some(ModelId::from("User"))),
            Source::new("audit", None),
        ],
        ..Query::default()
    };

    assert_eq!(query.model_at(0), Some(&ModelId::from("User")));
    assert_eq!(query.model_at(1), None);
    assert_eq!(query.model_at(2), None);
}

#[test]
fn assoc_tree_preserves_declaration_order() {
    let tree = AssocTree::new()
        .with("posts", 1, AssocTree::new().with("comments", 2, AssocTree::new()))
        .with("profile", 3, AssocTree::new());

    let names: Vec<&str> = tree.iter().map(|node| node.name.as_str()).collect();

    assert_eq!(names, vec!["posts", "profile"]);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.iter().next().map(|n| n.children.len()), Some(1));
}

#[test]
fn location_defaults_and_display() {
    assert_eq!(Location::default().to_string(), "nofile:0");
    assert_eq!(Location::new("app.rs", 12).to_string(), "app.rs:12");
}

#[test]
fn qualifiers_that_support_preload() {
    assert!(JoinQualifier::Inner.supports_preload());
    assert!(JoinQualifier::Left.supports_preload());
    assert!(!JoinQualifier::Right.supports_preload());
    assert!(!JoinQualifier::Full.supports_preload());
    assert!(!JoinQualifier::Cross.supports_preload());
    assert_eq!(JoinQualifier::Right.to_string(), "right");
}
