use super::{plan, plan_error};
use crate::{
    error::{PlanError, SourceAction},
    model::ModelId,
    plan::PlanOptions,
    query::{AssocTree, Expr, JoinQualifier, Query, QueryBuilder, SourceRef},
    test_support::{COMMENT, POST, USER},
};

fn posts_tree() -> AssocTree {
    AssocTree::new().with("posts", 1, AssocTree::new())
}

fn preload_posts(qualifier: JoinQualifier) -> Query {
    QueryBuilder::from_model(USER)
        .join_assoc(qualifier, 0, "posts")
        .assocs(posts_tree())
        .build()
}

#[test]
fn inner_and_left_joins_can_be_preloaded() {
    for qualifier in [JoinQualifier::Inner, JoinQualifier::Left] {
        assert!(plan(preload_posts(qualifier), PlanOptions::default()).is_ok());
    }
}

#[test]
fn other_joins_cannot_be_preloaded() {
    for qualifier in [JoinQualifier::Right, JoinQualifier::Full, JoinQualifier::Cross] {
        assert_eq!(
            plan_error(plan(preload_posts(qualifier), PlanOptions::default())),
            PlanError::InvalidPreloadJoin {
                model: ModelId::from(USER),
                name: "posts".into(),
                qualifier,
            }
        );
    }
}

#[test]
fn invalid_join_message_names_the_qualifier() {
    let err = plan_error(plan(preload_posts(JoinQualifier::Right), PlanOptions::default()));

    assert_eq!(
        err.to_string(),
        "association 'User.posts' in preload requires an inner or left join, got right join"
    );
}

#[test]
fn unknown_association_name_is_rejected() {
    let query = QueryBuilder::from_model(USER)
        .join_assoc(JoinQualifier::Inner, 0, "posts")
        .assocs(AssocTree::new().with("articles", 1, AssocTree::new()))
        .build();

    assert_eq!(
        plan_error(plan(query, PlanOptions::default())),
        PlanError::NotAnAssociation {
            model: ModelId::from(USER),
            name: "articles".into(),
        }
    );
}

#[test]
fn joined_model_must_match_association() {
    let query = QueryBuilder::from_model(USER)
        .join(
            JoinQualifier::Inner,
            SourceRef::Model(ModelId::from(COMMENT)),
            Expr::literal(true),
        )
        .assocs(posts_tree())
        .build();

    let err = plan_error(plan(query, PlanOptions::default()));

    assert_eq!(
        err,
        PlanError::AssociationModelMismatch {
            model: ModelId::from(USER),
            name: "posts".into(),
            expected: ModelId::from(POST),
            found: Some(ModelId::from(COMMENT)),
        }
    );
    assert_eq!(
        err.to_string(),
        "association 'User.posts' in preload doesn't match join model: expected 'Post', got 'Comment'"
    );
}

#[test]
fn model_less_join_does_not_match_association() {
    let query = QueryBuilder::from_model(USER)
        .join(
            JoinQualifier::Inner,
            SourceRef::Table("posts".into()),
            Expr::literal(true),
        )
        .assocs(posts_tree())
        .build();

    assert_eq!(
        plan_error(plan(query, PlanOptions::default())),
        PlanError::AssociationModelMismatch {
            model: ModelId::from(USER),
            name: "posts".into(),
            expected: ModelId::from(POST),
            found: None,
        }
    );
}

#[test]
fn nested_assocs_resolve_against_the_parent_binding() {
    let query = QueryBuilder::from_model(USER)
        .join_assoc(JoinQualifier::Inner, 0, "posts")
        .join_assoc(JoinQualifier::Inner, 1, "comments")
        .assocs(AssocTree::new().with(
            "posts",
            1,
            // comments is declared on Post, not on User
            AssocTree::new().with("comments", 2, AssocTree::new()),
        ))
        .build();

    assert!(plan(query, PlanOptions::default()).is_ok());
}

#[test]
fn nested_assoc_on_wrong_parent_is_rejected() {
    let query = QueryBuilder::from_model(USER)
        .join_assoc(JoinQualifier::Inner, 0, "posts")
        .join_assoc(JoinQualifier::Inner, 1, "comments")
        .assocs(
            AssocTree::new()
                .with("posts", 1, AssocTree::new())
                .with("comments", 2, AssocTree::new()),
        )
        .build();

    assert_eq!(
        plan_error(plan(query, PlanOptions::default())),
        PlanError::NotAnAssociation {
            model: ModelId::from(USER),
            name: "comments".into(),
        }
    );
}

#[test]
fn preloading_from_a_model_less_source_is_rejected() {
    let query = QueryBuilder::from_table("users")
        .join(
            JoinQualifier::Inner,
            SourceRef::Model(ModelId::from(POST)),
            Expr::literal(true),
        )
        .assocs(posts_tree())
        .build();

    // select normalization rejects the model-less from binding first
    assert_eq!(
        plan_error(plan(query, PlanOptions::default())),
        PlanError::SourceWithoutModel {
            action: SourceAction::Select,
            binding: 0,
            table: "users".into(),
        }
    );
}
