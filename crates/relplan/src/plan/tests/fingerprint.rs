use super::prepare;
use crate::{
    model::FieldType,
    plan::CacheKey,
    query::{Expr, JoinQualifier, Location, ParamType, Query, QueryBuilder, QueryExpr},
    test_support::USER,
};

fn age_filter(age: i64, location: Location) -> Query {
    QueryBuilder::from_model(USER)
        .join_assoc(JoinQualifier::Inner, 0, "posts")
        .filter(
            QueryExpr::new(Expr::eq(Expr::field(0, "age"), Expr::Param(0)))
                .param(age, ParamType::Type(FieldType::Integer))
                .at(location),
        )
        .build()
}

fn key_of(query: Query) -> CacheKey {
    prepare(query).expect("prepare").cache_key
}

#[test]
fn param_values_do_not_affect_the_key() {
    assert_eq!(
        key_of(age_filter(1, Location::default())),
        key_of(age_filter(99, Location::default()))
    );
}

#[test]
fn locations_do_not_affect_the_key() {
    assert_eq!(
        key_of(age_filter(1, Location::new("a.rs", 1))),
        key_of(age_filter(1, Location::new("b.rs", 2)))
    );
}

#[test]
fn structure_changes_the_key() {
    let base = key_of(age_filter(1, Location::default()));
    let other_field = key_of(
        QueryBuilder::from_model(USER)
            .join_assoc(JoinQualifier::Inner, 0, "posts")
            .filter(
                QueryExpr::new(Expr::eq(Expr::field(0, "id"), Expr::Param(0)))
                    .param(1i64, ParamType::Type(FieldType::Integer)),
            )
            .build(),
    );
    let other_join = key_of(
        QueryBuilder::from_model(USER)
            .join_assoc(JoinQualifier::Left, 0, "posts")
            .filter(
                QueryExpr::new(Expr::eq(Expr::field(0, "age"), Expr::Param(0)))
                    .param(1i64, ParamType::Type(FieldType::Integer)),
            )
            .build(),
    );

    assert_ne!(base, other_field);
    assert_ne!(base, other_join);
    assert_ne!(other_field, other_join);
}

#[test]
fn literals_change_the_key() {
    let limit = |n: i64| key_of(QueryBuilder::from_model(USER).limit(Expr::literal(n)).build());

    assert_ne!(limit(10), limit(20));
}

#[test]
fn hex_rendering_is_stable() {
    let key = key_of(age_filter(1, Location::default()));

    assert_eq!(key.as_hex().len(), 64);
    assert_eq!(key.to_string(), key.as_hex());
    assert!(key.as_hex().chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(key.as_bytes().len(), 32);
}
