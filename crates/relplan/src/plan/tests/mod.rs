mod assocs;
mod fingerprint;

use crate::{
    error::{CastError, PlanError, PlannerError},
    plan::{PlanOptions, Planner, Prepared},
    query::Query,
    test_support::blog_schema,
    value::Value,
};

///
/// Helpers
///

fn prepare(query: Query) -> Result<Prepared, PlannerError> {
    let schema = blog_schema();
    Planner::new(&schema).prepare(query, 0)
}

fn plan(query: Query, options: PlanOptions) -> Result<(Query, Vec<Value>), PlannerError> {
    let schema = blog_schema();
    Planner::new(&schema).plan(query, Vec::new(), options)
}

fn planned(query: Query) -> Query {
    match plan(query, PlanOptions::default()) {
        Ok((query, _)) => query,
        Err(err) => panic!("query should plan: {err}"),
    }
}

fn plan_error(result: Result<impl std::fmt::Debug, PlannerError>) -> PlanError {
    match result {
        Err(PlannerError::Plan(err)) => err,
        other => panic!("expected plan error, got {other:?}"),
    }
}

fn cast_error(result: Result<impl std::fmt::Debug, PlannerError>) -> CastError {
    match result {
        Err(PlannerError::Cast(err)) => err,
        other => panic!("expected cast error, got {other:?}"),
    }
}

#[test]
fn plan_appends_query_params_after_base_params() {
    use crate::{
        model::FieldType,
        query::{Expr, ParamType, QueryBuilder, QueryExpr},
    };

    let schema = blog_schema();
    let query = QueryBuilder::from_model("User")
        .filter(
            QueryExpr::new(Expr::eq(Expr::field(0, "age"), Expr::Param(0)))
                .param(5i64, ParamType::Type(FieldType::Integer)),
        )
        .build();

    let (query, params) = Planner::new(&schema)
        .plan(query, vec![Value::from("outer")], PlanOptions::default())
        .expect("query should plan");

    assert_eq!(params, vec![Value::from("outer"), Value::Int(5)]);
    assert_eq!(
        query.wheres[0].expr,
        Expr::eq(Expr::field(0, "age"), Expr::Param(1))
    );
}

#[test]
fn plan_options_deserialize_with_defaults() {
    let empty: PlanOptions = serde_json::from_str("{}").expect("empty options");
    let only_where: PlanOptions =
        serde_json::from_str(r#"{ "only_where": true }"#).expect("only_where options");

    assert_eq!(empty, PlanOptions::default());
    assert_eq!(only_where, PlanOptions::only_where());
}

#[test]
fn errors_render_readable_messages() {
    let err = plan_error(prepare(Query::default()));
    assert_eq!(err.to_string(), "query must have a from expression");

    let err = PlannerError::from(PlanError::OnlyWhere);
    assert_eq!(err.as_plan(), Some(&PlanError::OnlyWhere));
    assert!(err.as_cast().is_none());
}
