use super::{Association, FieldType, ModelDef, ModelId, Reflection, Schema, SchemaError};
use crate::test_support::{POST, USER, blog_schema};

#[test]
fn field_type_matches_is_structural() {
    assert!(FieldType::String.matches(&FieldType::String));
    assert!(!FieldType::String.matches(&FieldType::Integer));
    assert!(
        FieldType::array(FieldType::Integer).matches(&FieldType::array(FieldType::Integer))
    );
    assert!(!FieldType::array(FieldType::Integer).matches(&FieldType::array(FieldType::String)));
}

#[test]
fn field_type_matches_relaxations() {
    assert!(FieldType::Any.matches(&FieldType::Timestamp));
    assert!(FieldType::Boolean.matches(&FieldType::Any));
    assert!(FieldType::Id.matches(&FieldType::Integer));
    assert!(FieldType::Integer.matches(&FieldType::Id));
    assert!(FieldType::array(FieldType::Id).matches(&FieldType::array(FieldType::Integer)));

    // no numeric widening
    assert!(!FieldType::Integer.matches(&FieldType::Float));
    assert!(!FieldType::Float.matches(&FieldType::Decimal));
}

#[test]
fn field_type_display() {
    assert_eq!(FieldType::Integer.to_string(), "integer");
    assert_eq!(
        FieldType::array(FieldType::array(FieldType::String)).to_string(),
        "array(array(string))"
    );
}

#[test]
fn schema_reflects_fields_and_associations() {
    let schema = blog_schema();
    let user = ModelId::from(USER);

    assert_eq!(schema.source(&user), Some("users"));
    assert_eq!(schema.field_type(&user, "age"), Some(&FieldType::Integer));
    assert_eq!(schema.field_type(&user, "missing"), None);

    let posts = schema.association(&user, "posts").expect("posts association");
    assert_eq!(posts.related, ModelId::from(POST));
    assert_eq!(posts.owner_key, "id");
    assert_eq!(posts.assoc_key, "author_id");

    assert!(schema.association(&user, "comments").is_none());
    assert!(schema.source(&ModelId::from("Nope")).is_none());
}

#[test]
fn blog_schema_is_consistent() {
    assert_eq!(blog_schema().validate(), Ok(()));
}

#[test]
fn validate_rejects_unknown_related_model() {
    let schema = Schema::new().model(
        "A",
        ModelDef::new("a")
            .field("id", FieldType::Id)
            .association("bs", Association::new("B", "id", "a_id")),
    );

    assert!(matches!(
        schema.validate(),
        Err(SchemaError::UnknownRelated { related, .. }) if related == ModelId::from("B")
    ));
}

#[test]
fn validate_rejects_missing_keys() {
    let schema = Schema::new()
        .model(
            "A",
            ModelDef::new("a")
                .field("id", FieldType::Id)
                .association("bs", Association::new("B", "id", "a_id")),
        )
        .model("B", ModelDef::new("b").field("id", FieldType::Id));

    assert_eq!(
        schema.validate(),
        Err(SchemaError::UnknownKey {
            model: ModelId::from("B"),
            association: "bs".to_string(),
            key: "a_id".to_string(),
        })
    );
}

#[test]
fn validate_rejects_empty_source() {
    let schema = Schema::new().model("A", ModelDef::new(""));

    assert_eq!(
        schema.validate(),
        Err(SchemaError::EmptySource {
            model: ModelId::from("A")
        })
    );
}
