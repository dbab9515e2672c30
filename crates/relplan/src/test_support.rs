//! Shared fixtures for unit tests.

use crate::model::{Association, FieldType, ModelDef, Schema};

pub(crate) const USER: &str = "User";
pub(crate) const POST: &str = "Post";
pub(crate) const COMMENT: &str = "Comment";

/// Blog-shaped schema: users have posts, posts have comments and an author.
pub(crate) fn blog_schema() -> Schema {
    Schema::new()
        .model(
            USER,
            ModelDef::new("users")
                .field("id", FieldType::Id)
                .field("name", FieldType::String)
                .field("age", FieldType::Integer)
                .field("score", FieldType::Float)
                .field("active", FieldType::Boolean)
                .field("born", FieldType::Date)
                .field("balance", FieldType::Decimal)
                .association("posts", Association::new(POST, "id", "author_id")),
        )
        .model(
            POST,
            ModelDef::new("posts")
                .field("id", FieldType::Id)
                .field("title", FieldType::String)
                .field("author_id", FieldType::Id)
                .field("visits", FieldType::Integer)
                .field("published_at", FieldType::Timestamp)
                .field("tags", FieldType::array(FieldType::String))
                .association("author", Association::new(USER, "author_id", "id"))
                .association("comments", Association::new(COMMENT, "id", "post_id")),
        )
        .model(
            COMMENT,
            ModelDef::new("comments")
                .field("id", FieldType::Id)
                .field("post_id", FieldType::Id)
                .field("body", FieldType::String),
        )
}
