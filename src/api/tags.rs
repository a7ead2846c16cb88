use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::Crud;
use crate::cache::CacheKey;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::{Mutation, Session};

const TAGS: Crud = Crud {
    base: "/tags",
    topic: Topic::Tags,
    singular: "Tag",
    plural: "Tags",
};

/// A tag to create. Without a parent it becomes a top-level tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    pub tag_name: String,
    pub tag_type_id: i64,
    pub parent_id: Option<i64>,
}

impl NewTag {
    /// Backend payload: `parent_name` for top-level tags, `child_name` plus
    /// `parent_id` for sub-tags.
    pub fn payload(&self) -> Value {
        match self.parent_id {
            None => json!({
                "parent_name": self.tag_name,
                "tag_type_id": self.tag_type_id,
            }),
            Some(parent_id) => json!({
                "child_name": self.tag_name,
                "tag_type_id": self.tag_type_id,
                "parent_id": parent_id,
            }),
        }
    }
}

pub struct Tags<'a> {
    session: &'a Session,
}

impl Session {
    pub fn tags(&self) -> Tags<'_> {
        Tags { session: self }
    }
}

impl Tags<'_> {
    pub async fn list(&self, tag_type: Option<i64>) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::Tags).with_opt("tag_type", tag_type),
                ApiRequest::get("/tags/list").query_opt("tag_type", tag_type),
                "Tags not fetched: ",
            )
            .await
    }

    pub async fn parent_tags(&self, tag_type: Option<i64>) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::Tags)
                    .with("parent_only", true)
                    .with_opt("tag_type", tag_type),
                ApiRequest::get("/tags/main-tags/list").query_opt("tag_type", tag_type),
                "Parent tags not fetched: ",
            )
            .await
    }

    pub async fn main_tags(&self) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::Tags).with("main_only", true),
                ApiRequest::get("/tags/list").query("main_only", true),
                "Main tags not fetched: ",
            )
            .await
    }

    /// Dashboard graph of spending by tag for one widget.
    pub async fn graph(&self, widget_id: i64) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::TagGraph).with("widget_id", widget_id),
                ApiRequest::get("/tags/graph-by-tags/get").query("widget_id", widget_id),
                "Graph by tags not fetched: ",
            )
            .await
    }

    pub async fn transactions_by_tag(&self, tag_id: i64) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::TagTransactions).with("tag_id", tag_id),
                ApiRequest::get("/tags/tag-graphs/list").query("tag", tag_id),
                "Transactions by tag not fetched: ",
            )
            .await
    }

    pub async fn create(&self, tag: &NewTag) -> Result<Value, ApiError> {
        let mutation = Mutation::new(
            ApiRequest::post("/tags/create", tag.payload()),
            Topic::Tags,
            "Tag not created: ",
        )
        .success("Tag created successfully!");
        self.session.mutate(mutation).await
    }

    pub async fn update(&self, tag: Value) -> Result<Value, ApiError> {
        let mutation = TAGS.update(self.session, tag)?;
        self.session.mutate(mutation).await
    }

    pub async fn delete(&self, id: i64) -> Result<Value, ApiError> {
        self.session.mutate(TAGS.delete(id)).await
    }
}
