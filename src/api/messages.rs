use serde_json::{json, Value};

use crate::audit::{AuditNote, ErrorLevel};
use crate::cache::CacheKey;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::{Mutation, Session};

/// System messages shown in the inbox.
pub struct Messages<'a> {
    session: &'a Session,
}

impl Session {
    pub fn messages(&self) -> Messages<'_> {
        Messages { session: self }
    }
}

impl Messages<'_> {
    pub async fn list(&self) -> Option<Value> {
        self.session
            .query_audited(
                CacheKey::new(Topic::Messages),
                ApiRequest::get("/messages/list"),
                "Messages not fetched: ",
                AuditNote::new("Messages fetched", "Messages not fetched", ErrorLevel::Debug),
            )
            .await
    }

    pub async fn create(&self, message: Value) -> Result<Value, ApiError> {
        let mutation = Mutation::new(
            ApiRequest::post("/messages/create", message),
            Topic::Messages,
            "Message not created: ",
        )
        .success("Message created successfully!")
        .audited(AuditNote::new(
            "Message created",
            "Message not created",
            ErrorLevel::Info,
        ));
        self.session.mutate(mutation).await
    }

    pub async fn mark_all_read(&self) -> Result<Value, ApiError> {
        let mutation = Mutation::new(
            ApiRequest::patch("/messages/readall/0", json!({ "unread": false })),
            Topic::Messages,
            "Messages not marked read: ",
        )
        .success("Messages marked read successfully!")
        .audited(AuditNote::new(
            "All messages marked read",
            "All messages not marked read",
            ErrorLevel::Info,
        ));
        self.session.mutate(mutation).await
    }

    pub async fn delete_all(&self) -> Result<Value, ApiError> {
        let mutation = Mutation::new(
            ApiRequest::delete("/messages/deleteall/0"),
            Topic::Messages,
            "Messages not deleted: ",
        )
        .success("Messages deleted successfully!")
        .audited(AuditNote::new(
            "All messages deleted",
            "All messages not deleted",
            ErrorLevel::Info,
        ));
        self.session.mutate(mutation).await
    }
}
