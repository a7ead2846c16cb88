use serde_json::Value;

use crate::cache::CacheKey;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

pub struct TagTypes<'a> {
    session: &'a Session,
}

impl Session {
    pub fn tag_types(&self) -> TagTypes<'_> {
        TagTypes { session: self }
    }
}

impl TagTypes<'_> {
    pub async fn list(&self) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::TagTypes),
                ApiRequest::get("/tagtypes"),
                "Tag types not fetched: ",
            )
            .await
    }
}
