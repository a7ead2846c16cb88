use serde_json::Value;

use crate::cache::CacheKey;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

pub struct Banks<'a> {
    session: &'a Session,
}

impl Session {
    pub fn banks(&self) -> Banks<'_> {
        Banks { session: self }
    }
}

impl Banks<'_> {
    pub async fn list(&self) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::Banks),
                ApiRequest::get("/accounts/banks"),
                "Banks not fetched: ",
            )
            .await
    }
}
