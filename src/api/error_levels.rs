use serde_json::Value;

use crate::cache::CacheKey;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

pub struct ErrorLevels<'a> {
    session: &'a Session,
}

impl Session {
    pub fn error_levels(&self) -> ErrorLevels<'_> {
        ErrorLevels { session: self }
    }
}

impl ErrorLevels<'_> {
    pub async fn list(&self) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::ErrorLevels),
                ApiRequest::get("/administration/error-levels/list"),
                "Error levels not fetched: ",
            )
            .await
    }
}
