use serde_json::Value;

use crate::cache::CacheKey;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

/// Previously used transaction descriptions, for autocompletion.
pub struct DescriptionHistory<'a> {
    session: &'a Session,
}

impl Session {
    pub fn description_history(&self) -> DescriptionHistory<'_> {
        DescriptionHistory { session: self }
    }
}

impl DescriptionHistory<'_> {
    pub async fn list(&self) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::DescriptionHistory),
                ApiRequest::get("/administration/description-history/list"),
                "Description history not fetched: ",
            )
            .await
    }
}
