use serde_json::Value;

use crate::cache::CacheKey;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

pub struct Version<'a> {
    session: &'a Session,
}

impl Session {
    pub fn version(&self) -> Version<'_> {
        Version { session: self }
    }
}

impl Version<'_> {
    pub async fn get(&self) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::Version),
                ApiRequest::get("/administration/version/list"),
                "Version not fetched: ",
            )
            .await
    }

    /// Warm the cache so later reads are immediate.
    pub async fn prefetch(&self) {
        let _ = self.get().await;
    }
}
