use serde_json::Value;

use crate::cache::CacheKey;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

/// Read side of the remote log; entries are written by [`crate::audit`].
pub struct LogEntries<'a> {
    session: &'a Session,
}

impl Session {
    pub fn log_entries(&self) -> LogEntries<'_> {
        LogEntries { session: self }
    }
}

impl LogEntries<'_> {
    pub async fn list(&self) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::LogEntries),
                ApiRequest::get("/administration/log-entries/list"),
                "Log entries not fetched: ",
            )
            .await
    }
}
