use serde_json::Value;

use crate::cache::CacheKey;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::{Mutation, Session};

/// The backend keeps a single options row.
const OPTIONS_ID: i64 = 1;

pub struct Options<'a> {
    session: &'a Session,
}

impl Session {
    pub fn app_options(&self) -> Options<'_> {
        Options { session: self }
    }
}

impl Options<'_> {
    pub async fn get(&self) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::Options),
                ApiRequest::get(format!("/administration/options/get/{OPTIONS_ID}")),
                "Options not fetched: ",
            )
            .await
    }

    pub async fn prefetch(&self) {
        let _ = self.get().await;
    }

    pub async fn update(&self, changes: Value) -> Result<Value, ApiError> {
        let mutation = Mutation::new(
            ApiRequest::patch(format!("/administration/options/update/{OPTIONS_ID}"), changes),
            Topic::Options,
            "Options not updated: ",
        );
        self.session.mutate(mutation).await
    }
}
