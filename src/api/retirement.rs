use serde_json::Value;

use crate::cache::CacheKey;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

pub struct Retirement<'a> {
    session: &'a Session,
}

impl Session {
    pub fn retirement(&self) -> Retirement<'_> {
        Retirement { session: self }
    }
}

impl Retirement<'_> {
    pub async fn forecast(&self) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::RetirementForecast),
                ApiRequest::get("/planning/retirement/get"),
                "Retirement forecast not fetched: ",
            )
            .await
    }
}
