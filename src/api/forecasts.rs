use serde_json::Value;

use crate::cache::CacheKey;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

pub struct Forecasts<'a> {
    session: &'a Session,
}

impl Session {
    pub fn forecasts(&self) -> Forecasts<'_> {
        Forecasts { session: self }
    }
}

impl Forecasts<'_> {
    /// Balance forecast for one account between two day offsets from today.
    pub async fn account_forecast(&self, account_id: i64, start: i64, end: i64) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::AccountForecast)
                    .with("account", account_id)
                    .with("start", start)
                    .with("end", end),
                ApiRequest::get(format!("/accounts/forecast/get/{account_id}"))
                    .query("start_interval", start)
                    .query("end_interval", end),
                "Account forecast not fetched: ",
            )
            .await
    }
}
