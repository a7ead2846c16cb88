use serde_json::Value;

use crate::cache::CacheKey;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

pub struct TransactionStatuses<'a> {
    session: &'a Session,
}

impl Session {
    pub fn transaction_statuses(&self) -> TransactionStatuses<'_> {
        TransactionStatuses { session: self }
    }
}

impl TransactionStatuses<'_> {
    pub async fn list(&self) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::TransactionStatuses),
                ApiRequest::get("/transactions/statuses/list"),
                "Transaction statuses not fetched: ",
            )
            .await
    }
}
