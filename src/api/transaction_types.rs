use serde_json::Value;

use crate::cache::CacheKey;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

pub struct TransactionTypes<'a> {
    session: &'a Session,
}

impl Session {
    pub fn transaction_types(&self) -> TransactionTypes<'_> {
        TransactionTypes { session: self }
    }
}

impl TransactionTypes<'_> {
    pub async fn list(&self) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::TransactionTypes),
                ApiRequest::get("/transactions/types/list"),
                "Transaction types not fetched: ",
            )
            .await
    }
}
