//! Per-entity read and write operations over the REST API.
//!
//! Every family is a small borrowed handle obtained from a [`Session`], e.g.
//! `session.reminders().delete(5)`. Reads resolve to `None` on failure after
//! the failure has been reported; writes return the reported error.
use serde_json::Value;

use crate::cache::CacheKey;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::{Mutation, Session};

pub mod accounts;
pub mod banks;
pub mod budgets;
pub mod calculator;
pub mod contributions;
pub mod description_history;
pub mod error_levels;
pub mod file_import;
pub mod forecasts;
pub mod health;
pub mod log_entries;
pub mod messages;
pub mod notes;
pub mod options;
pub mod payees;
pub mod planning_graphs;
pub mod reminders;
pub mod retirement;
pub mod tag_types;
pub mod tags;
pub mod transaction_statuses;
pub mod transaction_types;
pub mod transactions;
pub mod version;

/// Integer `id` carried by a record about to be updated.
pub(crate) fn record_id(record: &Value) -> Result<i64, ApiError> {
    record
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::Invalid("record has no integer id".to_string()))
}

/// Conventional `/list`, `/get/{id}`, `/create`, `/update/{id}`,
/// `/delete/{id}` resource under `base`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Crud {
    pub base: &'static str,
    pub topic: Topic,
    pub singular: &'static str,
    pub plural: &'static str,
}

impl Crud {
    pub fn list_key(&self) -> CacheKey {
        CacheKey::new(self.topic)
    }

    pub fn list_request(&self) -> ApiRequest {
        ApiRequest::get(format!("{}/list", self.base))
    }

    pub fn not_fetched(&self, what: &str) -> String {
        format!("{what} not fetched: ")
    }

    pub async fn list(&self, session: &Session) -> Option<Value> {
        session
            .query(self.list_key(), self.list_request(), self.not_fetched(self.plural))
            .await
    }

    pub async fn get(&self, session: &Session, id: i64) -> Option<Value> {
        session
            .query(
                CacheKey::new(self.topic).with("id", id),
                ApiRequest::get(format!("{}/get/{id}", self.base)),
                self.not_fetched(self.singular),
            )
            .await
    }

    pub fn create(&self, record: Value) -> Mutation {
        Mutation::new(
            ApiRequest::post(format!("{}/create", self.base), record),
            self.topic,
            format!("{} not created: ", self.singular),
        )
        .success(format!("{} created successfully!", self.singular))
    }

    /// Full (PUT) update of a record carrying its `id`.
    pub fn update(&self, session: &Session, record: Value) -> Result<Mutation, ApiError> {
        let failure = format!("{} not updated: ", self.singular);
        let id = record_id(&record).map_err(|e| session.report(e, &failure))?;
        Ok(Mutation::new(
            ApiRequest::put(format!("{}/update/{id}", self.base), record),
            self.topic,
            failure,
        )
        .success(format!("{} updated successfully!", self.singular)))
    }

    pub fn delete(&self, id: i64) -> Mutation {
        Mutation::new(
            ApiRequest::delete(format!("{}/delete/{id}", self.base)),
            self.topic,
            format!("{} not deleted: ", self.singular),
        )
        .success(format!("{} deleted successfully!", self.singular))
    }
}
