//! Transactions: the paged list, single and batch writes, and the two-phase
//! create that adds per-account detail records after the parent.
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::record_id;
use crate::audit::{AuditNote, ErrorLevel, LogRefs};
use crate::cache::CacheKey;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::pageinfo::PageInfo;
use crate::session::{Mutation, Session};

/// Transaction type id of a transfer between two accounts.
pub const TRANSFER_TYPE_ID: i64 = 3;
/// Status id of a cleared transaction.
pub const CLEARED_STATUS_ID: i64 = 2;

const DETAIL_PATH: &str = "/transactions/details/create";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub transaction_date: NaiveDate,
    pub total_amount: Decimal,
    pub status_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub description: String,
    pub edit_date: NaiveDate,
    pub add_date: NaiveDate,
    pub transaction_type_id: i64,
    pub source_account_id: Option<i64>,
    pub destination_account_id: Option<i64>,
    pub tag_id: i64,
    #[serde(default)]
    pub full_toggle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paycheck_id: Option<i64>,
    #[serde(rename = "checkNumber", default, skip_serializing_if = "Option::is_none")]
    pub check_number: Option<i64>,
}

/// One per-account leg of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
    pub account_id: i64,
    pub detail_amt: Decimal,
    pub tag_id: i64,
    pub full_toggle: bool,
}

impl NewTransaction {
    pub fn is_transfer(&self) -> bool {
        self.transaction_type_id == TRANSFER_TYPE_ID
    }

    /// Detail legs for this transaction: the source leg for the full amount,
    /// plus a negated destination leg for transfers.
    pub fn detail_records(&self) -> Result<Vec<DetailRecord>, ApiError> {
        let source = self
            .source_account_id
            .ok_or_else(|| ApiError::Invalid("transaction has no source account".to_string()))?;
        let leg = |account_id, amount| DetailRecord {
            transaction_id: None,
            account_id,
            detail_amt: amount,
            tag_id: self.tag_id,
            full_toggle: self.full_toggle,
        };
        let mut legs = vec![leg(source, self.total_amount)];
        if self.is_transfer() {
            let destination = self.destination_account_id.ok_or_else(|| {
                ApiError::Invalid("transfer has no destination account".to_string())
            })?;
            legs.push(leg(destination, -self.total_amount));
        }
        Ok(legs)
    }
}

/// Outcome of a completed create.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedTransaction {
    pub id: Option<i64>,
    pub details: Vec<DetailRecord>,
    pub response: Value,
}

pub struct Transactions<'a> {
    session: &'a Session,
}

impl Session {
    pub fn transactions(&self) -> Transactions<'_> {
        Transactions { session: self }
    }
}

fn page_key(page: &PageInfo) -> CacheKey {
    CacheKey::new(Topic::Transactions)
        .with_opt("account", page.account_id)
        .with_opt("maxdays", page.maxdays)
        .with_opt("forecast", page.forecast)
        .with_opt("page", page.page)
        .with_opt("page_size", page.page_size)
        .with_opt("view_type", page.view_type)
        .with_opt("rule_id", page.rule_id)
}

fn ids_failure(action: &str) -> String {
    format!("Transaction not {action}: ")
}

impl Transactions<'_> {
    /// The page described by the session's current view state.
    pub async fn list(&self) -> Option<Value> {
        let page = self.session.pageinfo().get();
        self.list_page(&page).await
    }

    pub async fn list_page(&self, page: &PageInfo) -> Option<Value> {
        let mut request = ApiRequest::get("/transactions/list");
        request.query = page.query_pairs();
        self.session
            .query(page_key(page), request, "Transactions not fetched: ")
            .await
    }

    pub async fn get(&self, id: i64) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::Transactions).with("id", id),
                ApiRequest::get(format!("/transactions/get/{id}")),
                "Transaction not fetched: ",
            )
            .await
    }

    /// Create a transaction and its detail legs. Success is reported only
    /// once every leg exists.
    pub async fn create(&self, tx: &NewTransaction) -> Result<CreatedTransaction, ApiError> {
        // Filled in once the parent exists, even if a leg fails afterwards.
        let mut parent_id = None;
        let outcome = self.create_inner(tx, &mut parent_id).await;
        let note = AuditNote::new(
            "Transaction created",
            "Transaction not created",
            ErrorLevel::Info,
        )
        .refs(LogRefs {
            transaction_id: parent_id,
            ..Default::default()
        });
        self.session.audit().record(note.entry(outcome.as_ref()));
        outcome
    }

    async fn create_inner(
        &self,
        tx: &NewTransaction,
        parent_id: &mut Option<i64>,
    ) -> Result<CreatedTransaction, ApiError> {
        let failure = "Transaction not created: ";
        let details = tx
            .detail_records()
            .map_err(|e| self.session.report(e, failure))?;
        let mut body = serde_json::to_value(tx)
            .map_err(|e| self.session.report(ApiError::Setup(e.to_string()), failure))?;

        if self.session.options().server_side_details {
            body["details"] = json!(details);
            let request = ApiRequest::post("/transactions/create", body);
            let response = self
                .session
                .mutate(
                    Mutation::new(request, Topic::Transactions, failure)
                        .success("Transaction created successfully!"),
                )
                .await?;
            *parent_id = response.get("id").and_then(Value::as_i64);
            return Ok(CreatedTransaction {
                id: *parent_id,
                details,
                response,
            });
        }

        let response = self
            .session
            .send(ApiRequest::post("/transactions/create", body))
            .await
            .map_err(|e| self.session.report(e, failure))?;
        // From here on the parent exists, so caches are stale whatever happens.
        let Some(id) = response.get("id").and_then(Value::as_i64) else {
            self.session.invalidate(Topic::Transactions);
            return Err(self.session.report(
                ApiError::Invalid("new transaction id missing from response".to_string()),
                failure,
            ));
        };
        *parent_id = Some(id);

        let mut created = Vec::with_capacity(details.len());
        for detail in details {
            let detail = DetailRecord {
                transaction_id: Some(id),
                ..detail
            };
            let body = serde_json::to_value(&detail)
                .map_err(|e| ApiError::Setup(e.to_string()));
            let sent = match body {
                Ok(body) => self.session.send(ApiRequest::post(DETAIL_PATH, body)).await,
                Err(e) => Err(e),
            };
            if let Err(err) = sent {
                warn!(transaction_id = id, account_id = detail.account_id, "detail leg failed");
                self.session.invalidate(Topic::Transactions);
                return Err(self.session.report(err, "Transaction detail not created: "));
            }
            created.push(detail);
        }

        self.session.notify_success("Transaction created successfully!");
        self.session.invalidate(Topic::Transactions);
        info!(transaction_id = id, legs = created.len(), "transaction created");
        Ok(CreatedTransaction {
            id: Some(id),
            details: created,
            response,
        })
    }

    /// Full update of a transaction carrying its `id`.
    pub async fn update(&self, tx: Value) -> Result<Value, ApiError> {
        let failure = "Transaction not updated: ";
        let id = record_id(&tx).map_err(|e| self.session.report(e, failure))?;
        let mutation = Mutation::new(
            ApiRequest::put(format!("/transactions/update/{id}"), tx),
            Topic::Transactions,
            failure,
        )
        .success("Transaction updated successfully!")
        .audited(
            AuditNote::new("Transaction updated", "Transaction not updated", ErrorLevel::Info)
                .refs(LogRefs::transaction(id)),
        );
        self.session.mutate(mutation).await
    }

    /// Mark transactions cleared. One id uses the single form, several the
    /// batch form.
    pub async fn clear(&self, ids: &[i64]) -> Result<Value, ApiError> {
        let failure = ids_failure("cleared");
        let request = match ids {
            [] => return Err(self.no_ids(&failure)),
            [id] => ApiRequest::patch(
                format!("/transactions/clear/{id}"),
                json!({ "status_id": CLEARED_STATUS_ID }),
            ),
            many => ApiRequest::patch(
                "/transactions/clear",
                json!({ "transaction_ids": many, "status_id": CLEARED_STATUS_ID }),
            ),
        };
        let mutation = Mutation::new(request, Topic::Transactions, failure)
            .success(plural_success(ids.len(), "cleared"))
            .audited(self.note("cleared", ids));
        self.session.mutate(mutation).await
    }

    pub async fn delete(&self, ids: &[i64]) -> Result<Value, ApiError> {
        let failure = ids_failure("deleted");
        let request = match ids {
            [] => return Err(self.no_ids(&failure)),
            [id] => ApiRequest::delete(format!("/transactions/delete/{id}")),
            many => ApiRequest::delete("/transactions/delete")
                .json(json!({ "transaction_ids": many })),
        };
        let mutation = Mutation::new(request, Topic::Transactions, failure)
            .success(plural_success(ids.len(), "deleted"))
            .audited(self.note("deleted", ids));
        self.session.mutate(mutation).await
    }

    /// Move a set of transactions to `new_date` in one request.
    pub async fn multi_edit(&self, ids: &[i64], new_date: NaiveDate) -> Result<Value, ApiError> {
        let failure = ids_failure("updated");
        if ids.is_empty() {
            return Err(self.no_ids(&failure));
        }
        let mutation = Mutation::new(
            ApiRequest::patch(
                "/transactions/multi-edit",
                json!({ "transaction_ids": ids, "new_date": new_date }),
            ),
            Topic::Transactions,
            failure,
        )
        .success(plural_success(ids.len(), "updated"))
        .audited(self.note("updated", ids));
        self.session.mutate(mutation).await
    }

    fn no_ids(&self, failure: &str) -> ApiError {
        self.session
            .report(ApiError::Invalid("no transactions selected".to_string()), failure)
    }

    fn note(&self, action: &str, ids: &[i64]) -> AuditNote {
        let refs = match ids {
            [id] => LogRefs::transaction(*id),
            _ => LogRefs::default(),
        };
        AuditNote::new(
            format!("Transaction {action}"),
            format!("Transaction not {action}"),
            ErrorLevel::Info,
        )
        .refs(refs)
    }
}

fn plural_success(count: usize, action: &str) -> String {
    if count == 1 {
        format!("Transaction {action} successfully!")
    } else {
        format!("{count} transactions {action} successfully!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(type_id: i64) -> NewTransaction {
        NewTransaction {
            transaction_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            total_amount: Decimal::new(-40000, 2),
            status_id: 1,
            memo: None,
            description: "Transfer to Kids".into(),
            edit_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            add_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            transaction_type_id: type_id,
            source_account_id: Some(1),
            destination_account_id: Some(2),
            tag_id: 34,
            full_toggle: true,
            paycheck_id: None,
            check_number: None,
        }
    }

    #[test]
    fn transfer_has_two_opposing_legs() {
        let tx = sample(TRANSFER_TYPE_ID);
        let legs = tx.detail_records().unwrap();
        assert_eq!(legs.len(), 2);
        assert_eq!((legs[0].account_id, legs[0].detail_amt), (1, Decimal::new(-40000, 2)));
        assert_eq!((legs[1].account_id, legs[1].detail_amt), (2, Decimal::new(40000, 2)));
        assert!(legs.iter().all(|l| l.tag_id == 34));
    }

    #[test]
    fn other_types_have_one_leg() {
        for type_id in [1, 2, 4] {
            let legs = sample(type_id).detail_records().unwrap();
            assert_eq!(legs.len(), 1);
            assert_eq!(legs[0].account_id, 1);
            assert_eq!(legs[0].detail_amt, Decimal::new(-40000, 2));
        }
    }

    #[test]
    fn transfer_without_destination_is_invalid() {
        let mut tx = sample(TRANSFER_TYPE_ID);
        tx.destination_account_id = None;
        assert!(matches!(tx.detail_records(), Err(ApiError::Invalid(_))));
    }

    #[test]
    fn page_key_covers_every_present_field() {
        let page = PageInfo {
            account_id: Some(7),
            page: Some(1),
            page_size: Some(20),
            maxdays: None,
            forecast: None,
            view_type: None,
            rule_id: None,
        };
        assert_eq!(
            page_key(&page).to_string(),
            "transactions{account=7,page=1,page_size=20}"
        );
    }

    #[test]
    fn serializes_check_number_in_backend_casing() {
        let mut tx = sample(1);
        tx.check_number = Some(1042);
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["checkNumber"], 1042);
        assert_eq!(value["total_amount"], "-400.00");
        assert!(value.get("memo").is_none());
    }
}
