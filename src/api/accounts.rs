use serde_json::Value;

use crate::api::record_id;
use crate::audit::{AuditNote, ErrorLevel, LogRefs};
use crate::cache::CacheKey;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::{Mutation, Session};

/// Account type filter; the numeric ids are the backend's account type ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    All,
    CreditCard,
    Checking,
    Savings,
    Investment,
    Loan,
}

impl AccountType {
    pub fn id(&self) -> Option<u8> {
        match self {
            AccountType::All => None,
            AccountType::CreditCard => Some(1),
            AccountType::Checking => Some(2),
            AccountType::Savings => Some(3),
            AccountType::Investment => Some(4),
            AccountType::Loan => Some(5),
        }
    }

    /// Cache discriminator: `all` or the type id.
    pub fn discriminator(&self) -> String {
        self.id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "all".to_string())
    }
}

pub struct Accounts<'a> {
    session: &'a Session,
}

impl Session {
    pub fn accounts(&self) -> Accounts<'_> {
        Accounts { session: self }
    }
}

impl Accounts<'_> {
    pub async fn list(&self, account_type: AccountType) -> Option<Value> {
        let key = CacheKey::new(Topic::Accounts).with("type", account_type.discriminator());
        let request =
            ApiRequest::get("/accounts/list").query_opt("account_type", account_type.id());
        self.session.query(key, request, "Accounts not fetched: ").await
    }

    pub async fn get(&self, id: i64) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(Topic::Accounts).with("id", id),
                ApiRequest::get(format!("/accounts/get/{id}")),
                "Account not fetched: ",
            )
            .await
    }

    pub async fn create(&self, account: Value) -> Result<Value, ApiError> {
        let mutation = Mutation::new(
            ApiRequest::post("/accounts/create", account),
            Topic::Accounts,
            "Account not created: ",
        )
        .success("Account created successfully!")
        .audited(AuditNote::new(
            "Account created",
            "Account not created",
            ErrorLevel::Info,
        ));
        self.session.mutate(mutation).await
    }

    /// Partial update; `changes` must carry the account `id`.
    pub async fn update(&self, changes: Value) -> Result<Value, ApiError> {
        let failure = "Account not updated: ";
        let id = record_id(&changes).map_err(|e| self.session.report(e, failure))?;
        let mutation = Mutation::new(
            ApiRequest::patch(format!("/accounts/update/{id}"), changes),
            Topic::Accounts,
            failure,
        )
        .success("Account updated successfully!")
        .audited(
            AuditNote::new("Account updated", "Account not updated", ErrorLevel::Info)
                .refs(LogRefs::account(id)),
        );
        self.session.mutate(mutation).await
    }

    pub async fn delete(&self, id: i64) -> Result<Value, ApiError> {
        let mutation = Mutation::new(
            ApiRequest::delete(format!("/accounts/delete/{id}")),
            Topic::Accounts,
            "Account not deleted: ",
        )
        .success("Account deleted successfully!")
        .audited(
            AuditNote::new("Account deleted", "Account not deleted", ErrorLevel::Info)
                .refs(LogRefs::account(id)),
        );
        self.session.mutate(mutation).await
    }
}
