use serde_json::Value;

use crate::api::{record_id, Crud};
use crate::audit::{AuditNote, ErrorLevel, LogRefs};
use crate::cache::CacheKey;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

const REMINDERS: Crud = Crud {
    base: "/reminders",
    topic: Topic::Reminders,
    singular: "Reminder",
    plural: "Reminders",
};

/// Recurring expected transactions. Every call is recorded in the audit log.
pub struct Reminders<'a> {
    session: &'a Session,
}

impl Session {
    pub fn reminders(&self) -> Reminders<'_> {
        Reminders { session: self }
    }
}

impl Reminders<'_> {
    pub async fn list(&self) -> Option<Value> {
        self.session
            .query_audited(
                REMINDERS.list_key(),
                REMINDERS.list_request(),
                "Reminders not fetched: ",
                AuditNote::new("Reminders fetched", "Reminders not fetched", ErrorLevel::Debug),
            )
            .await
    }

    pub async fn get(&self, id: i64) -> Option<Value> {
        self.session
            .query_audited(
                CacheKey::new(Topic::Reminders).with("id", id),
                ApiRequest::get(format!("/reminders/get/{id}")),
                "Reminder not fetched: ",
                AuditNote::new("Reminder fetched", "Reminder not fetched", ErrorLevel::Debug)
                    .refs(LogRefs::reminder(id)),
            )
            .await
    }

    pub async fn create(&self, reminder: Value) -> Result<Value, ApiError> {
        let mutation = REMINDERS.create(reminder).audited(AuditNote::new(
            "Reminder created",
            "Reminder not created",
            ErrorLevel::Info,
        ));
        self.session.mutate(mutation).await
    }

    pub async fn update(&self, reminder: Value) -> Result<Value, ApiError> {
        let id = record_id(&reminder).ok();
        let mutation = REMINDERS.update(self.session, reminder)?.audited(
            AuditNote::new("Reminder updated", "Reminder not updated", ErrorLevel::Info).refs(
                LogRefs {
                    reminder_id: id,
                    ..Default::default()
                },
            ),
        );
        self.session.mutate(mutation).await
    }

    pub async fn delete(&self, id: i64) -> Result<Value, ApiError> {
        let mutation = REMINDERS.delete(id).audited(
            AuditNote::new("Reminder deleted", "Reminder not deleted", ErrorLevel::Info)
                .refs(LogRefs::reminder(id)),
        );
        self.session.mutate(mutation).await
    }
}
