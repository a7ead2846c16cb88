//! Best-effort remote audit log.
//!
//! Operations enqueue a [`LogEntry`] once their own outcome is settled; a
//! worker posts queued entries to the backend log endpoint afterwards.
//! Delivery failures are logged locally and dropped, so they can never change
//! the result of the operation that produced the entry.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, info, instrument, warn};

use crate::cache::QueryCache;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::http::{ApiRequest, Transport};

pub const LOG_ENTRY_PATH: &str = "/administration/log-entries/create";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ErrorLevel {
    Debug = 0,
    Info = 1,
    Error = 2,
}

impl ErrorLevel {
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Foreign keys attached to a log entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogRefs {
    pub account_id: Option<i64>,
    pub reminder_id: Option<i64>,
    pub transaction_id: Option<i64>,
}

impl LogRefs {
    pub fn account(id: i64) -> Self {
        Self {
            account_id: Some(id),
            ..Default::default()
        }
    }

    pub fn reminder(id: i64) -> Self {
        Self {
            reminder_id: Some(id),
            ..Default::default()
        }
    }

    pub fn transaction(id: i64) -> Self {
        Self {
            transaction_id: Some(id),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub log_date: DateTime<Utc>,
    pub log_entry: String,
    pub account_id: Option<i64>,
    pub reminder_id: Option<i64>,
    pub transaction_id: Option<i64>,
    pub error_num: Option<u16>,
    pub error_level_id: u8,
}

/// What an operation wants recorded about itself.
#[derive(Debug, Clone)]
pub struct AuditNote {
    pub success: String,
    pub failure: String,
    pub level: ErrorLevel,
    pub refs: LogRefs,
}

impl AuditNote {
    pub fn new(success: impl Into<String>, failure: impl Into<String>, level: ErrorLevel) -> Self {
        Self {
            success: success.into(),
            failure: failure.into(),
            level,
            refs: LogRefs::default(),
        }
    }

    pub fn refs(mut self, refs: LogRefs) -> Self {
        self.refs = refs;
        self
    }

    /// Entry for a settled operation. Failures are always logged at error
    /// level with the response status (if any) as the error number.
    pub fn entry<T>(&self, outcome: Result<&T, &ApiError>) -> LogEntry {
        let (message, error_num, level) = match outcome {
            Ok(_) => (self.success.clone(), None, self.level),
            Err(err) => (self.failure.clone(), err.status(), ErrorLevel::Error),
        };
        LogEntry {
            log_date: Utc::now(),
            log_entry: message,
            account_id: self.refs.account_id,
            reminder_id: self.refs.reminder_id,
            transaction_id: self.refs.transaction_id,
            error_num,
            error_level_id: level.id(),
        }
    }
}

/// Queue of pending audit entries. Clones share the queue.
#[derive(Debug, Clone)]
pub struct AuditLog {
    queue: Arc<Mutex<VecDeque<LogEntry>>>,
    wake: Arc<Notify>,
    min_level: u8,
}

impl AuditLog {
    pub fn new(min_level: u8) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            wake: Arc::new(Notify::new()),
            min_level,
        }
    }

    /// Enqueue an entry. Never fails; entries below the configured level are
    /// dropped.
    pub fn record(&self, entry: LogEntry) {
        if entry.error_level_id < self.min_level {
            debug!(message=%entry.log_entry, "audit entry below level; dropped");
            return;
        }
        self.queue.lock().push_back(entry);
        self.wake.notify_one();
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Post the oldest pending entry. Returns `false` when the queue is empty.
    #[instrument(skip_all)]
    pub async fn process_next(
        &self,
        transport: &dyn Transport,
        cache: &QueryCache,
    ) -> Result<bool> {
        let next = self.queue.lock().pop_front();
        let Some(entry) = next else {
            return Ok(false);
        };
        let body = serde_json::to_value(&entry).context("failed to encode log entry")?;
        match transport.send(ApiRequest::post(LOG_ENTRY_PATH, body)).await {
            Ok(_) => {
                debug!(message=%entry.log_entry, "audit entry delivered");
                cache.invalidate(&[Topic::LogEntries]);
            }
            Err(err) => {
                warn!(?err, message=%entry.log_entry, "audit entry not delivered; dropped");
            }
        }
        Ok(true)
    }

    /// Post everything currently queued. Returns the number of entries handled.
    pub async fn drain(&self, transport: &dyn Transport, cache: &QueryCache) -> Result<usize> {
        let mut handled = 0;
        while self.process_next(transport, cache).await? {
            handled += 1;
        }
        Ok(handled)
    }

    /// Long-running worker: post entries as they arrive.
    pub async fn run(self, transport: Arc<dyn Transport>, cache: QueryCache) {
        info!("audit worker started");
        loop {
            match self.process_next(transport.as_ref(), &cache).await {
                Ok(true) => {}
                Ok(false) => self.wake.notified().await,
                Err(err) => warn!(?err, "audit worker error"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_entry_uses_note_level() {
        let note = AuditNote::new("Reminder deleted", "Reminder not deleted", ErrorLevel::Info)
            .refs(LogRefs::reminder(5));
        let entry = note.entry::<()>(Ok(&()));
        assert_eq!(entry.log_entry, "Reminder deleted");
        assert_eq!(entry.reminder_id, Some(5));
        assert_eq!(entry.error_num, None);
        assert_eq!(entry.error_level_id, 1);
    }

    #[test]
    fn failure_entry_carries_status() {
        let note = AuditNote::new("Messages fetched", "Messages not fetched", ErrorLevel::Debug);
        let err = ApiError::Response {
            status: 503,
            headers: vec![],
            body: String::new(),
        };
        let entry = note.entry::<()>(Err(&err));
        assert_eq!(entry.log_entry, "Messages not fetched");
        assert_eq!(entry.error_num, Some(503));
        assert_eq!(entry.error_level_id, 2);

        let entry = note.entry::<()>(Err(&ApiError::NoResponse("timeout".into())));
        assert_eq!(entry.error_num, None);
    }

    #[test]
    fn entries_below_level_are_dropped() {
        let log = AuditLog::new(1);
        let note = AuditNote::new("Messages fetched", "Messages not fetched", ErrorLevel::Debug);
        log.record(note.entry::<()>(Ok(&())));
        assert_eq!(log.pending(), 0);
        log.record(note.entry::<()>(Err(&ApiError::NoResponse("x".into()))));
        assert_eq!(log.pending(), 1);
    }

    #[test]
    fn entry_serializes_backend_fields() {
        let note = AuditNote::new("Account updated", "Account not updated", ErrorLevel::Info)
            .refs(LogRefs::account(9));
        let value = serde_json::to_value(note.entry::<()>(Ok(&()))).unwrap();
        assert_eq!(value["account_id"], 9);
        assert_eq!(value["error_level_id"], 1);
        assert!(value["error_num"].is_null());
        assert!(value["log_date"].is_string());
    }
}
