//! Transient user-facing notification state.
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Color token consumed by the presentation layer.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub text: String,
    pub color: String,
    pub visible: bool,
    pub timeout_ms: u64,
}

/// Single-slot notification holder. A new notification replaces the
/// previous one; there is no queue.
#[derive(Debug, Clone)]
pub struct NotificationStore {
    timeout_ms: u64,
    current: Arc<RwLock<Notification>>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(1500)
    }
}

impl NotificationStore {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            current: Arc::new(RwLock::new(Notification {
                text: String::new(),
                color: String::new(),
                visible: false,
                timeout_ms,
            })),
        }
    }

    pub fn show(&self, text: impl Into<String>, severity: Severity) {
        let text = text.into();
        debug!(%text, severity = severity.color(), "notification");
        *self.current.write() = Notification {
            text,
            color: severity.color().to_string(),
            visible: true,
            timeout_ms: self.timeout_ms,
        };
    }

    /// Hide the current notification; called by the presentation layer once
    /// its timeout elapses.
    pub fn dismiss(&self) {
        self.current.write().visible = false;
    }

    pub fn current(&self) -> Notification {
        self.current.read().clone()
    }

    /// The visible notification, if any.
    pub fn visible(&self) -> Option<Notification> {
        let current = self.current.read();
        current.visible.then(|| current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_hidden() {
        let store = NotificationStore::new(2000);
        assert!(store.visible().is_none());
        assert_eq!(store.current().timeout_ms, 2000);
    }

    #[test]
    fn last_write_wins() {
        let store = NotificationStore::default();
        store.show("Budget created successfully!", Severity::Success);
        store.show("Notes not fetched: Error #500", Severity::Error);
        let shown = store.visible().unwrap();
        assert_eq!(shown.text, "Notes not fetched: Error #500");
        assert_eq!(shown.color, "error");
        assert_eq!(shown.timeout_ms, 1500);
    }

    #[test]
    fn dismiss_keeps_text() {
        let store = NotificationStore::default();
        store.show("Payee created successfully!", Severity::Success);
        store.dismiss();
        assert!(store.visible().is_none());
        assert_eq!(store.current().text, "Payee created successfully!");
    }
}
