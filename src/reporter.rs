use tracing::error;

use crate::error::ApiError;
use crate::notify::{NotificationStore, Severity};

/// Logs a failed call, surfaces it as an error notification and hands the
/// failure back so the caller still sees the operation as failed.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    notifications: NotificationStore,
}

impl ErrorReporter {
    pub fn new(notifications: NotificationStore) -> Self {
        Self { notifications }
    }

    /// `context` is the user-facing prefix, e.g. `"Accounts not fetched: "`.
    pub fn report(&self, err: ApiError, context: &str) -> ApiError {
        let stage = stage(&err);
        match &err {
            ApiError::Response {
                status,
                headers,
                body,
            } => {
                error!(stage, status, ?headers, %body, "api call failed");
            }
            ApiError::NoResponse(msg)
            | ApiError::Setup(msg)
            | ApiError::Decode(msg)
            | ApiError::Invalid(msg) => {
                error!(stage, %msg, "api call failed");
            }
        }
        self.notifications
            .show(format!("{context}{}", err.cause()), Severity::Error);
        err
    }
}

/// Where in the request lifecycle `err` happened.
fn stage(err: &ApiError) -> &'static str {
    match err {
        ApiError::Response { .. } => "error response",
        ApiError::NoResponse(_) => "no response received",
        ApiError::Setup(_) => "request setup",
        ApiError::Decode(_) => "response body not decodable",
        ApiError::Invalid(_) => "rejected before sending",
    }
}
