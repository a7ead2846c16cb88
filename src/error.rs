//! Failure taxonomy for calls against the LenoreFin REST API.
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("server responded with {status}: {body}")]
    Response {
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
    },
    /// The request went out but no response came back (network, timeout).
    #[error("no response received: {0}")]
    NoResponse(String),
    /// The request could not be built locally.
    #[error("error during request setup: {0}")]
    Setup(String),
    /// The server answered successfully with a body we could not decode.
    #[error("invalid response body: {0}")]
    Decode(String),
    /// Input rejected before any request was issued.
    #[error("invalid input: {0}")]
    Invalid(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short, human-readable cause suitable for a notification.
    ///
    /// A JSON `detail` field in the error body wins; otherwise the status code
    /// is used. Failures without a response never look at a status.
    pub fn cause(&self) -> String {
        match self {
            ApiError::Response { status, body, .. } => {
                detail_from_body(body).unwrap_or_else(|| format!("Error #{status}"))
            }
            ApiError::NoResponse(_) => "No response from server".to_string(),
            ApiError::Setup(msg) | ApiError::Invalid(msg) => msg.clone(),
            ApiError::Decode(_) => "Unreadable response from server".to_string(),
        }
    }
}

fn detail_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::Setup(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::NoResponse(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiError {
        ApiError::Response {
            status,
            headers: vec![],
            body: body.to_string(),
        }
    }

    #[test]
    fn cause_prefers_detail_field() {
        let err = response(400, r#"{"detail": "Account name already exists"}"#);
        assert_eq!(err.cause(), "Account name already exists");
    }

    #[test]
    fn cause_falls_back_to_status() {
        assert_eq!(response(404, "Not Found").cause(), "Error #404");
        assert_eq!(response(500, r#"{"detail": null}"#).cause(), "Error #500");
        assert_eq!(response(502, "").cause(), "Error #502");
    }

    #[test]
    fn structured_detail_is_stringified() {
        let err = response(422, r#"{"detail": [{"loc": ["body"], "msg": "missing"}]}"#);
        assert!(err.cause().contains("missing"));
    }

    #[test]
    fn no_response_has_no_status() {
        let err = ApiError::NoResponse("connection refused".into());
        assert_eq!(err.status(), None);
        assert_eq!(err.cause(), "No response from server");
    }
}
