use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

use crate::error::ApiError;

/// Body of an outgoing API call.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    /// File upload: the file travels as `import_file`, the metadata as a
    /// JSON-encoded `payload` field.
    Multipart {
        file_name: String,
        bytes: Vec<u8>,
        payload: String,
    },
}

/// A call against the versioned API namespace. `path` is relative to the
/// configured prefix, e.g. `/accounts/list`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).json(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).json(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).json(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn query_opt<T: ToString>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.query(name, v),
            None => self,
        }
    }

    /// Value of the first query parameter called `name`.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Seam between the domain operations and the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue `request` and return the decoded JSON payload (`Null` for an
    /// empty body).
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// reqwest-backed [`Transport`] bound to one base URL and credential.
#[derive(Clone)]
pub struct HttpClient {
    http: Client,
    base_url: Url,
    prefix: String,
    token: String,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new(base_url: Url, prefix: &str, token: String) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("lenorefin-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            prefix: prefix.trim_matches('/').to_string(),
            token,
        })
    }

    pub fn endpoint(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let relative = format!("{}/{}", self.prefix, request.path.trim_start_matches('/'));
        let mut url = self
            .base_url
            .join(&relative)
            .map_err(|e| ApiError::Setup(format!("invalid API path {relative}: {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    pub fn build_request(&self, request: &ApiRequest) -> Result<reqwest::Request, ApiError> {
        let url = self.endpoint(request)?;
        let builder = self
            .http
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.token));
        let builder = match &request.body {
            Body::Empty => builder.header(CONTENT_TYPE, "application/json"),
            Body::Json(body) => builder.json(body),
            Body::Multipart {
                file_name,
                bytes,
                payload,
            } => {
                let form = reqwest::multipart::Form::new()
                    .part(
                        "import_file",
                        reqwest::multipart::Part::bytes(bytes.clone())
                            .file_name(file_name.clone()),
                    )
                    .text("payload", payload.clone());
                builder.multipart(form)
            }
        };
        builder.build().map_err(ApiError::from)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let built = self.build_request(&request)?;
        debug!(method=%built.method(), url=%built.url(), "sending api request");

        let res = self.http.execute(built).await?;
        let status = res.status();
        if !status.is_success() {
            let headers = res
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        value.to_str().unwrap_or("[invalid]").to_string(),
                    )
                })
                .collect();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Response {
                status: status.as_u16(),
                headers,
                body,
            });
        }

        let text = res.text().await?;
        info!(method=%request.method, path=%request.path, %status, "api request completed");
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
