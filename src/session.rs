//! The application instance: one transport, one cache, one set of stores.
use reqwest::Url;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use crate::audit::{AuditLog, AuditNote};
use crate::cache::{CacheKey, QueryCache};
use crate::config::{Config, ConfigError};
use crate::error::ApiError;
use crate::graph::{DependencyGraph, Topic};
use crate::http::{ApiRequest, HttpClient, Transport};
use crate::notify::{NotificationStore, Severity};
use crate::pageinfo::{PageInfo, PageInfoStore};
use crate::reporter::ErrorReporter;

/// Behavioural knobs for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub graph: DependencyGraph,
    pub audit_level: u8,
    pub notification_timeout_ms: u64,
    pub health_poll_interval: Duration,
    pub health_max_attempts: u32,
    pub server_side_details: bool,
    pub initial_page: PageInfo,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            graph: DependencyGraph::default(),
            audit_level: 0,
            notification_timeout_ms: 1500,
            health_poll_interval: Duration::from_secs(1),
            health_max_attempts: 60,
            server_side_details: false,
            initial_page: PageInfo::default(),
        }
    }
}

impl SessionOptions {
    pub fn from_config(cfg: &Config) -> Self {
        let mut graph = DependencyGraph::default();
        graph.extend(&cfg.invalidation);
        Self {
            graph,
            audit_level: cfg.app.audit_level,
            notification_timeout_ms: cfg.app.notification_timeout_ms,
            health_poll_interval: Duration::from_millis(cfg.app.health_poll_interval_ms),
            health_max_attempts: cfg.app.health_max_attempts,
            server_side_details: cfg.api.server_side_details,
            initial_page: PageInfo::default(),
        }
    }
}

/// A write against the API plus what to do once it settles.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub request: ApiRequest,
    /// Topic whose dependents go stale on success.
    pub root: Topic,
    pub success: Option<String>,
    pub failure: String,
    pub audit: Option<AuditNote>,
}

impl Mutation {
    pub fn new(request: ApiRequest, root: Topic, failure: impl Into<String>) -> Self {
        Self {
            request,
            root,
            success: None,
            failure: failure.into(),
            audit: None,
        }
    }

    pub fn success(mut self, text: impl Into<String>) -> Self {
        self.success = Some(text.into());
        self
    }

    pub fn audited(mut self, note: AuditNote) -> Self {
        self.audit = Some(note);
        self
    }
}

struct Inner {
    transport: Arc<dyn Transport>,
    cache: QueryCache,
    notifications: NotificationStore,
    pageinfo: PageInfoStore,
    reporter: ErrorReporter,
    audit: AuditLog,
    options: SessionOptions,
}

/// Cheap to clone; clones share every store.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cache", &self.inner.cache)
            .field("pending_audit", &self.inner.audit.pending())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(transport: Arc<dyn Transport>, options: SessionOptions) -> Self {
        let notifications = NotificationStore::new(options.notification_timeout_ms);
        Self {
            inner: Arc::new(Inner {
                transport,
                cache: QueryCache::new(),
                reporter: ErrorReporter::new(notifications.clone()),
                notifications,
                pageinfo: PageInfoStore::new(options.initial_page.clone()),
                audit: AuditLog::new(options.audit_level),
                options,
            }),
        }
    }

    /// Build a session talking HTTP. The credential is resolved here, once.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let token = cfg.api_key()?;
        let base_url = Url::parse(cfg.api.base_url.trim())
            .map_err(|_| ConfigError::Invalid("api.base_url must be an http(s) URL"))?;
        let client = HttpClient::new(base_url, &cfg.api.prefix, token)
            .map_err(|_| ConfigError::Invalid("failed to build HTTP client"))?;
        info!(?client, "session created");
        Ok(Self::new(Arc::new(client), SessionOptions::from_config(cfg)))
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.inner.notifications
    }

    pub fn pageinfo(&self) -> &PageInfoStore {
        &self.inner.pageinfo
    }

    pub fn audit(&self) -> &AuditLog {
        &self.inner.audit
    }

    pub fn options(&self) -> &SessionOptions {
        &self.inner.options
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.inner.transport.clone()
    }

    /// Log and surface a failure, handing it back to the caller.
    pub fn report(&self, err: ApiError, context: &str) -> ApiError {
        self.inner.reporter.report(err, context)
    }

    pub fn notify_success(&self, text: &str) {
        self.inner.notifications.show(text, Severity::Success);
    }

    /// Mark `root` and everything derived from it stale.
    pub fn invalidate(&self, root: Topic) -> Vec<Topic> {
        let topics = self.inner.options.graph.invalidation_set(root);
        self.inner.cache.invalidate(&topics);
        topics
    }

    /// Issue a request with no caching, reporting or invalidation.
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.inner.transport.send(request).await
    }

    /// Cached read. Failures are reported and come back as `None`.
    pub async fn query(
        &self,
        key: CacheKey,
        request: ApiRequest,
        failure: impl Into<String>,
    ) -> Option<Value> {
        self.query_with(key, request, failure.into(), None).await
    }

    /// Cached read that also records its outcome in the audit log.
    pub async fn query_audited(
        &self,
        key: CacheKey,
        request: ApiRequest,
        failure: impl Into<String>,
        note: AuditNote,
    ) -> Option<Value> {
        self.query_with(key, request, failure.into(), Some(note)).await
    }

    async fn query_with(
        &self,
        key: CacheKey,
        request: ApiRequest,
        failure: String,
        note: Option<AuditNote>,
    ) -> Option<Value> {
        let session = self.clone();
        let load = async move {
            let outcome = session
                .send(request)
                .await
                .map_err(|err| session.report(err, &failure));
            if let Some(note) = &note {
                session.audit().record(note.entry(outcome.as_ref()));
            }
            outcome.ok()
        };
        self.inner.cache.fetch(key, load).await
    }

    /// Run a write: notify and invalidate on success, report on failure.
    #[instrument(skip_all, fields(method=%mutation.request.method, path=%mutation.request.path))]
    pub async fn mutate(&self, mutation: Mutation) -> Result<Value, ApiError> {
        let Mutation {
            request,
            root,
            success,
            failure,
            audit,
        } = mutation;
        let outcome = match self.send(request).await {
            Ok(value) => {
                if let Some(text) = &success {
                    self.notify_success(text);
                }
                let topics = self.invalidate(root);
                info!(%root, invalidated = topics.len(), "write succeeded");
                Ok(value)
            }
            Err(err) => Err(self.report(err, &failure)),
        };
        if let Some(note) = &audit {
            self.audit().record(note.entry(outcome.as_ref()));
        }
        outcome
    }

    /// Post every queued audit entry.
    pub async fn flush_audit(&self) -> anyhow::Result<usize> {
        self.inner
            .audit
            .drain(self.inner.transport.as_ref(), &self.inner.cache)
            .await
    }

    /// Start the background audit worker on the current runtime.
    pub fn spawn_audit_worker(&self) -> tokio::task::JoinHandle<()> {
        let worker = self.inner.audit.clone();
        tokio::spawn(worker.run(self.transport(), self.inner.cache.clone()))
    }
}
