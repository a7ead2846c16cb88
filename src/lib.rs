//! Client core for the LenoreFin personal finance API.
//!
//! A [`Session`] owns the transport, the query cache, the notification and
//! view-state stores, and the audit queue. Entity operations hang off it as
//! borrowed handles (see [`api`]).
pub mod api;
pub mod audit;
pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod http;
pub mod notify;
pub mod pageinfo;
pub mod reporter;
pub mod router;
pub mod session;

pub use cache::{CacheKey, QueryCache};
pub use config::Config;
pub use error::ApiError;
pub use graph::{DependencyGraph, Topic};
pub use http::{ApiRequest, HttpClient, Transport};
pub use session::{Session, SessionOptions};
