//! Path-to-view routing plus the reload redirect guard.
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

static PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").unwrap());

pub const NOT_FOUND: &str = "NotFound";

const ROUTES: &[(&str, &str)] = &[
    ("/", "dashboard"),
    ("/docs", "docs"),
    ("/accounts", "accounts"),
    ("/accounts/add", "addaccount"),
    ("/accounts/:accountID", "account_detail"),
    ("/forecast", "forecast"),
    ("/planning", "planning"),
    ("/reminders", "reminders"),
    ("/tags", "tags"),
    ("/planning/calculator", "calculator"),
    ("/planning/contributions", "contributions"),
    ("/planning/budgets", "budgets"),
    ("/planning/expenses", "expenses"),
    ("/planning/notes", "notes"),
    ("/planning/pay", "pay"),
    ("/planning/retirement", "retirement"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: &'static str,
    pub params: HashMap<String, String>,
}

#[derive(Debug)]
struct Route {
    name: &'static str,
    pattern: Regex,
}

#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(path: &str) -> Regex {
    let escaped = regex::escape(path);
    // escape() leaves ':' and word characters alone, so params survive it.
    let pattern = PARAM.replace_all(&escaped, "(?P<$1>[^/]+)");
    // Route table is static; a bad entry is a programming error.
    Regex::new(&format!("^{pattern}/?$")).unwrap()
}

impl Router {
    pub fn new() -> Self {
        let routes = ROUTES
            .iter()
            .map(|&(path, name)| Route {
                name,
                pattern: compile(path),
            })
            .collect();
        Self { routes }
    }

    /// First matching route in table order; anything else is `NotFound`
    /// with the full path under `catchAll`.
    pub fn resolve(&self, path: &str) -> RouteMatch {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        for route in &self.routes {
            if let Some(caps) = route.pattern.captures(path) {
                let params = route
                    .pattern
                    .capture_names()
                    .flatten()
                    .filter_map(|name| {
                        caps.name(name)
                            .map(|m| (name.to_string(), m.as_str().to_string()))
                    })
                    .collect();
                return RouteMatch {
                    name: route.name,
                    params,
                };
            }
        }
        RouteMatch {
            name: NOT_FOUND,
            params: HashMap::from([(
                "catchAll".to_string(),
                path.trim_start_matches('/').to_string(),
            )]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(String),
}

/// Sends the first navigation after a full reload back to the dashboard.
#[derive(Debug, Clone, Default)]
pub struct ReloadGuard {
    reloading: Arc<AtomicBool>,
}

impl ReloadGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called just before the page unloads.
    pub fn mark_unload(&self) {
        self.reloading.store(true, Ordering::SeqCst);
    }

    pub fn before_each(&self, to: &str) -> Navigation {
        let reloading = self.reloading.swap(false, Ordering::SeqCst);
        if reloading && to != "/" {
            debug!(to, "reload detected; redirecting to root");
            Navigation::Redirect("/".to_string())
        } else {
            Navigation::Proceed
        }
    }
}
