//! View state driving the transaction list: paging and filter parameters.
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub account_id: Option<i64>,
    pub maxdays: Option<i64>,
    pub forecast: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub view_type: Option<i64>,
    pub rule_id: Option<i64>,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            account_id: None,
            maxdays: Some(14),
            forecast: Some(true),
            page: Some(1),
            page_size: Some(20),
            view_type: None,
            rule_id: None,
        }
    }
}

impl PageInfo {
    /// Query pairs for the present fields, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let fields = [
            ("account", self.account_id.map(|v| v.to_string())),
            ("maxdays", self.maxdays.map(|v| v.to_string())),
            ("forecast", self.forecast.map(|v| v.to_string())),
            ("pageno", self.page.map(|v| v.to_string())),
            ("recno", self.page_size.map(|v| v.to_string())),
            ("view_type", self.view_type.map(|v| v.to_string())),
            ("rule_id", self.rule_id.map(|v| v.to_string())),
        ];
        fields
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
            .collect()
    }
}

/// Shared holder of the current [`PageInfo`]. Accepts whatever it is given.
#[derive(Debug, Clone, Default)]
pub struct PageInfoStore {
    inner: Arc<RwLock<PageInfo>>,
}

impl PageInfoStore {
    pub fn new(initial: PageInfo) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn get(&self) -> PageInfo {
        self.inner.read().clone()
    }

    pub fn set(&self, info: PageInfo) {
        *self.inner.write() = info;
    }

    pub fn update(&self, f: impl FnOnce(&mut PageInfo)) {
        f(&mut self.inner.write());
    }
}
