use serde_json::Value;

use crate::cache::CacheKey;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

pub struct PlanningGraphs<'a> {
    session: &'a Session,
}

impl Session {
    pub fn planning_graphs(&self) -> PlanningGraphs<'_> {
        PlanningGraphs { session: self }
    }
}

impl PlanningGraphs<'_> {
    pub async fn expense_graph(&self) -> Option<Value> {
        self.graph(Topic::ExpenseGraph, "expense", "Expense graph not fetched: ")
            .await
    }

    pub async fn pay_graph(&self) -> Option<Value> {
        self.graph(Topic::PayGraph, "pay", "Pay graph not fetched: ").await
    }

    async fn graph(&self, topic: Topic, graph_type: &str, failure: &str) -> Option<Value> {
        self.session
            .query(
                CacheKey::new(topic),
                ApiRequest::get("/planning/graph/list").query("graph_type", graph_type),
                failure,
            )
            .await
    }
}
