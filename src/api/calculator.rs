use serde_json::Value;

use crate::api::Crud;
use crate::cache::CacheKey;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::http::ApiRequest;
use crate::session::Session;

const RULES: Crud = Crud {
    base: "/planning/calculator/calculation_rule",
    topic: Topic::CalculationRules,
    singular: "Calculation rule",
    plural: "Calculation rules",
};

pub struct Calculator<'a> {
    session: &'a Session,
}

impl Session {
    pub fn calculator(&self) -> Calculator<'_> {
        Calculator { session: self }
    }
}

impl Calculator<'_> {
    pub async fn rules(&self) -> Option<Value> {
        RULES.list(self.session).await
    }

    pub async fn create_rule(&self, rule: Value) -> Result<Value, ApiError> {
        self.session.mutate(RULES.create(rule)).await
    }

    pub async fn update_rule(&self, rule: Value) -> Result<Value, ApiError> {
        let mutation = RULES.update(self.session, rule)?;
        self.session.mutate(mutation).await
    }

    pub async fn delete_rule(&self, id: i64) -> Result<Value, ApiError> {
        self.session.mutate(RULES.delete(id)).await
    }

    /// Result of applying a rule over `timeframe`. With no rule selected
    /// nothing is requested.
    pub async fn calculate(&self, rule_id: Option<i64>, timeframe: i64) -> Option<Value> {
        let rule_id = rule_id?;
        self.session
            .query(
                CacheKey::new(Topic::Calculator)
                    .with("rule_id", rule_id)
                    .with("timeframe", timeframe),
                ApiRequest::get(format!("/planning/calculator/get/{rule_id}"))
                    .query("timeframe", timeframe),
                "Calculator not fetched: ",
            )
            .await
    }
}
