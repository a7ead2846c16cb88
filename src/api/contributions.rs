//! Planned contributions and the rules that generate them.
use serde_json::Value;

use crate::api::Crud;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::session::Session;

const CONTRIBUTIONS: Crud = Crud {
    base: "/planning/contributions",
    topic: Topic::Contributions,
    singular: "Contribution",
    plural: "Contributions",
};

const RULES: Crud = Crud {
    base: "/planning/contrib-rules",
    topic: Topic::ContributionRules,
    singular: "Contribution rule",
    plural: "Contribution rules",
};

pub struct Contributions<'a> {
    session: &'a Session,
}

pub struct ContributionRules<'a> {
    session: &'a Session,
}

impl Session {
    pub fn contributions(&self) -> Contributions<'_> {
        Contributions { session: self }
    }

    pub fn contribution_rules(&self) -> ContributionRules<'_> {
        ContributionRules { session: self }
    }
}

impl Contributions<'_> {
    pub async fn list(&self) -> Option<Value> {
        CONTRIBUTIONS.list(self.session).await
    }

    pub async fn get(&self, id: i64) -> Option<Value> {
        CONTRIBUTIONS.get(self.session, id).await
    }

    pub async fn create(&self, contribution: Value) -> Result<Value, ApiError> {
        self.session.mutate(CONTRIBUTIONS.create(contribution)).await
    }

    pub async fn update(&self, contribution: Value) -> Result<Value, ApiError> {
        let mutation = CONTRIBUTIONS.update(self.session, contribution)?;
        self.session.mutate(mutation).await
    }

    pub async fn delete(&self, id: i64) -> Result<Value, ApiError> {
        self.session.mutate(CONTRIBUTIONS.delete(id)).await
    }
}

impl ContributionRules<'_> {
    pub async fn list(&self) -> Option<Value> {
        RULES.list(self.session).await
    }

    pub async fn get(&self, id: i64) -> Option<Value> {
        RULES.get(self.session, id).await
    }

    pub async fn create(&self, rule: Value) -> Result<Value, ApiError> {
        self.session.mutate(RULES.create(rule)).await
    }

    pub async fn update(&self, rule: Value) -> Result<Value, ApiError> {
        let mutation = RULES.update(self.session, rule)?;
        self.session.mutate(mutation).await
    }

    pub async fn delete(&self, id: i64) -> Result<Value, ApiError> {
        self.session.mutate(RULES.delete(id)).await
    }
}
