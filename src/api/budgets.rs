use serde_json::Value;

use crate::api::Crud;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::session::Session;

const BUDGETS: Crud = Crud {
    base: "/planning/budget",
    topic: Topic::Budgets,
    singular: "Budget",
    plural: "Budgets",
};

pub struct Budgets<'a> {
    session: &'a Session,
}

impl Session {
    pub fn budgets(&self) -> Budgets<'_> {
        Budgets { session: self }
    }
}

impl Budgets<'_> {
    pub async fn list(&self) -> Option<Value> {
        BUDGETS.list(self.session).await
    }

    pub async fn get(&self, id: i64) -> Option<Value> {
        BUDGETS.get(self.session, id).await
    }

    pub async fn create(&self, budget: Value) -> Result<Value, ApiError> {
        self.session.mutate(BUDGETS.create(budget)).await
    }

    pub async fn update(&self, budget: Value) -> Result<Value, ApiError> {
        let mutation = BUDGETS.update(self.session, budget)?;
        self.session.mutate(mutation).await
    }

    pub async fn delete(&self, id: i64) -> Result<Value, ApiError> {
        self.session.mutate(BUDGETS.delete(id)).await
    }
}
