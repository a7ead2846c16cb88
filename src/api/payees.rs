use serde_json::Value;

use crate::api::Crud;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::session::Session;

const PAYEES: Crud = Crud {
    base: "/administration/payees",
    topic: Topic::Payees,
    singular: "Payee",
    plural: "Payees",
};

pub struct Payees<'a> {
    session: &'a Session,
}

impl Session {
    pub fn payees(&self) -> Payees<'_> {
        Payees { session: self }
    }
}

impl Payees<'_> {
    pub async fn list(&self) -> Option<Value> {
        PAYEES.list(self.session).await
    }

    pub async fn create(&self, payee: Value) -> Result<Value, ApiError> {
        self.session.mutate(PAYEES.create(payee)).await
    }
}
