use serde_json::Value;

use crate::api::Crud;
use crate::error::ApiError;
use crate::graph::Topic;
use crate::session::Session;

const NOTES: Crud = Crud {
    base: "/planning/notes",
    topic: Topic::Notes,
    singular: "Note",
    plural: "Notes",
};

pub struct Notes<'a> {
    session: &'a Session,
}

impl Session {
    pub fn notes(&self) -> Notes<'_> {
        Notes { session: self }
    }
}

impl Notes<'_> {
    pub async fn list(&self) -> Option<Value> {
        NOTES.list(self.session).await
    }

    pub async fn get(&self, id: i64) -> Option<Value> {
        NOTES.get(self.session, id).await
    }

    pub async fn create(&self, note: Value) -> Result<Value, ApiError> {
        self.session.mutate(NOTES.create(note)).await
    }

    pub async fn update(&self, note: Value) -> Result<Value, ApiError> {
        let mutation = NOTES.update(self.session, note)?;
        self.session.mutate(mutation).await
    }

    pub async fn delete(&self, id: i64) -> Result<Value, ApiError> {
        self.session.mutate(NOTES.delete(id)).await
    }
}
