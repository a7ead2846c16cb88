use reqwest::Method;
use serde_json::Value;

use crate::error::ApiError;
use crate::graph::Topic;
use crate::http::{ApiRequest, Body};
use crate::session::{Mutation, Session};

pub struct FileImport<'a> {
    session: &'a Session,
}

impl Session {
    pub fn file_import(&self) -> FileImport<'_> {
        FileImport { session: self }
    }
}

impl FileImport<'_> {
    /// Upload a bank export. `mappings` describes how file columns map onto
    /// transaction fields and travels JSON-encoded in the `payload` field.
    pub async fn upload(
        &self,
        mappings: &Value,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Value, ApiError> {
        let failure = "File not imported: ";
        let payload = serde_json::to_string(mappings)
            .map_err(|e| self.session.report(ApiError::Setup(e.to_string()), failure))?;
        let request = ApiRequest {
            method: Method::POST,
            path: "/administration/file-imports/create".to_string(),
            query: Vec::new(),
            body: Body::Multipart {
                file_name: file_name.to_string(),
                bytes,
                payload,
            },
        };
        let response = self
            .session
            .mutate(Mutation::new(request, Topic::Transactions, failure))
            .await?;
        let id = match response.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => "?".to_string(),
        };
        self.session
            .notify_success(&format!("File import ID #{id} started!"));
        Ok(response)
    }
}
