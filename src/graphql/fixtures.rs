//! Handler serving canned responses
//!
//! The fixtures file is a JSON object keyed by operation name. The key
//! `"*"` answers any operation without its own entry. String values are
//! returned verbatim as the response body; anything else is serialized.

use crate::error::{PrerenderError, PrerenderResult};
use crate::graphql::envelope::{HandlerResponse, InvocationContext, InvocationEvent};
use crate::graphql::handler::GraphQLHandler;
use crate::graphql::operation::{operation_name, ANONYMOUS_OPERATION};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Key used when no fixture matches the operation name
pub const FALLBACK_FIXTURE: &str = "*";

pub struct FixtureHandler {
    fixtures: Map<String, Value>,
}

impl FixtureHandler {
    pub fn new(fixtures: Map<String, Value>) -> Self {
        Self { fixtures }
    }

    pub async fn from_file(path: &Path) -> PrerenderResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PrerenderError::io(format!("reading fixtures {}", path.display()), e))?;

        match serde_json::from_str(&content)? {
            Value::Object(fixtures) => Ok(Self::new(fixtures)),
            _ => Err(PrerenderError::User(format!(
                "Fixtures file {} must contain a JSON object keyed by operation name",
                path.display()
            ))),
        }
    }

    fn lookup(&self, operation: &str) -> Option<&Value> {
        self.fixtures
            .get(operation)
            .or_else(|| self.fixtures.get(FALLBACK_FIXTURE))
    }
}

#[async_trait]
impl GraphQLHandler for FixtureHandler {
    async fn invoke(
        &self,
        event: &InvocationEvent,
        _context: &InvocationContext,
    ) -> PrerenderResult<HandlerResponse> {
        let request: Value = serde_json::from_str(&event.body)?;
        let operation = request
            .get("operationName")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                request
                    .get("query")
                    .and_then(Value::as_str)
                    .and_then(operation_name)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| ANONYMOUS_OPERATION.to_string());

        let body = match self.lookup(&operation) {
            Some(Value::String(raw)) => raw.clone(),
            Some(value) => value.to_string(),
            None => json!({
                "errors": [{ "message": format!("No fixture for operation {}", operation) }]
            })
            .to_string(),
        };

        Ok(HandlerResponse::ok(body))
    }

    fn name(&self) -> &str {
        "fixtures"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::envelope::EnvelopeTemplate;
    use crate::graphql::operation::request_body;
    use std::collections::BTreeMap;
    use std::time::Duration;

    async fn call(handler: &FixtureHandler, query: &str) -> String {
        let template = EnvelopeTemplate::new("graphql", &BTreeMap::new(), Duration::from_secs(1));
        let body = request_body(query, &Map::new()).to_string();
        handler
            .invoke(&template.event(body), &template.context())
            .await
            .unwrap()
            .body
    }

    fn handler(fixtures: Value) -> FixtureHandler {
        FixtureHandler::new(fixtures.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn serves_fixture_by_operation_name() {
        let h = handler(json!({"GetPost": {"data": {"post": {"id": 1}}}}));
        let body = call(&h, "query GetPost { post { id } }").await;
        assert_eq!(body, r#"{"data":{"post":{"id":1}}}"#);
    }

    #[tokio::test]
    async fn falls_back_to_wildcard() {
        let h = handler(json!({"*": {"data": null}}));
        assert_eq!(call(&h, "{ anything }").await, r#"{"data":null}"#);
    }

    #[tokio::test]
    async fn string_fixture_is_verbatim() {
        let h = handler(json!({"Broken": "<!doctype html>"}));
        assert_eq!(call(&h, "query Broken { x }").await, "<!doctype html>");
    }

    #[tokio::test]
    async fn missing_fixture_is_graphql_error() {
        let h = handler(json!({}));
        let body = call(&h, "query Unknown { x }").await;
        assert!(body.contains("No fixture for operation Unknown"));
    }

    #[tokio::test]
    async fn rejects_non_object_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("fixtures.json");
        tokio::fs::write(&path, "[]").await.unwrap();
        assert!(FixtureHandler::from_file(&path).await.is_err());
    }
}
