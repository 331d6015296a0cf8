//! Classification of raw GraphQL responses
//!
//! Turns the raw body returned by a handler into either the `data`
//! payload or a typed failure. Pure: no logging, no state.

use crate::error::{PrerenderError, PrerenderResult};
use crate::graphql::operation::display_name;
use serde_json::{Map, Value};

/// Classify a raw response body for the given operation
///
/// - unparseable body: [`PrerenderError::MalformedResponse`]
/// - non-empty `errors` array: [`PrerenderError::GraphQLExecution`] with the
///   first error's message and extension code
/// - otherwise the `data` member, or `null` when absent
pub fn classify(raw: &str, query: &str, variables: &Map<String, Value>) -> PrerenderResult<Value> {
    let parsed: Value = serde_json::from_str(raw).map_err(|e| PrerenderError::MalformedResponse {
        operation: display_name(query),
        query: query.to_string(),
        variables: Value::Object(variables.clone()).to_string(),
        response: raw.to_string(),
        reason: e.to_string(),
    })?;

    if let Some(errors) = parsed.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            return Err(execution_error(errors, query));
        }
    }

    Ok(parsed.get("data").cloned().unwrap_or(Value::Null))
}

fn execution_error(errors: &[Value], query: &str) -> PrerenderError {
    let first = &errors[0];

    let message = first
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Value::Array(errors.to_vec()).to_string());

    let code = first
        .pointer("/extensions/code")
        .and_then(Value::as_str)
        .map(str::to_string);

    PrerenderError::GraphQLExecution {
        operation: display_name(query),
        message,
        code,
    }
}
