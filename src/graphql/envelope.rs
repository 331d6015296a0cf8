//! Synthetic function-invocation envelope
//!
//! GraphQL entrypoints are written as HTTP-triggered serverless functions.
//! To call one in-process we hand it the same event and context shapes it
//! would receive behind an API gateway. Everything except `body` is fixed
//! for the lifetime of an invoker.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Path the synthetic request claims to target
pub const GRAPHQL_PATH: &str = "/graphql";

/// HTTP method of every synthetic request
pub const GRAPHQL_METHOD: &str = "POST";

/// Request context attached to every event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub request_id: String,
    pub stage: String,
    pub identity: RequestIdentity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestIdentity {
    pub source_ip: String,
    pub user_agent: String,
}

/// HTTP-style event passed to the handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    pub body: String,
    pub headers: BTreeMap<String, String>,
    pub http_method: String,
    pub path: String,
    pub query_string_parameters: BTreeMap<String, String>,
    pub request_context: RequestContext,
    pub is_base64_encoded: bool,
}

/// Builds events that differ only in their body
#[derive(Debug, Clone)]
pub struct EnvelopeTemplate {
    headers: BTreeMap<String, String>,
    request_id: String,
    function_name: String,
    time_budget: Duration,
}

impl EnvelopeTemplate {
    /// Create a template with a fresh synthetic request id
    pub fn new(
        function_name: impl Into<String>,
        extra_headers: &BTreeMap<String, String>,
        time_budget: Duration,
    ) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        for (name, value) in extra_headers {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }

        Self {
            headers,
            request_id: format!("prerender-{}", Uuid::new_v4()),
            function_name: function_name.into(),
            time_budget,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Event carrying `body` as the request payload
    pub fn event(&self, body: String) -> InvocationEvent {
        InvocationEvent {
            body,
            headers: self.headers.clone(),
            http_method: GRAPHQL_METHOD.to_string(),
            path: GRAPHQL_PATH.to_string(),
            query_string_parameters: BTreeMap::new(),
            request_context: RequestContext {
                request_id: self.request_id.clone(),
                stage: "prerender".to_string(),
                identity: RequestIdentity {
                    source_ip: "127.0.0.1".to_string(),
                    user_agent: concat!("prerender/", env!("CARGO_PKG_VERSION")).to_string(),
                },
            },
            is_base64_encoded: false,
        }
    }

    /// Execution context for one call; the budget starts counting now
    pub fn context(&self) -> InvocationContext {
        InvocationContext {
            function_name: self.function_name.clone(),
            aws_request_id: self.request_id.clone(),
            budget: self.time_budget,
            started: Instant::now(),
        }
    }
}

/// Execution context mirroring a serverless function's
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub function_name: String,
    pub aws_request_id: String,
    budget: Duration,
    started: Instant,
}

impl InvocationContext {
    /// Milliseconds left of the time budget; zero once exceeded
    pub fn get_remaining_time_in_millis(&self) -> u64 {
        let left = self.budget.saturating_sub(self.started.elapsed());
        u64::try_from(left.as_millis()).unwrap_or(u64::MAX)
    }

    /// Completion callbacks are accepted and ignored
    pub fn done(&self) {}

    pub fn fail(&self) {}

    pub fn succeed(&self) {}

    /// JSON view handed to out-of-process handlers
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "functionName": self.function_name,
            "awsRequestId": self.aws_request_id,
            "callbackWaitsForEmptyEventLoop": false,
            "remainingTimeInMillis": self.get_remaining_time_in_millis(),
        })
    }
}

/// Function-style response returned by a handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    #[serde(default = "default_status")]
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
}

fn default_status() -> u16 {
    200
}

impl HandlerResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }
}
