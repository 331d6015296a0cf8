//! Handler that forwards operations to a running GraphQL endpoint

use crate::error::{PrerenderError, PrerenderResult};
use crate::graphql::envelope::{HandlerResponse, InvocationContext, InvocationEvent};
use crate::graphql::handler::GraphQLHandler;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// POSTs the event body to a fixed URL
pub struct HttpHandler {
    url: String,
    agent: ureq::Agent,
}

impl HttpHandler {
    pub fn new(url: impl Into<String>) -> Self {
        // GraphQL servers report validation failures with 4xx bodies the
        // classifier needs to see
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            url: url.into(),
            agent: config.into(),
        }
    }
}

#[async_trait]
impl GraphQLHandler for HttpHandler {
    async fn invoke(
        &self,
        event: &InvocationEvent,
        context: &InvocationContext,
    ) -> PrerenderResult<HandlerResponse> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        let headers = event.headers.clone();
        let body = event.body.clone();
        let timeout = Duration::from_millis(context.get_remaining_time_in_millis().max(1));

        let result = tokio::task::spawn_blocking(move || post(&agent, &url, &headers, &body, timeout))
            .await
            .map_err(|e| PrerenderError::Internal(format!("HTTP task panicked: {}", e)))?;

        let response = result.map_err(|e| PrerenderError::handler_failed(&self.url, e))?;
        debug!("{} answered {}", self.url, response.status_code);
        Ok(response)
    }

    fn name(&self) -> &str {
        &self.url
    }
}

fn post(
    agent: &ureq::Agent,
    url: &str,
    headers: &BTreeMap<String, String>,
    body: &str,
    timeout: Duration,
) -> Result<HandlerResponse, String> {
    let mut request = agent
        .post(url)
        .config()
        .timeout_global(Some(timeout))
        .build();
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }

    let mut response = request.send(body).map_err(|e| e.to_string())?;
    let status_code = response.status().as_u16();
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| e.to_string())?;

    Ok(HandlerResponse {
        status_code,
        headers: BTreeMap::new(),
        body: text,
    })
}
