//! In-process GraphQL invoker
//!
//! Wraps one operation in the synthetic envelope and hands it to the
//! handler. The handler is resolved lazily on first use and the outcome,
//! success or not, is kept for the rest of the invocation.

use crate::error::{PrerenderError, PrerenderResult};
use crate::graphql::envelope::EnvelopeTemplate;
use crate::graphql::handler::{GraphQLHandler, HandlerLoader};
use crate::graphql::operation::{display_name, request_body};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Outcome of the one-time handler lookup
enum Resolution {
    Ready(Arc<dyn GraphQLHandler>),
    Missing { entrypoint: String, reason: String },
    Failed { handler: String, reason: String },
}

/// Executes operations for one prerender invocation
pub struct GraphQLInvoker {
    loader: Arc<dyn HandlerLoader>,
    template: EnvelopeTemplate,
    handler: OnceCell<Resolution>,
}

impl GraphQLInvoker {
    pub fn new(loader: Arc<dyn HandlerLoader>, template: EnvelopeTemplate) -> Self {
        Self {
            loader,
            template,
            handler: OnceCell::new(),
        }
    }

    /// Execute an operation and return the raw response body
    ///
    /// Returns [`PrerenderError::HandlerMissing`] when the loader could not
    /// find the entrypoint; handler errors propagate unchanged.
    pub async fn invoke(&self, query: &str, variables: &Map<String, Value>) -> PrerenderResult<String> {
        let handler = self.handler().await?;

        let body = request_body(query, variables).to_string();
        let event = self.template.event(body);
        let context = self.template.context();

        debug!(
            "Invoking {} for operation {}",
            handler.name(),
            display_name(query)
        );
        let response = handler.invoke(&event, &context).await?;
        if response.status_code >= 400 {
            debug!(
                "{} answered {} for {}",
                handler.name(),
                response.status_code,
                display_name(query)
            );
        }

        Ok(response.body)
    }

    async fn handler(&self) -> PrerenderResult<Arc<dyn GraphQLHandler>> {
        let resolution = self
            .handler
            .get_or_init(|| async {
                match self.loader.load().await {
                    Ok(handler) => {
                        info!("Using GraphQL handler {}", handler.name());
                        Resolution::Ready(handler)
                    }
                    Err(PrerenderError::HandlerMissing { entrypoint, reason }) => {
                        Resolution::Missing { entrypoint, reason }
                    }
                    Err(e) => Resolution::Failed {
                        handler: self.loader.entrypoint(),
                        reason: e.to_string(),
                    },
                }
            })
            .await;

        match resolution {
            Resolution::Ready(handler) => Ok(Arc::clone(handler)),
            Resolution::Missing { entrypoint, reason } => {
                Err(PrerenderError::handler_missing(entrypoint, reason))
            }
            Resolution::Failed { handler, reason } => {
                Err(PrerenderError::handler_failed(handler, reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::envelope::{HandlerResponse, InvocationContext, InvocationEvent};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Echo;

    #[async_trait]
    impl GraphQLHandler for Echo {
        async fn invoke(
            &self,
            event: &InvocationEvent,
            _context: &InvocationContext,
        ) -> PrerenderResult<HandlerResponse> {
            Ok(HandlerResponse::ok(event.body.clone()))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct CountingLoader {
        loads: AtomicUsize,
        missing: bool,
    }

    #[async_trait]
    impl HandlerLoader for CountingLoader {
        async fn load(&self) -> PrerenderResult<Arc<dyn GraphQLHandler>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.missing {
                Err(PrerenderError::handler_missing("api", "not built"))
            } else {
                Ok(Arc::new(Echo))
            }
        }

        fn entrypoint(&self) -> String {
            "api".to_string()
        }
    }

    fn invoker(missing: bool) -> (GraphQLInvoker, Arc<CountingLoader>) {
        let loader = Arc::new(CountingLoader {
            loads: AtomicUsize::new(0),
            missing,
        });
        let template = EnvelopeTemplate::new("graphql", &BTreeMap::new(), Duration::from_secs(1));
        (GraphQLInvoker::new(loader.clone(), template), loader)
    }

    #[tokio::test]
    async fn sends_query_and_variables() {
        let (invoker, _) = invoker(false);
        let vars = serde_json::json!({"id": 7}).as_object().cloned().unwrap();
        let raw = invoker
            .invoke("query GetPost($id: Int) { post(id: $id) { id } }", &vars)
            .await
            .unwrap();
        let sent: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(sent["operationName"], "GetPost");
        assert_eq!(sent["variables"]["id"], 7);
    }

    #[tokio::test]
    async fn loads_handler_once() {
        let (invoker, loader) = invoker(false);
        for _ in 0..3 {
            invoker.invoke("{ a }", &Map::new()).await.unwrap();
        }
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_handler_is_reported_every_call_but_loaded_once() {
        let (invoker, loader) = invoker(true);
        for _ in 0..2 {
            let err = invoker.invoke("{ a }", &Map::new()).await.unwrap_err();
            assert!(err.is_recoverable());
        }
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }
}
