//! Fixpoint render loop
//!
//! Rendering discovers queries; queries are executed in batches between
//! passes; the tree is rendered again with the new data. The loop ends when
//! a pass discovers nothing new, so the final markup contains every
//! reachable piece of data.

use crate::cache::QueryCache;
use crate::config::schema::{PassLimitPolicy, RenderConfig};
use crate::config::Config;
use crate::error::{PrerenderError, PrerenderResult};
use crate::graphql::{classify, display_name, ConfiguredLoader, EnvelopeTemplate, GraphQLInvoker, HandlerLoader};
use crate::render::{Component, HeadState, Location, RenderContext, RenderOptions};
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Tunables for the render loop and the synthetic envelope
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Upper bound on render passes (0 = unbounded)
    pub max_passes: usize,
    pub on_pass_limit: PassLimitPolicy,
    pub function_name: String,
    pub remaining_time: Duration,
    pub headers: BTreeMap<String, String>,
    pub options: RenderOptions,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        let RenderConfig {
            max_passes,
            on_pass_limit,
            vars,
        } = config.render.clone();

        Self {
            max_passes,
            on_pass_limit,
            function_name: config.api.function_name.clone(),
            remaining_time: Duration::from_millis(config.api.remaining_time_ms),
            headers: config.api.headers.clone(),
            options: RenderOptions {
                prerendering: true,
                vars,
            },
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of prerendering one path
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutcome {
    pub markup: String,
    /// Head metadata of the final pass
    pub head: HeadState,
    /// Render passes performed
    pub passes: usize,
    /// Resolution rounds that invoked at least one query
    pub rounds: usize,
    pub resolved: usize,
    pub abandoned: usize,
    /// Handler invocations attempted
    pub invocations: usize,
    pub warnings: Vec<String>,
    /// False when the pass limit cut the loop short
    pub complete: bool,
}

/// Prerenders component trees against a GraphQL handler
pub struct PrerenderEngine {
    loader: Arc<dyn HandlerLoader>,
    settings: EngineSettings,
}

impl PrerenderEngine {
    pub fn new(loader: Arc<dyn HandlerLoader>, settings: EngineSettings) -> Self {
        Self { loader, settings }
    }

    /// Engine using the handler configured in `[api]`
    pub fn from_config(config: &Config, root: impl Into<PathBuf>) -> Self {
        let loader = ConfiguredLoader::new(config.api.clone(), root);
        Self::new(Arc::new(loader), EngineSettings::from_config(config))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Prerender one location with a fresh cache and invoker
    pub async fn render(
        &self,
        tree: &dyn Component,
        location: &Location,
    ) -> PrerenderResult<RenderOutcome> {
        let template = EnvelopeTemplate::new(
            self.settings.function_name.as_str(),
            &self.settings.headers,
            self.settings.remaining_time,
        );
        let invoker = GraphQLInvoker::new(Arc::clone(&self.loader), template);
        let mut cache = QueryCache::new();
        self.resolve(tree, location, &mut cache, &invoker).await
    }

    /// Run the fixpoint loop over `cache` until it is settled
    pub async fn resolve(
        &self,
        tree: &dyn Component,
        location: &Location,
        cache: &mut QueryCache,
        invoker: &GraphQLInvoker,
    ) -> PrerenderResult<RenderOutcome> {
        let mut passes = 0;
        let mut rounds = 0;
        let mut invocations = 0;
        let mut handler_missing: Option<String> = None;
        let mut warnings = Vec::new();

        loop {
            let pending = cache.pending();
            if !pending.is_empty() {
                rounds += 1;
                invocations += pending.len();
                debug!(
                    "{}: resolving {} queries (round {})",
                    location.pathname,
                    pending.len(),
                    rounds
                );

                let results = join_all(pending.iter().map(|entry| async move {
                    let raw = invoker.invoke(&entry.query, &entry.variables).await?;
                    classify(&raw, &entry.query, &entry.variables)
                }))
                .await;

                for (entry, result) in pending.iter().zip(results) {
                    match result {
                        Ok(data) => {
                            cache.resolve(&entry.key, data);
                        }
                        Err(e) if e.is_recoverable() => {
                            cache.abandon(&entry.key);
                            handler_missing.get_or_insert_with(|| e.to_string());
                        }
                        Err(e) => {
                            if e.is_auth_failure() {
                                error!(
                                    "{}: operation {} requires authentication and cannot be prerendered",
                                    location.pathname,
                                    display_name(&entry.query)
                                );
                            }
                            return Err(e);
                        }
                    }
                }
            }

            passes += 1;
            let mut head = HeadState::new();
            let markup = {
                let mut cx = RenderContext::new(
                    location,
                    &self.settings.options,
                    cache,
                    &mut head,
                    passes,
                );
                tree.render(&mut cx)?
            };

            let settled = cache.is_settled();
            let limit_hit = !settled
                && self.settings.max_passes > 0
                && passes >= self.settings.max_passes;

            if limit_hit && self.settings.on_pass_limit == PassLimitPolicy::Fail {
                return Err(PrerenderError::PassLimitExceeded {
                    path: location.pathname.clone(),
                    passes,
                    pending: cache.pending().len(),
                });
            }

            if settled || limit_hit {
                if let Some(reason) = &handler_missing {
                    let message = format!(
                        "{}: {} queries rendered in loading state ({})",
                        location.pathname,
                        cache.abandoned_count(),
                        reason
                    );
                    warn!("{}", message);
                    warnings.push(message);
                }
                if limit_hit {
                    let message = format!(
                        "{}: stopped after {} passes with {} queries unresolved",
                        location.pathname,
                        passes,
                        cache.pending().len()
                    );
                    warn!("{}", message);
                    warnings.push(message);
                }

                info!(
                    "Rendered {} in {} passes ({} queries)",
                    location.pathname,
                    passes,
                    cache.len()
                );
                return Ok(RenderOutcome {
                    markup,
                    head,
                    passes,
                    rounds,
                    resolved: cache.processed_count() - cache.abandoned_count(),
                    abandoned: cache.abandoned_count(),
                    invocations,
                    warnings,
                    complete: settled,
                });
            }
        }
    }
}
