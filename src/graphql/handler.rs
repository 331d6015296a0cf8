//! GraphQL handler abstraction
//!
//! A handler executes one operation and returns a function-style response.
//! Handlers are obtained through a [`HandlerLoader`], which is asked exactly
//! once per prerender invocation:
//! - `command`: an external program speaking the event/response protocol
//! - `http`: a running GraphQL endpoint
//! - `fixtures`: canned responses keyed by operation name
//! - `none`: no entrypoint, every query renders as loading

use crate::config::schema::{ApiConfig, HandlerKind};
use crate::error::{PrerenderError, PrerenderResult};
use crate::graphql::command::CommandHandler;
use crate::graphql::envelope::{HandlerResponse, InvocationContext, InvocationEvent};
use crate::graphql::fixtures::FixtureHandler;
use crate::graphql::http::HttpHandler;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Executes GraphQL operations delivered as function events
#[async_trait]
pub trait GraphQLHandler: Send + Sync {
    /// Handle one event and return the function response
    async fn invoke(
        &self,
        event: &InvocationEvent,
        context: &InvocationContext,
    ) -> PrerenderResult<HandlerResponse>;

    /// Human-readable handler name for diagnostics
    fn name(&self) -> &str;
}

/// Locates the host application's GraphQL handler
///
/// Returning [`PrerenderError::HandlerMissing`] means the entrypoint cannot
/// be found; the render loop degrades affected queries to loading state.
/// Any other error is fatal.
#[async_trait]
pub trait HandlerLoader: Send + Sync {
    async fn load(&self) -> PrerenderResult<Arc<dyn GraphQLHandler>>;

    /// Description of where the handler is expected to live
    fn entrypoint(&self) -> String;
}

/// Loader for a handler that already exists in-process
pub struct StaticLoader {
    handler: Arc<dyn GraphQLHandler>,
}

impl StaticLoader {
    pub fn new(handler: Arc<dyn GraphQLHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl HandlerLoader for StaticLoader {
    async fn load(&self) -> PrerenderResult<Arc<dyn GraphQLHandler>> {
        Ok(Arc::clone(&self.handler))
    }

    fn entrypoint(&self) -> String {
        self.handler.name().to_string()
    }
}

/// Loader driven by the `[api]` configuration section
pub struct ConfiguredLoader {
    api: ApiConfig,
    root: PathBuf,
}

impl ConfiguredLoader {
    /// Relative paths in `api` resolve against `root`
    pub fn new(api: ApiConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            api,
            root: root.into(),
        }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn resolve_program(&self, program: &str) -> Option<PathBuf> {
        let path = Path::new(program);
        if path.components().count() > 1 || path.is_absolute() {
            let resolved = self.resolve_path(path);
            return resolved.is_file().then_some(resolved);
        }
        which::which(program).ok()
    }
}

#[async_trait]
impl HandlerLoader for ConfiguredLoader {
    async fn load(&self) -> PrerenderResult<Arc<dyn GraphQLHandler>> {
        let entrypoint = self.entrypoint();
        debug!("Loading GraphQL handler from {}", entrypoint);

        match self.api.handler {
            HandlerKind::None => Err(PrerenderError::handler_missing(
                entrypoint,
                "no GraphQL handler configured",
            )),
            HandlerKind::Command => {
                let (program, args) = self.api.command.split_first().ok_or_else(|| {
                    PrerenderError::handler_missing(&entrypoint, "api.command is empty")
                })?;
                let resolved = self.resolve_program(program).ok_or_else(|| {
                    PrerenderError::handler_missing(
                        &entrypoint,
                        format!("program {} not found", program),
                    )
                })?;
                Ok(Arc::new(CommandHandler::new(
                    resolved,
                    args.to_vec(),
                    self.root.clone(),
                )))
            }
            HandlerKind::Http => {
                let url = self.api.url.as_deref().filter(|u| !u.is_empty()).ok_or_else(|| {
                    PrerenderError::handler_missing(&entrypoint, "api.url is not set")
                })?;
                Ok(Arc::new(HttpHandler::new(url)))
            }
            HandlerKind::Fixtures => {
                let path = self.api.fixtures.as_deref().ok_or_else(|| {
                    PrerenderError::handler_missing(&entrypoint, "api.fixtures is not set")
                })?;
                let path = self.resolve_path(path);
                if !path.is_file() {
                    return Err(PrerenderError::handler_missing(
                        entrypoint,
                        format!("fixtures file {} does not exist", path.display()),
                    ));
                }
                Ok(Arc::new(FixtureHandler::from_file(&path).await?))
            }
        }
    }

    fn entrypoint(&self) -> String {
        match self.api.handler {
            HandlerKind::None => "none".to_string(),
            HandlerKind::Command => format!("command `{}`", self.api.command.join(" ")),
            HandlerKind::Http => format!("url {}", self.api.url.as_deref().unwrap_or("<unset>")),
            HandlerKind::Fixtures => format!(
                "fixtures {}",
                self.api
                    .fixtures
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unset>".to_string())
            ),
        }
    }
}
