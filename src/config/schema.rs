//! Configuration schema for prerender
//!
//! Global configuration lives at `~/.config/prerender/config.toml`; a
//! project-local `prerender.toml` is merged on top of it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build output and template settings
    pub build: BuildConfig,

    /// GraphQL handler settings
    pub api: ApiConfig,

    /// Render loop settings
    pub render: RenderConfig,
}

/// Build output and template settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding the built web side
    pub dist_dir: PathBuf,

    /// Base template file inside `dist_dir`
    pub template: String,

    /// Unprerendered copy of the template, preferred when present
    pub snapshot: String,

    /// Element in the template body replaced with rendered markup
    pub marker: String,

    /// Route manifest listing the pages to prerender
    pub manifest: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dist_dir: PathBuf::from("web/dist"),
            template: "index.html".to_string(),
            snapshot: "200.html".to_string(),
            marker: "<server-markup></server-markup>".to_string(),
            manifest: PathBuf::from("prerender.routes.json"),
        }
    }
}

/// Kind of GraphQL entrypoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// No entrypoint; every query renders as loading
    #[default]
    None,
    /// External program speaking the event protocol on stdin/stdout
    Command,
    /// Running GraphQL endpoint
    Http,
    /// Canned responses keyed by operation name
    Fixtures,
}

/// GraphQL handler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Entrypoint kind
    pub handler: HandlerKind,

    /// Program and arguments for `handler = "command"`
    pub command: Vec<String>,

    /// Endpoint for `handler = "http"`
    pub url: Option<String>,

    /// Fixtures file for `handler = "fixtures"`
    pub fixtures: Option<PathBuf>,

    /// Function name reported in the invocation context
    pub function_name: String,

    /// Time budget reported to the handler, in milliseconds
    pub remaining_time_ms: u64,

    /// Extra request headers
    pub headers: BTreeMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            handler: HandlerKind::None,
            command: vec![],
            url: None,
            fixtures: None,
            function_name: "graphql".to_string(),
            remaining_time_ms: 10_000,
            headers: BTreeMap::new(),
        }
    }
}

/// Behavior when the render loop hits `max_passes`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassLimitPolicy {
    /// Abort the path with an error
    #[default]
    Fail,
    /// Keep the last render, with unresolved queries still loading
    Partial,
}

/// Render loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Upper bound on render passes per path (0 = unbounded)
    pub max_passes: usize,

    /// What to do when the bound is hit
    pub on_pass_limit: PassLimitPolicy,

    /// Values exposed to pages as `env.*`
    pub vars: BTreeMap<String, String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_passes: 50,
            on_pass_limit: PassLimitPolicy::Fail,
            vars: BTreeMap::new(),
        }
    }
}
