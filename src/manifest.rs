//! Route manifest
//!
//! A JSON file listing the routes to prerender:
//!
//! ```json
//! { "routes": [ { "name": "post", "path": "/posts/{id:Int}",
//!                 "paths": ["/posts/1"], "page": { "type": "text", "value": "…" } } ] }
//! ```

use crate::error::{PrerenderError, PrerenderResult};
use crate::render::{PageNode, RoutePattern, RoutedPage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

fn default_true() -> bool {
    true
}

/// One route of the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    #[serde(default)]
    pub name: Option<String>,

    /// Route pattern such as `/posts/{id:Int}`
    pub path: String,

    /// Concrete paths to prerender; defaults to `path` for static routes
    #[serde(default)]
    pub paths: Vec<String>,

    #[serde(default = "default_true")]
    pub prerender: bool,

    pub page: PageNode,
}

impl RouteEntry {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.path)
    }
}

/// One concrete path to prerender
#[derive(Clone)]
pub struct RenderTarget {
    pub route: String,
    pub pathname: String,
    pub page: Arc<RoutedPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteManifest {
    pub routes: Vec<RouteEntry>,
}

impl RouteManifest {
    pub async fn load(path: &Path) -> PrerenderResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PrerenderError::io(format!("reading route manifest {}", path.display()), e))?;
        Self::parse(&content, path)
    }

    /// Parse and validate manifest JSON; `path` is used for error messages
    pub fn parse(content: &str, path: &Path) -> PrerenderResult<Self> {
        let invalid = |reason: String| PrerenderError::ManifestInvalid {
            path: PathBuf::from(path),
            reason,
        };

        let manifest: Self = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;

        for route in &manifest.routes {
            let pattern = RoutePattern::parse(&route.path).map_err(|e| invalid(e.to_string()))?;
            if let Some(bad) = route.paths.iter().find(|p| pattern.matches(p).is_none()) {
                return Err(invalid(format!(
                    "path {} does not match route {}",
                    bad, route.path
                )));
            }
        }

        debug!("Loaded {} routes from {}", manifest.routes.len(), path.display());
        Ok(manifest)
    }

    /// Expand routes into concrete paths, skipping non-prerendered routes
    pub fn targets(&self) -> PrerenderResult<Vec<RenderTarget>> {
        let mut targets = Vec::new();
        for route in &self.routes {
            if !route.prerender {
                debug!("Skipping route {} (prerender = false)", route.display_name());
                continue;
            }

            let pattern = RoutePattern::parse(&route.path)?;
            let paths = if !route.paths.is_empty() {
                route.paths.clone()
            } else if !pattern.has_params() {
                vec![route.path.clone()]
            } else {
                warn!(
                    "Skipping route {}: {} has params but no paths listed",
                    route.display_name(),
                    route.path
                );
                continue;
            };

            let page = Arc::new(RoutedPage::new(pattern, route.page.clone()));
            targets.extend(paths.into_iter().map(|pathname| RenderTarget {
                route: route.display_name().to_string(),
                pathname,
                page: Arc::clone(&page),
            }));
        }
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> PrerenderResult<RouteManifest> {
        RouteManifest::parse(&value.to_string(), Path::new("routes.json"))
    }

    #[test]
    fn expands_targets() {
        let manifest = parse(json!({"routes": [
            {"name": "home", "path": "/", "page": {"type": "text", "value": "home"}},
            {"path": "/posts/{id:Int}", "paths": ["/posts/1", "/posts/2"],
             "page": {"type": "text", "value": "{{ params.id }}"}},
            {"path": "/users/{id}", "page": {"type": "text", "value": "user"}},
            {"path": "/admin", "prerender": false, "page": {"type": "text", "value": "admin"}}
        ]}))
        .unwrap();

        let targets = manifest.targets().unwrap();
        let paths: Vec<&str> = targets.iter().map(|t| t.pathname.as_str()).collect();
        assert_eq!(paths, vec!["/", "/posts/1", "/posts/2"]);
        assert_eq!(targets[0].route, "home");
        assert_eq!(targets[1].route, "/posts/{id:Int}");
    }

    #[test]
    fn rejects_paths_not_matching_route() {
        let err = parse(json!({"routes": [
            {"path": "/posts/{id:Int}", "paths": ["/posts/abc"], "page": {"type": "raw", "html": ""}}
        ]}))
        .unwrap_err();
        assert!(matches!(err, PrerenderError::ManifestInvalid { .. }));
        assert!(err.to_string().contains("/posts/abc"));
    }

    #[test]
    fn rejects_bad_json_and_patterns() {
        assert!(RouteManifest::parse("{", Path::new("r.json")).is_err());
        assert!(parse(json!({"routes": [
            {"path": "no-slash", "page": {"type": "raw", "html": ""}}
        ]}))
        .is_err());
    }

    #[tokio::test]
    async fn load_reads_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("prerender.routes.json");
        fs::write(&path, r#"{"routes": []}"#).await.unwrap();
        assert!(RouteManifest::load(&path).await.unwrap().routes.is_empty());
    }
}
