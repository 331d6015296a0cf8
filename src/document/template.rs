//! Loading the built HTML template

use crate::config::schema::BuildConfig;
use crate::error::{PrerenderError, PrerenderResult};
use crate::render::HeadState;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// HTML shell the rendered markup is spliced into
#[derive(Debug, Clone)]
pub struct DocumentTemplate {
    path: PathBuf,
    html: String,
}

impl DocumentTemplate {
    pub fn new(path: impl Into<PathBuf>, html: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            html: html.into(),
        }
    }

    /// Load the snapshot if present, else the plain template
    ///
    /// The snapshot is a copy of the template taken before any output was
    /// written, so reruns never start from an already-prerendered page.
    pub async fn load(dist_dir: &Path, build: &BuildConfig) -> PrerenderResult<Self> {
        for name in [&build.snapshot, &build.template] {
            let path = dist_dir.join(name);
            if !path.is_file() {
                continue;
            }
            debug!("Using template {}", path.display());
            let html = fs::read_to_string(&path)
                .await
                .map_err(|e| PrerenderError::io(format!("reading {}", path.display()), e))?;
            return Ok(Self::new(path, html));
        }

        Err(PrerenderError::TemplateNotFound(dist_dir.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn compose(&self, markup: &str, head: &HeadState, marker: &str) -> PrerenderResult<String> {
        super::compose(&self.html, markup, head, marker)
    }
}
