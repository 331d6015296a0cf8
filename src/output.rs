//! Writing prerendered documents into the dist directory

use crate::config::schema::BuildConfig;
use crate::error::{PrerenderError, PrerenderResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Output file for a pathname
///
/// `/` maps to `index.html`, `/about` to `about.html` and `/blog/` to
/// `blog/index.html`.
pub fn output_path(dist_dir: &Path, pathname: &str) -> PrerenderResult<PathBuf> {
    let path = pathname.split(['?', '#']).next().unwrap_or_default();
    let invalid = |reason: &str| PrerenderError::PathInvalid {
        path: PathBuf::from(pathname),
        reason: reason.to_string(),
    };

    if !path.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == ".." || *s == "." || s.contains('\\')) {
        return Err(invalid("must not contain relative segments"));
    }

    let mut out = dist_dir.to_path_buf();
    match segments.split_last() {
        None => out.push("index.html"),
        Some((_, _)) if path.ends_with('/') => {
            out.extend(&segments);
            out.push("index.html");
        }
        Some((last, parents)) => {
            out.extend(parents);
            if last.ends_with(".html") {
                out.push(last);
            } else {
                out.push(format!("{}.html", last));
            }
        }
    }
    Ok(out)
}

/// Copy `index.html` to the snapshot name unless the snapshot exists
///
/// Returns true when a copy was made.
pub async fn preserve_root_snapshot(dist_dir: &Path, build: &BuildConfig) -> PrerenderResult<bool> {
    let snapshot = dist_dir.join(&build.snapshot);
    let template = dist_dir.join(&build.template);

    if snapshot.exists() || !template.is_file() {
        return Ok(false);
    }

    fs::copy(&template, &snapshot).await.map_err(|e| {
        PrerenderError::io(
            format!("copying {} to {}", template.display(), snapshot.display()),
            e,
        )
    })?;
    info!("Saved unprerendered template as {}", snapshot.display());
    Ok(true)
}

/// Write a document, creating parent directories
pub async fn write_document(path: &Path, html: &str) -> PrerenderResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| PrerenderError::io(format!("creating {}", parent.display()), e))?;
    }
    fs::write(path, html)
        .await
        .map_err(|e| PrerenderError::io(format!("writing {}", path.display()), e))?;
    debug!("Wrote {} bytes to {}", html.len(), path.display());
    Ok(())
}
