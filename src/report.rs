//! JSON run report
//!
//! Written by `prerender render --report FILE`; one record per path.

use crate::engine::RenderOutcome;
use crate::error::{PrerenderError, PrerenderResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStatus {
    Written,
    Skipped,
    Failed,
}

/// Result for one prerendered path
#[derive(Debug, Clone, Serialize)]
pub struct PathReport {
    pub path: String,
    pub route: String,
    pub output: Option<PathBuf>,
    pub status: PathStatus,
    pub passes: usize,
    pub rounds: usize,
    pub resolved: usize,
    pub abandoned: usize,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl PathReport {
    pub fn rendered(
        path: &str,
        route: &str,
        outcome: &RenderOutcome,
        output: Option<PathBuf>,
        elapsed: Duration,
    ) -> Self {
        Self {
            path: path.to_string(),
            route: route.to_string(),
            status: if output.is_some() {
                PathStatus::Written
            } else {
                PathStatus::Skipped
            },
            output,
            passes: outcome.passes,
            rounds: outcome.rounds,
            resolved: outcome.resolved,
            abandoned: outcome.abandoned,
            duration_ms: elapsed.as_millis() as u64,
            warnings: outcome.warnings.clone(),
            error: None,
        }
    }

    pub fn failed(path: &str, route: &str, error: &PrerenderError, elapsed: Duration) -> Self {
        Self {
            path: path.to_string(),
            route: route.to_string(),
            output: None,
            status: PathStatus::Failed,
            passes: 0,
            rounds: 0,
            resolved: 0,
            abandoned: 0,
            duration_ms: elapsed.as_millis() as u64,
            warnings: vec![],
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub dist_dir: PathBuf,
    pub paths: Vec<PathReport>,
}

impl RunReport {
    pub fn new(dist_dir: impl Into<PathBuf>) -> Self {
        Self {
            generated_at: Utc::now(),
            dist_dir: dist_dir.into(),
            paths: Vec::new(),
        }
    }

    pub fn push(&mut self, path: PathReport) {
        self.paths.push(path);
    }

    pub fn failed(&self) -> usize {
        self.paths
            .iter()
            .filter(|p| p.status == PathStatus::Failed)
            .count()
    }

    pub async fn write(&self, path: &Path) -> PrerenderResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PrerenderError::io(format!("creating {}", parent.display()), e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .await
            .map_err(|e| PrerenderError::io(format!("writing report {}", path.display()), e))?;
        info!("Wrote run report to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadState;
    use tempfile::TempDir;

    fn outcome() -> RenderOutcome {
        RenderOutcome {
            markup: String::new(),
            head: HeadState::new(),
            passes: 2,
            rounds: 1,
            resolved: 1,
            abandoned: 0,
            invocations: 1,
            warnings: vec![],
            complete: true,
        }
    }

    #[tokio::test]
    async fn writes_json_report() {
        let temp = TempDir::new().unwrap();
        let mut report = RunReport::new(temp.path());
        report.push(PathReport::rendered(
            "/",
            "home",
            &outcome(),
            Some(temp.path().join("index.html")),
            Duration::from_millis(12),
        ));
        report.push(PathReport::failed(
            "/posts/1",
            "post",
            &PrerenderError::User("boom".into()),
            Duration::from_millis(3),
        ));
        assert_eq!(report.failed(), 1);

        let path = temp.path().join("reports").join("run.json");
        report.write(&path).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).await.unwrap()).unwrap();
        assert!(value["generated_at"].as_str().unwrap().contains('T'));
        assert_eq!(value["paths"][0]["status"], "written");
        assert_eq!(value["paths"][0]["passes"], 2);
        assert_eq!(value["paths"][1]["status"], "failed");
        assert_eq!(value["paths"][1]["error"], "boom");
    }

    #[test]
    fn dry_run_paths_are_skipped() {
        let report = PathReport::rendered("/", "home", &outcome(), None, Duration::ZERO);
        assert_eq!(report.status, PathStatus::Skipped);
    }
}
