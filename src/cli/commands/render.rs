//! Render command - prerender manifest routes into the dist directory

use super::Project;
use crate::cli::args::RenderArgs;
use crate::document::DocumentTemplate;
use crate::engine::{PrerenderEngine, RenderOutcome};
use crate::error::{PrerenderError, PrerenderResult};
use crate::manifest::{RenderTarget, RouteManifest};
use crate::output::{output_path, preserve_root_snapshot, write_document};
use crate::render::Location;
use crate::report::{PathReport, RunReport};
use crate::ui::{self, TaskSpinner, UiContext};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Execute the render command
pub async fn execute(args: RenderArgs, project: &Project) -> PrerenderResult<()> {
    let ctx = UiContext::detect();
    let config = &project.config;
    let dist = project.dist_dir(args.dist.as_deref());
    let manifest_path = project.manifest_path(args.manifest.as_deref());

    let manifest = RouteManifest::load(&manifest_path).await?;
    let targets = select_targets(manifest.targets()?, &args.routes)?;

    if !args.dry_run && preserve_root_snapshot(&dist, &config.build).await? {
        debug!("Snapshot of {} taken before first write", config.build.template);
    }
    let template = DocumentTemplate::load(&dist, &config.build).await?;
    let engine = PrerenderEngine::from_config(config, &project.root);

    ui::intro(&ctx, "prerender");
    ui::section(
        &ctx,
        &format!(
            "Prerendering {} paths into {}",
            targets.len(),
            dist.display()
        ),
    );

    let mut report = RunReport::new(&dist);
    for target in &targets {
        let started = Instant::now();
        let spinner = TaskSpinner::new(&ctx);
        spinner.start(&target.pathname);

        let result = render_target(&engine, &template, target, &dist, args.dry_run, project).await;
        spinner.clear();

        match result {
            Ok((outcome, output)) => {
                for warning in &outcome.warnings {
                    ui::step_warn(&ctx, warning);
                }
                match &output {
                    Some(path) => ui::step_ok_detail(
                        &ctx,
                        &target.pathname,
                        &format!("{} passes, {}", outcome.passes, display_relative(path, &dist)),
                    ),
                    None => ui::step_skip(&ctx, &target.pathname, "dry run"),
                }
                report.push(PathReport::rendered(
                    &target.pathname,
                    &target.route,
                    &outcome,
                    output,
                    started.elapsed(),
                ));
            }
            Err(e) => {
                let detail = match e.operation() {
                    Some(operation) => format!("{} ({})", e, operation),
                    None => e.to_string(),
                };
                ui::step_error_hint(&ctx, &target.pathname, &detail, e.hint());
                report.push(PathReport::failed(
                    &target.pathname,
                    &target.route,
                    &e,
                    started.elapsed(),
                ));
            }
        }
    }

    if let Some(path) = &args.report {
        report.write(&project.resolve(path)).await?;
    }

    let failed = report.failed();
    info!("Prerendered {} of {} paths", targets.len() - failed, targets.len());
    if failed > 0 {
        return Err(PrerenderError::PrerenderFailed {
            failed,
            total: targets.len(),
        });
    }
    ui::outro_success(&ctx, &format!("Prerendered {} paths", targets.len()));
    Ok(())
}

/// Render, compose and write one path; failures never produce a file
async fn render_target(
    engine: &PrerenderEngine,
    template: &DocumentTemplate,
    target: &RenderTarget,
    dist: &Path,
    dry_run: bool,
    project: &Project,
) -> PrerenderResult<(RenderOutcome, Option<PathBuf>)> {
    let out = output_path(dist, &target.pathname)?;
    let location = Location::new(target.pathname.as_str());
    let outcome = engine.render(target.page.as_ref(), &location).await?;
    let html = template.compose(&outcome.markup, &outcome.head, &project.config.build.marker)?;

    if dry_run {
        return Ok((outcome, None));
    }
    write_document(&out, &html).await?;
    Ok((outcome, Some(out)))
}

fn select_targets(
    targets: Vec<RenderTarget>,
    only: &[String],
) -> PrerenderResult<Vec<RenderTarget>> {
    if only.is_empty() {
        return Ok(targets);
    }

    if let Some(unknown) = only
        .iter()
        .find(|path| !targets.iter().any(|t| &t.pathname == *path))
    {
        return Err(PrerenderError::User(format!(
            "Path {} is not listed in the route manifest",
            unknown
        )));
    }
    Ok(targets
        .into_iter()
        .filter(|t| only.contains(&t.pathname))
        .collect())
}

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}
