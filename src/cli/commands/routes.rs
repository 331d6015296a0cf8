//! Routes command - list manifest routes and their concrete paths

use super::Project;
use crate::cli::args::{OutputFormat, RoutesArgs};
use crate::error::PrerenderResult;
use crate::manifest::RouteManifest;
use crate::render::RoutePattern;
use console::style;
use serde_json::json;

/// Execute the routes command
pub async fn execute(args: RoutesArgs, project: &Project) -> PrerenderResult<()> {
    let path = project.manifest_path(args.manifest.as_deref());
    let manifest = RouteManifest::load(&path).await?;
    let targets = manifest.targets()?;

    match args.format {
        OutputFormat::Plain => {
            for target in &targets {
                println!("{}", target.pathname);
            }
        }
        OutputFormat::Json => {
            let routes: Vec<_> = manifest
                .routes
                .iter()
                .map(|route| {
                    let paths: Vec<&str> = targets
                        .iter()
                        .filter(|t| t.route == route.display_name())
                        .map(|t| t.pathname.as_str())
                        .collect();
                    json!({
                        "name": route.display_name(),
                        "path": route.path,
                        "prerender": route.prerender,
                        "paths": paths,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&routes)?);
        }
        OutputFormat::Table => {
            if manifest.routes.is_empty() {
                println!("No routes in {}", path.display());
                return Ok(());
            }
            println!(
                "{:<20} {:<28} {}",
                style("ROUTE").bold(),
                style("PATTERN").bold(),
                style("PATHS").bold()
            );
            for route in &manifest.routes {
                let paths: Vec<&str> = targets
                    .iter()
                    .filter(|t| t.route == route.display_name())
                    .map(|t| t.pathname.as_str())
                    .collect();
                let kind = RoutePattern::parse(&route.path)
                    .map(|p| p.has_params())
                    .unwrap_or(false);
                let listed = if !route.prerender {
                    style("(not prerendered)".to_string()).dim()
                } else if paths.is_empty() && kind {
                    style("(no paths listed)".to_string()).yellow()
                } else {
                    style(paths.join(", "))
                };
                println!("{:<20} {:<28} {}", route.display_name(), route.path, listed);
            }
        }
    }

    Ok(())
}
