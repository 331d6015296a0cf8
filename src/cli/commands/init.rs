//! Init command - create project-local prerender.toml

use crate::cli::args::InitArgs;
use crate::config::LOCAL_CONFIG_FILE;
use crate::error::{PrerenderError, PrerenderResult};
use crate::ui::{self, UiContext};
use std::path::Path;
use tokio::fs;

/// Template for project-local config
const INIT_TEMPLATE: &str = r#"# Prerender project configuration
# Settings here override your global config (~/.config/prerender/config.toml)

[build]
# dist_dir = "web/dist"
# template = "index.html"
# snapshot = "200.html"                        # unprerendered copy, kept for reruns
# marker = "<server-markup></server-markup>"
# manifest = "prerender.routes.json"

[api]
# handler = "command"                          # none, command, http, fixtures
# command = ["node", "api/dist/functions/graphql.js"]
# url = "http://localhost:8911/graphql"
# fixtures = "prerender.fixtures.json"
# function_name = "graphql"
# remaining_time_ms = 10000

# [api.headers]
# authorization = "Bearer ..."

[render]
# max_passes = 50                              # 0 = unbounded
# on_pass_limit = "fail"                       # fail, partial

# [render.vars]
# site_name = "My Site"
"#;

/// Execute the init command
pub async fn execute(args: InitArgs) -> PrerenderResult<()> {
    let ctx = UiContext::detect();

    let target_dir = match args.path {
        Some(ref p) => p.clone(),
        None => std::env::current_dir()
            .map_err(|e| PrerenderError::io("getting current directory", e))?,
    };

    let config_path = target_dir.join(LOCAL_CONFIG_FILE);

    if config_path.exists() && !args.force {
        return Err(PrerenderError::User(format!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        )));
    }

    ensure_dir(&target_dir).await?;

    fs::write(&config_path, INIT_TEMPLATE)
        .await
        .map_err(|e| PrerenderError::io(format!("writing {}", config_path.display()), e))?;

    ui::step_ok_detail(
        &ctx,
        "Created project config",
        &config_path.display().to_string(),
    );

    Ok(())
}

async fn ensure_dir(dir: &Path) -> PrerenderResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| PrerenderError::io(format!("creating directory {}", dir.display()), e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[tokio::test]
    async fn init_creates_config() {
        let temp = TempDir::new().unwrap();
        let args = InitArgs {
            force: false,
            path: Some(temp.path().to_path_buf()),
        };
        execute(args).await.unwrap();

        let content = std::fs::read_to_string(temp.path().join(LOCAL_CONFIG_FILE)).unwrap();
        assert!(content.contains("[build]"));
        assert!(content.contains("[api]"));
        assert!(content.contains("[render]"));
    }

    #[tokio::test]
    async fn init_refuses_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(LOCAL_CONFIG_FILE), "existing").unwrap();

        let args = InitArgs {
            force: false,
            path: Some(temp.path().to_path_buf()),
        };
        let err = execute(args).await.unwrap_err().to_string();
        assert!(err.contains("already exists"));
    }

    #[tokio::test]
    async fn init_overwrites_with_force() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(LOCAL_CONFIG_FILE), "old content").unwrap();

        let args = InitArgs {
            force: true,
            path: Some(temp.path().to_path_buf()),
        };
        execute(args).await.unwrap();

        let content = std::fs::read_to_string(temp.path().join(LOCAL_CONFIG_FILE)).unwrap();
        assert!(content.contains("[build]"));
    }

    #[test]
    fn template_parses_to_default_config() {
        let config: Config = toml::from_str(INIT_TEMPLATE).unwrap();
        assert_eq!(config.render.max_passes, 50);
    }
}
