//! Config command - show configuration

use super::Project;
use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::ConfigManager;
use crate::error::PrerenderResult;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    project: &Project,
    manager: &ConfigManager,
) -> PrerenderResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => {
            println!("{}", toml::to_string_pretty(&project.config)?);
        }
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[tokio::test]
    async fn show_and_path_succeed() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));
        let project = Project::new(Config::default(), temp.path());

        for action in [None, Some(ConfigAction::Show), Some(ConfigAction::Path)] {
            execute(ConfigArgs { action }, &project, &manager).await.unwrap();
        }
    }
}
