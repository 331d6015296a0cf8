//! CLI command implementations

pub mod config;
pub mod init;
pub mod render;
pub mod routes;

pub use config::execute as config;
pub use init::execute as init;
pub use render::execute as render;
pub use routes::execute as routes;

use crate::config::Config;
use std::path::{Path, PathBuf};

/// Loaded configuration plus the directory relative paths resolve against
#[derive(Debug, Clone)]
pub struct Project {
    pub config: Config,
    pub root: PathBuf,
}

impl Project {
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn dist_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        self.resolve(cli_override.unwrap_or(self.config.build.dist_dir.as_path()))
    }

    pub fn manifest_path(&self, cli_override: Option<&Path>) -> PathBuf {
        self.resolve(cli_override.unwrap_or(self.config.build.manifest.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_root() {
        let project = Project::new(Config::default(), "/app");
        assert_eq!(project.dist_dir(None), PathBuf::from("/app/web/dist"));
        assert_eq!(
            project.dist_dir(Some(Path::new("/tmp/out"))),
            PathBuf::from("/tmp/out")
        );
        assert_eq!(
            project.manifest_path(None),
            PathBuf::from("/app/prerender.routes.json")
        );
    }
}
