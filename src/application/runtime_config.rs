use std::path::PathBuf;

use crate::cli::Cli;
use crate::interpreter::SessionInfo;

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub vfs_path: Option<PathBuf>,
    pub script_path: Option<PathBuf>,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            vfs_path: cli.vfs,
            script_path: cli.script,
        }
    }
}

impl From<&RuntimeConfig> for SessionInfo {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            vfs_path: config.vfs_path.clone(),
            script_path: config.script_path.clone(),
        }
    }
}
