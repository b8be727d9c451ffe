use std::env;
use std::path::PathBuf;

use dirs::home_dir;

use crate::error::{ClaunchError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaunchPaths {
    pub config_path: PathBuf,
    pub projects_root: PathBuf,
}

impl ClaunchPaths {
    pub fn from_env_or_home() -> Result<Self> {
        let home = home_dir().ok_or(ClaunchError::HomeDirectoryNotFound)?;

        // Precedence:
        // 1) CLAUNCH_CONFIG
        // 2) ~/.config/claunch/config.json
        let config_path = env::var_os("CLAUNCH_CONFIG")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".config/claunch/config.json"));

        // Precedence:
        // 1) CLAUDE_CONFIG_DIR/projects (official Claude Code config/data root env)
        // 2) ~/.claude/projects (Claude default)
        let projects_root = env::var_os("CLAUDE_CONFIG_DIR")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".claude"))
            .join("projects");

        Ok(Self {
            config_path,
            projects_root,
        })
    }
}
