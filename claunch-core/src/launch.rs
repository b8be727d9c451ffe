use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::Builder;
use tracing::{debug, info};

use crate::error::{ClaunchError, Result};
use crate::model::{ResolvedRequest, TerminalKind};

const ITERM_SCRIPT: &str = r#"on run argv
  tell application "iTerm2" to create window with default profile command (item 1 of argv)
end run"#;

const TERMINAL_SCRIPT: &str = r#"on run argv
  tell application "Terminal" to do script (item 1 of argv)
end run"#;

const GHOSTTY_WINDOW_ARGS: &[&str] = &[
    "--fullscreen=true",
    "--macos-non-native-fullscreen=visible-menu",
];

pub trait Launcher {
    fn launch(&self, terminal: Option<TerminalKind>, request: &ResolvedRequest) -> Result<()>;
}

pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

pub fn launch_command(prompt: &str) -> String {
    format!("claude {}", shell_quote(prompt))
}

pub fn render_launch_script(directory: Option<&Path>, command: &str) -> String {
    let mut script = String::from("#!/bin/bash\n");
    if let Some(directory) = directory {
        script.push_str(&format!(
            "cd {}\n",
            shell_quote(&directory.to_string_lossy())
        ));
    }
    script.push_str(&format!("exec {command}\n"));
    script
}

// The terminal runs the script after we exit, so it is kept rather than cleaned up.
pub fn write_launch_script(directory: Option<&Path>, command: &str) -> Result<PathBuf> {
    let mut temp = Builder::new()
        .prefix("claunch_")
        .suffix(".sh")
        .tempfile()
        .map_err(|source| ClaunchError::Io {
            path: env::temp_dir(),
            source,
        })?;
    let path = temp.path().to_path_buf();
    let io_err = |source| ClaunchError::Io {
        path: path.clone(),
        source,
    };

    temp.as_file_mut()
        .write_all(render_launch_script(directory, command).as_bytes())
        .map_err(io_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).map_err(io_err)?;
    }

    temp.into_temp_path()
        .keep()
        .map_err(|err| io_err(err.error))
}

#[derive(Debug, Clone)]
pub struct SystemLauncher {
    ghostty_bin: String,
    osascript_bin: String,
    open_bin: String,
    applications_dir: PathBuf,
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self {
            ghostty_bin: "ghostty".to_string(),
            osascript_bin: "osascript".to_string(),
            open_bin: "open".to_string(),
            applications_dir: PathBuf::from("/Applications"),
        }
    }
}

impl SystemLauncher {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str, default: String| {
            env::var(key)
                .ok()
                .filter(|value| !value.is_empty())
                .unwrap_or(default)
        };

        Self {
            ghostty_bin: var("CLAUNCH_GHOSTTY_BIN", defaults.ghostty_bin),
            osascript_bin: var("CLAUNCH_OSASCRIPT_BIN", defaults.osascript_bin),
            open_bin: var("CLAUNCH_OPEN_BIN", defaults.open_bin),
            applications_dir: env::var_os("CLAUNCH_APPLICATIONS_DIR")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.applications_dir),
        }
    }

    pub fn detect_terminal(&self) -> TerminalKind {
        let bundled_ghostty = self
            .applications_dir
            .join("Ghostty.app/Contents/MacOS/ghostty");
        if find_executable(&self.ghostty_bin).is_some()
            || bundled_ghostty.is_file()
            || self.applications_dir.join("Ghostty.app").is_dir()
        {
            TerminalKind::Ghostty
        } else if self.applications_dir.join("iTerm.app").is_dir() {
            TerminalKind::Iterm
        } else {
            TerminalKind::Terminal
        }
    }

    fn launch_ghostty(&self, script: &Path) -> Result<bool> {
        let command_arg = format!("--command={}", script.display());
        let status = Command::new(&self.ghostty_bin)
            .arg("+new-window")
            .arg(&command_arg)
            .args(GHOSTTY_WINDOW_ARGS)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => return Ok(true),
            Ok(status) => debug!(code = ?status.code(), "ghostty +new-window failed"),
            Err(err) => debug!(bin = %self.ghostty_bin, "ghostty cli unavailable: {err}"),
        }

        if !self.applications_dir.join("Ghostty.app").is_dir() {
            return Ok(false);
        }

        // The app is left running on its own; nothing to wait for.
        Command::new(&self.open_bin)
            .args(["-na", "Ghostty.app", "--args"])
            .arg(&command_arg)
            .args(GHOSTTY_WINDOW_ARGS)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ClaunchError::Io {
                path: PathBuf::from(&self.open_bin),
                source,
            })?;
        Ok(true)
    }

    fn launch_iterm(&self, script: &Path) -> Result<bool> {
        if !self.applications_dir.join("iTerm.app").is_dir() {
            return Ok(false);
        }
        self.run_osascript(ITERM_SCRIPT, &script.to_string_lossy())?;
        Ok(true)
    }

    fn launch_terminal_app(&self, directory: Option<&Path>, command: &str) -> Result<()> {
        let command = match directory {
            Some(directory) => format!(
                "cd {} && {command}",
                shell_quote(&directory.to_string_lossy())
            ),
            None => command.to_string(),
        };
        self.run_osascript(TERMINAL_SCRIPT, &command)
    }

    fn run_osascript(&self, script: &str, argument: &str) -> Result<()> {
        let status = Command::new(&self.osascript_bin)
            .arg("-e")
            .arg(script)
            .arg("--")
            .arg(argument)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    ClaunchError::TerminalUnavailable(format!(
                        "command not found: {}",
                        self.osascript_bin
                    ))
                } else {
                    ClaunchError::Io {
                        path: PathBuf::from(&self.osascript_bin),
                        source,
                    }
                }
            })?;
        if !status.success() {
            return Err(ClaunchError::TerminalUnavailable(format!(
                "{} exited with code {:?}",
                self.osascript_bin,
                status.code()
            )));
        }
        Ok(())
    }
}

impl Launcher for SystemLauncher {
    fn launch(&self, terminal: Option<TerminalKind>, request: &ResolvedRequest) -> Result<()> {
        let directory = request.directory.as_deref();
        let command = launch_command(&request.prompt);
        let script = write_launch_script(directory, &command)?;
        debug!(script = %script.display(), ?terminal, "wrote launch script");

        match terminal {
            Some(TerminalKind::Ghostty) => {
                if !self.launch_ghostty(&script)? {
                    return Err(ClaunchError::TerminalUnavailable(
                        "ghostty is configured but not available".to_string(),
                    ));
                }
            }
            Some(TerminalKind::Iterm) => {
                if !self.launch_iterm(&script)? {
                    return Err(ClaunchError::TerminalUnavailable(
                        "iterm is configured but iTerm.app not found".to_string(),
                    ));
                }
            }
            Some(TerminalKind::Terminal) => self.launch_terminal_app(directory, &command)?,
            None => {
                if !self.launch_ghostty(&script)? {
                    self.launch_terminal_app(directory, &command)?;
                }
            }
        }

        info!(
            directory = ?request.directory,
            terminal = ?terminal,
            "launched claude session"
        );
        Ok(())
    }
}

fn find_executable(name: &str) -> Option<PathBuf> {
    if name.contains('/') {
        let path = PathBuf::from(name);
        return path.is_file().then_some(path);
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
