use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::Builder;
use tracing::warn;

use crate::error::{ClaunchError, Result};
use crate::model::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Option<Config> {
        match self.try_load() {
            Ok(config) => config,
            Err(err) => {
                warn!("{err}, ignoring config");
                None
            }
        }
    }

    pub fn try_load(&self) -> Result<Option<Config>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(source)
                if matches!(
                    source.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::IsADirectory
                ) =>
            {
                return Ok(None);
            }
            Err(source) => return Err(self.corrupt(format!("failed to read config: {source}"))),
        };

        parse_config(&content).map(Some).map_err(|reason| self.corrupt(reason))
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        self.save_with(config, write_pretty)
    }

    // On a failed write the temp file is removed and the destination is untouched.
    pub fn save_with<F>(&self, config: &Config, write: F) -> Result<()>
    where
        F: FnOnce(&mut dyn Write, &Config) -> io::Result<()>,
    {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| ClaunchError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut temp = Builder::new()
            .prefix(".config")
            .suffix(".json")
            .tempfile_in(dir)
            .map_err(|source| ClaunchError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        let out: &mut dyn Write = temp.as_file_mut();
        let written = write(out, config).and_then(|()| temp.as_file().sync_all());
        if let Err(source) = written {
            return Err(ClaunchError::Io {
                path: temp.path().to_path_buf(),
                source,
            });
        }

        temp.persist(&self.path)
            .map_err(|err| ClaunchError::Io {
                path: self.path.clone(),
                source: err.error,
            })?;
        Ok(())
    }

    pub fn create_new(&self, config: &Config) -> Result<()> {
        if self.path.exists() {
            return Err(ClaunchError::ConfigExists {
                path: self.path.clone(),
            });
        }
        self.save(config)
    }

    fn corrupt(&self, reason: String) -> ClaunchError {
        ClaunchError::ConfigCorrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

fn write_pretty(out: &mut dyn Write, config: &Config) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, config).map_err(io::Error::from)?;
    out.write_all(b"\n")?;
    out.flush()
}

fn parse_config(content: &str) -> std::result::Result<Config, String> {
    let value = serde_json::from_str::<Value>(content)
        .map_err(|err| format!("failed to parse config: {err}"))?;
    if !value.is_object() {
        return Err("config must be a JSON object".to_string());
    }

    let config = serde_json::from_value::<Config>(value)
        .map_err(|err| format!("config does not match schema: {err}"))?;
    if let Some((name, _)) = config.projects.iter().find(|(_, dir)| dir.is_empty()) {
        return Err(format!("project {name:?} maps to an empty directory"));
    }

    Ok(config)
}
