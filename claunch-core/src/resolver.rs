use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ConfigStore;
use crate::error::{ClaunchError, Result};
use crate::index::{ProjectDiscovery, ProjectIndex};
use crate::model::{Config, Resolution, ResolutionSource};
use crate::picker::Picker;

pub struct ProjectResolver<'a> {
    discovery: &'a dyn ProjectDiscovery,
    picker: &'a dyn Picker,
    store: &'a ConfigStore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Candidates {
    Exact(Vec<PathBuf>),
    Partial(Vec<PathBuf>),
    All(Vec<PathBuf>),
}

impl Candidates {
    fn narrow(index: &ProjectIndex, project: &str) -> Self {
        let exact = matching(index, |name| name == project);
        if !exact.is_empty() {
            return Self::Exact(exact);
        }

        let partial = matching(index, |name| name.contains(project));
        if !partial.is_empty() {
            return Self::Partial(partial);
        }

        Self::All(index.paths().map(Path::to_path_buf).collect())
    }

    fn tier(&self) -> &'static str {
        match self {
            Self::Exact(_) => "exact",
            Self::Partial(_) => "partial",
            Self::All(_) => "all",
        }
    }

    fn into_paths(self) -> Vec<PathBuf> {
        match self {
            Self::Exact(paths) | Self::Partial(paths) | Self::All(paths) => paths,
        }
    }
}

// Index paths iterate in sorted order, so every tier comes out sorted.
fn matching(index: &ProjectIndex, predicate: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    index
        .paths()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(&predicate)
        })
        .map(Path::to_path_buf)
        .collect()
}

impl<'a> ProjectResolver<'a> {
    pub fn new(
        discovery: &'a dyn ProjectDiscovery,
        picker: &'a dyn Picker,
        store: &'a ConfigStore,
    ) -> Self {
        Self {
            discovery,
            picker,
            store,
        }
    }

    pub fn resolve(&self, project: &str, config: Option<&Config>) -> Result<Resolution> {
        if let Some(directory) = config.and_then(|config| config.projects.get(project)) {
            debug!(project, directory, "project found in config");
            return Ok(Resolution {
                directory: PathBuf::from(directory),
                source: ResolutionSource::Config,
                updated_config: None,
            });
        }

        let index = self.discovery.discover();
        if index.is_empty() {
            return Err(ClaunchError::UnresolvedProject {
                project: project.to_string(),
                root: self.discovery.root().to_path_buf(),
            });
        }

        let candidates = Candidates::narrow(&index, project);
        debug!(
            project,
            tier = candidates.tier(),
            indexed = index.len(),
            "narrowed project candidates"
        );

        let (directory, source) = match candidates {
            Candidates::Exact(mut paths) if paths.len() == 1 => {
                (paths.remove(0), ResolutionSource::AutoSelected)
            }
            candidates => (self.pick(project, candidates.into_paths())?, ResolutionSource::Picked),
        };

        let mut updated = config.cloned().unwrap_or_default();
        updated
            .projects
            .insert(project.to_string(), directory.to_string_lossy().into_owned());
        self.store.save(&updated)?;
        info!(
            project,
            directory = %directory.display(),
            config = %self.store.path().display(),
            "saved project mapping"
        );

        Ok(Resolution {
            directory,
            source,
            updated_config: Some(updated),
        })
    }

    fn pick(&self, project: &str, candidates: Vec<PathBuf>) -> Result<PathBuf> {
        let options = candidates
            .iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        let prompt = format!("Select directory for project \"{project}\":");

        let cancelled = || ClaunchError::SelectionCancelled {
            project: project.to_string(),
        };
        let chosen = self.picker.choose(&prompt, &options).ok_or_else(cancelled)?;
        let index = options
            .iter()
            .position(|option| *option == chosen)
            .ok_or_else(|| {
                debug!(chosen, "picker returned a value outside the candidate list");
                cancelled()
            })?;
        Ok(candidates[index].clone())
    }
}
