use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::decode;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectIndex {
    entries: BTreeMap<PathBuf, String>,
}

impl ProjectIndex {
    pub fn build(projects_root: &Path) -> Self {
        Self::build_under(projects_root, Path::new("/"))
    }

    pub fn build_under(projects_root: &Path, fs_root: &Path) -> Self {
        let mut entries = BTreeMap::new();
        if !projects_root.is_dir() {
            debug!(root = %projects_root.display(), "projects root missing");
            return Self { entries };
        }

        let children = WalkDir::new(projects_root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.path().is_dir());

        for child in children {
            let Some(name) = child.file_name().to_str() else {
                continue;
            };
            for path in decode::decode_under(fs_root, name) {
                entries.insert(path, name.to_string());
            }
        }

        debug!(
            root = %projects_root.display(),
            count = entries.len(),
            "indexed claude projects"
        );
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    pub fn encoded_name(&self, path: &Path) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }
}

impl FromIterator<(PathBuf, String)> for ProjectIndex {
    fn from_iter<I: IntoIterator<Item = (PathBuf, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

pub trait ProjectDiscovery {
    fn root(&self) -> &Path;
    fn discover(&self) -> ProjectIndex;
}

#[derive(Debug, Clone)]
pub struct FsDiscovery {
    projects_root: PathBuf,
    fs_root: PathBuf,
}

impl FsDiscovery {
    pub fn new(projects_root: impl Into<PathBuf>) -> Self {
        Self {
            projects_root: projects_root.into(),
            fs_root: PathBuf::from("/"),
        }
    }

    pub fn with_fs_root(mut self, fs_root: impl Into<PathBuf>) -> Self {
        self.fs_root = fs_root.into();
        self
    }
}

impl ProjectDiscovery for FsDiscovery {
    fn root(&self) -> &Path {
        &self.projects_root
    }

    fn discover(&self) -> ProjectIndex {
        ProjectIndex::build_under(&self.projects_root, &self.fs_root)
    }
}
