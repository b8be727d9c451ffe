use tracing::debug;

use crate::error::{ClaunchError, Result};
use crate::model::{Config, ResolvedRequest};
use crate::request::ClaunchUrl;
use crate::resolver::ProjectResolver;

// Configured or picked directories may have been removed since they were recorded.
pub fn resolve_request(
    request: &ClaunchUrl,
    config: Option<&Config>,
    resolver: &ProjectResolver<'_>,
) -> Result<ResolvedRequest> {
    let (directory, updated_config) = match (&request.project, &request.directory) {
        (Some(project), _) => {
            let resolution = resolver.resolve(project, config)?;
            debug!(
                project,
                source = %resolution.source,
                directory = %resolution.directory.display(),
                "resolved project"
            );
            (Some(resolution.directory), resolution.updated_config)
        }
        (None, Some(directory)) => (Some(directory.clone()), None),
        (None, None) => (None, None),
    };

    if let Some(path) = directory.as_deref()
        && !path.is_dir()
    {
        return Err(ClaunchError::DirectoryVanished {
            path: path.to_path_buf(),
        });
    }

    Ok(ResolvedRequest {
        prompt: request.prompt.clone(),
        directory,
        version: request.version,
        updated_config,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::tempdir;

    use super::resolve_request;
    use crate::config::ConfigStore;
    use crate::index::FsDiscovery;
    use crate::model::Config;
    use crate::picker::Picker;
    use crate::request::{ClaunchUrl, ProtocolMode};
    use crate::resolver::ProjectResolver;

    struct NeverPicker;

    impl Picker for NeverPicker {
        fn choose(&self, _prompt: &str, _options: &[String]) -> Option<String> {
            panic!("picker must not be invoked");
        }
    }

    #[test]
    fn request_without_project_keeps_directory_absent() {
        let temp = tempdir().expect("tempdir");
        let store = ConfigStore::new(temp.path().join("config.json"));
        let discovery = FsDiscovery::new(temp.path().join("projects"));
        let resolver = ProjectResolver::new(&discovery, &NeverPicker, &store);
        let request =
            ClaunchUrl::parse("claunch://open?v=1&prompt=hello", ProtocolMode::Versioned)
                .expect("parse");

        let resolved = resolve_request(&request, None, &resolver).expect("resolve");
        assert_eq!(resolved.prompt, "hello");
        assert_eq!(resolved.directory, None);
        assert_eq!(resolved.version, Some(1));
        assert_eq!(resolved.updated_config, None);
    }

    #[test]
    fn configured_project_must_still_exist() {
        let temp = tempdir().expect("tempdir");
        let store = ConfigStore::new(temp.path().join("config.json"));
        let discovery = FsDiscovery::new(temp.path().join("projects"));
        let resolver = ProjectResolver::new(&discovery, &NeverPicker, &store);
        let gone = temp.path().join("gone");
        let mut config = Config::default();
        config
            .projects
            .insert("api".to_string(), gone.display().to_string());
        let request = ClaunchUrl::parse(
            "claunch://open?v=1&prompt=hello&project=api",
            ProtocolMode::Versioned,
        )
        .expect("parse");

        let err = resolve_request(&request, Some(&config), &resolver).expect_err("must fail");
        assert!(format!("{err}").contains("directory does not exist"));

        fs::create_dir_all(&gone).expect("mkdir");
        let resolved = resolve_request(&request, Some(&config), &resolver).expect("resolve");
        assert_eq!(resolved.directory, Some(PathBuf::from(&gone)));
        assert_eq!(resolved.updated_config, None);
    }

    #[test]
    fn literal_directory_passes_through() {
        let temp = tempdir().expect("tempdir");
        let store = ConfigStore::new(temp.path().join("config.json"));
        let discovery = FsDiscovery::new(temp.path().join("projects"));
        let resolver = ProjectResolver::new(&discovery, &NeverPicker, &store);
        let input = format!(
            "claunch://open?prompt=hello&directory={}",
            temp.path().display()
        );
        let request = ClaunchUrl::parse(&input, ProtocolMode::Legacy).expect("parse");

        let resolved = resolve_request(&request, None, &resolver).expect("resolve");
        assert_eq!(resolved.directory, Some(temp.path().to_path_buf()));
    }
}
