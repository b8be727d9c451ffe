use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use url::Url;

use crate::error::{ClaunchError, Result};

pub const SCHEME: &str = "claunch";
pub const ACTION: &str = "open";
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProtocolMode {
    #[default]
    Versioned,
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaunchUrl {
    pub prompt: String,
    pub project: Option<String>,
    pub directory: Option<PathBuf>,
    pub version: Option<u32>,
}

impl ClaunchUrl {
    pub fn parse(input: &str, mode: ProtocolMode) -> Result<Self> {
        let url = Url::parse(input).map_err(|err| malformed(format!("invalid url: {err}")))?;

        if url.scheme() != SCHEME {
            return Err(malformed(format!("unexpected scheme: {}", url.scheme())));
        }
        let host = url.host_str().unwrap_or_default();
        let has_extras =
            url.port().is_some() || !url.username().is_empty() || url.password().is_some();
        if host != ACTION || has_extras {
            return Err(malformed(format!(
                "unexpected host: {} (expected '{ACTION}')",
                url.authority()
            )));
        }

        let params = first_values(&url);

        let prompt = params
            .get("prompt")
            .filter(|prompt| !prompt.trim().is_empty())
            .cloned()
            .ok_or_else(|| malformed("missing or empty 'prompt' parameter"))?;

        let version = match (params.get("v"), mode) {
            (Some(raw), _) => Some(parse_version(raw)?),
            (None, ProtocolMode::Versioned) => {
                return Err(malformed("missing required 'v' parameter (e.g. v=1)"));
            }
            (None, ProtocolMode::Legacy) => None,
        };

        let project = non_blank(params.get("project"));
        let directory = non_blank(params.get("directory"));

        let directory = match (mode, &project, directory) {
            (_, _, None) => None,
            (ProtocolMode::Versioned, _, Some(_)) => {
                return Err(malformed(
                    "'directory' is not supported with 'v'; use 'project' instead",
                ));
            }
            (ProtocolMode::Legacy, Some(_), Some(_)) => {
                return Err(malformed(
                    "'project' and 'directory' cannot be used together",
                ));
            }
            (ProtocolMode::Legacy, None, Some(raw)) => Some(existing_directory(&raw)?),
        };

        Ok(Self {
            prompt,
            project,
            directory,
            version,
        })
    }
}

impl FromStr for ClaunchUrl {
    type Err = ClaunchError;

    fn from_str(input: &str) -> Result<Self> {
        Self::parse(input, ProtocolMode::default())
    }
}

fn malformed(reason: impl Into<String>) -> ClaunchError {
    ClaunchError::MalformedRequest(reason.into())
}

// The first occurrence of a repeated key wins.
fn first_values(url: &Url) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for (key, value) in url.query_pairs() {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty()).cloned()
}

fn parse_version(raw: &str) -> Result<u32> {
    let version = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| malformed(format!("invalid 'v' parameter: {raw:?} (expected integer)")))?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(malformed(format!(
            "unsupported version: {version} (supported: {SUPPORTED_VERSIONS:?})"
        )));
    }
    Ok(version)
}

fn existing_directory(raw: &str) -> Result<PathBuf> {
    let path = Path::new(raw);
    if !path.is_absolute() {
        return Err(malformed(format!(
            "directory must be an absolute path: {raw}"
        )));
    }
    if !path.is_dir() {
        return Err(malformed(format!("directory does not exist: {raw}")));
    }
    Ok(path.to_path_buf())
}
