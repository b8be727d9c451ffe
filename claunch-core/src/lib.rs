pub mod config;
pub mod decode;
pub mod error;
pub mod index;
pub mod launch;
pub mod model;
pub mod paths;
pub mod picker;
pub mod request;
pub mod resolver;
pub mod service;

pub use config::ConfigStore;
pub use decode::{decode, decode_under, encode};
pub use error::{ClaunchError, Result};
pub use index::{FsDiscovery, ProjectDiscovery, ProjectIndex};
pub use launch::{Launcher, SystemLauncher};
pub use model::{Config, Resolution, ResolutionSource, ResolvedRequest, TerminalKind};
pub use paths::ClaunchPaths;
pub use picker::{OsascriptPicker, Picker};
pub use request::{ClaunchUrl, ProtocolMode};
pub use resolver::ProjectResolver;
pub use service::resolve_request;
