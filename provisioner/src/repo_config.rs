//! Repository-list configuration.
//!
//! The surrounding application's configuration loader supplies an ordered
//! list of fetch sources as a TOML document; order in the file is fallback
//! order at resolution time:
//!
//! ```toml
//! [[repository]]
//! kind = "local"
//! path = "/var/lib/gridscope/repo"
//!
//! [[repository]]
//! kind = "remote"
//! url = "https://repo1.maven.org/maven2"
//! ```

use crate::source::{ArtifactSource, DirSource, HttpSource};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use thiserror::Error;

/// Errors arising from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read repository configuration {path}")]
    Io {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has the wrong shape.
    #[error("invalid repository configuration {path}: {reason}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse failure.
        reason: String,
    },
}

/// One configured fetch source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RepositoryConfig {
    /// A local directory holding a Maven-layout tree.
    Local {
        /// Root directory of the tree.
        path: Utf8PathBuf,
    },
    /// A remote Maven-layout HTTP endpoint.
    Remote {
        /// Base URL of the endpoint.
        url: String,
    },
}

/// The provisioner's configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisionConfig {
    /// Ordered fetch sources; earlier entries win.
    #[serde(default, rename = "repository")]
    pub repositories: Vec<RepositoryConfig>,
}

/// Load and parse a repository configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read or
/// [`ConfigError::Parse`] if it is malformed.
pub fn load_config(path: &Utf8Path) -> Result<ProvisionConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

/// Instantiate the configured sources in file order.
#[must_use]
pub fn build_sources(config: &ProvisionConfig) -> Vec<Box<dyn ArtifactSource>> {
    config
        .repositories
        .iter()
        .map(|repository| match repository {
            RepositoryConfig::Local { path } => {
                Box::new(DirSource::new(path.clone())) as Box<dyn ArtifactSource>
            }
            RepositoryConfig::Remote { url } => Box::new(HttpSource::new(url.clone())),
        })
        .collect()
}
