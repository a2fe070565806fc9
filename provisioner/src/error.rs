//! Top-level error type for a provisioning run.
//!
//! Subsystem errors stay in their own modules; this enum is the single
//! surface the CLI reports from, so each variant's message is written to
//! tell an operator what to do next.

use crate::repo_config::ConfigError;
use crate::resolve::ProvisionError;
use camino::Utf8PathBuf;
use stevedore_common::manifest::ManifestError;
use thiserror::Error;

/// Errors a provisioning run can end with.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// A module manifest could not be read or parsed.
    #[error("manifest {path}: {source}")]
    Manifest {
        /// Path of the offending manifest file.
        path: Utf8PathBuf,
        /// The underlying manifest error.
        #[source]
        source: ManifestError,
    },

    /// The repository configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Resolution failed or was cancelled.
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// No cache directory was given and none could be derived from the
    /// user profile.
    #[error("cannot determine a cache directory; pass --cache-dir explicitly")]
    NoCacheDir,
}

/// Result type alias using [`LaunchError`].
pub type Result<T> = std::result::Result<T, LaunchError>;
