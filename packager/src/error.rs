//! Top-level error type for the packaging CLI.
//!
//! Build-time failures abort only the affected module or platform build;
//! the CLI surfaces one of these per invocation with enough context to
//! fix the input without re-running under a debugger.

use crate::assembler::AssemblerError;
use crate::image::ImageError;
use crate::manifest_gen::GeneratorError;
use camino::Utf8PathBuf;
use stevedore_common::manifest::ManifestError;
use thiserror::Error;

/// Errors a packaging command can end with.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// Manifest generation failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// Package assembly failed.
    #[error(transparent)]
    Assembler(#[from] AssemblerError),

    /// Image building or bundling failed.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// A generated manifest could not be written or re-read.
    #[error("manifest {path}: {source}")]
    Manifest {
        /// Path of the manifest file.
        path: Utf8PathBuf,
        /// The underlying manifest error.
        #[source]
        source: ManifestError,
    },

    /// A TOML input descriptor could not be read or parsed.
    #[error("descriptor {path}: {reason}")]
    Descriptor {
        /// Path of the descriptor file.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
