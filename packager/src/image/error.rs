//! Errors for runtime image building.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors arising from image analysis, linking, or bundling.
#[derive(Debug, Error)]
pub enum ImageError {
    /// A pre-existing output directory could not be removed.
    ///
    /// Merging a new image into stale contents would ship leftover files,
    /// so the build stops instead.
    #[error("stale image output {path} could not be removed")]
    StaleOutput {
        /// The directory that blocked the build.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Static module analysis failed outright.
    #[error("module analysis failed: {reason}")]
    Analysis {
        /// Tool diagnostics explaining the failure.
        reason: String,
    },

    /// The image linker failed.
    #[error("image linking failed: {reason}")]
    Link {
        /// Tool diagnostics explaining the failure.
        reason: String,
    },

    /// A JDK tool could not be spawned.
    #[error("cannot run {tool}; is a JDK on PATH?")]
    ToolUnavailable {
        /// Name of the tool that failed to start.
        tool: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation during bundling failed.
    #[error("image I/O error at {path}")]
    Io {
        /// The path involved in the failure.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The distributable archive could not be written.
    #[error("zip error writing {path}")]
    Zip {
        /// Path of the archive being written.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: zip::result::ZipError,
    },
}

/// Result type alias using [`ImageError`].
pub type Result<T> = std::result::Result<T, ImageError>;
