//! Repository sources: fetch-by-coordinate, blob or not-found.
//!
//! A repository list is an ordered fallback chain; each source supports a
//! single operation. The local directory flavor serves a Maven-layout
//! tree on disk, the HTTP flavor a Maven-layout remote endpoint. The
//! trait seam lets tests substitute mocks without network access.

use camino::Utf8PathBuf;
use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;
use stevedore_common::coordinate::ArtifactCoordinate;
use thiserror::Error;

/// Network timeout for artifact downloads.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors arising from a single source's fetch attempt.
///
/// These are transient from the resolver's point of view: it logs them
/// and moves on to the next configured source rather than failing the
/// coordinate outright.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP transport failure (timeout, refused connection, bad status).
    #[error("transport error fetching {url}: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// I/O failure reading from a local directory source.
    #[error("I/O error reading {path}")]
    Io {
        /// Path of the file that could not be read.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A fetch source for artifact blobs.
///
/// `fetch` returns `Ok(None)` when the source simply does not hold the
/// coordinate; errors are reserved for failures of the source itself.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactSource: Send + Sync {
    /// Return a short human-readable label for diagnostics.
    fn describe(&self) -> String;

    /// Fetch the blob for a coordinate, or report that it is not held.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source itself fails (transport or
    /// local I/O); absence is not an error.
    fn fetch(&self, coordinate: &ArtifactCoordinate) -> Result<Option<Vec<u8>>, SourceError>;
}

/// A local directory source serving a Maven-layout tree.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: Utf8PathBuf,
}

impl DirSource {
    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }
}

impl ArtifactSource for DirSource {
    fn describe(&self) -> String {
        format!("dir:{}", self.root)
    }

    fn fetch(&self, coordinate: &ArtifactCoordinate) -> Result<Option<Vec<u8>>, SourceError> {
        let path = self.root.join(coordinate.repository_path());
        if !path.is_file() {
            return Ok(None);
        }
        std::fs::read(&path)
            .map(Some)
            .map_err(|source| SourceError::Io { path, source })
    }
}

/// A remote HTTP source serving a Maven-layout endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
}

impl HttpSource {
    /// Create a source for `base_url` (a trailing slash is tolerated).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Construct the download URL for a coordinate.
    ///
    /// # Examples
    ///
    /// ```
    /// use stevedore_common::coordinate::ArtifactCoordinate;
    /// use stevedore_provisioner::source::HttpSource;
    ///
    /// let source = HttpSource::new("https://repo.example.org/maven2/");
    /// let coord = ArtifactCoordinate::try_from("com.acme:foo:1.0").expect("valid");
    /// assert_eq!(
    ///     source.artifact_url(&coord),
    ///     "https://repo.example.org/maven2/com/acme/foo/1.0/foo-1.0.jar"
    /// );
    /// ```
    #[must_use]
    pub fn artifact_url(&self, coordinate: &ArtifactCoordinate) -> String {
        format!("{}/{}", self.base_url, coordinate.repository_path())
    }
}

impl ArtifactSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn fetch(&self, coordinate: &ArtifactCoordinate) -> Result<Option<Vec<u8>>, SourceError> {
        let url = self.artifact_url(coordinate);
        let response = match http_agent().get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(404)) => return Ok(None),
            Err(other) => {
                return Err(SourceError::Transport {
                    url,
                    reason: other.to_string(),
                });
            }
        };

        let mut bytes = Vec::new();
        response
            .into_body()
            .as_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| SourceError::Transport {
                url,
                reason: e.to_string(),
            })?;
        Ok(Some(bytes))
    }
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(FETCH_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}
