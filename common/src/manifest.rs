//! Dependency manifests: the declarative list of coordinates a module
//! needs at runtime.
//!
//! The file format is deliberately boring: UTF-8 text, one
//! `group:name:version[:classifier]` per line, newline-terminated, sorted
//! lexicographically, no blank lines, no trailing metadata. Sorted output
//! makes regenerated manifests diff cleanly.
//!
//! Manifests are generated per module at build time and never mutated
//! afterwards. At provisioning time the caller merges all module manifests
//! into a [`MergedManifest`]; duplicate `(group, name)` pairs keep the
//! first-seen version, and a conflicting later version is logged rather
//! than silently discarded.

use crate::coordinate::{ArtifactCoordinate, CoordinateError};
use crate::digest::Sha256Digest;
use camino::Utf8Path;
use std::collections::HashSet;
use thiserror::Error;

/// Errors arising from manifest parsing or I/O.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A line failed to parse as a coordinate.
    #[error("manifest line {line}: {source}")]
    Parse {
        /// One-based line number of the offending line.
        line: usize,
        /// The underlying coordinate error.
        #[source]
        source: CoordinateError,
    },

    /// The manifest contains a blank line, which the format forbids.
    #[error("manifest line {line} is blank; the format forbids blank lines")]
    BlankLine {
        /// One-based line number of the blank line.
        line: usize,
    },

    /// An I/O operation on a manifest file failed.
    #[error("manifest I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`ManifestError`].
pub type Result<T> = std::result::Result<T, ManifestError>;

/// An ordered sequence of unique artifact coordinates for one module.
///
/// Invariant: entries are sorted and no two entries share `(group, name)`.
/// The constructor enforces both, so a `Manifest` value is always valid.
///
/// # Examples
///
/// ```
/// use stevedore_common::coordinate::ArtifactCoordinate;
/// use stevedore_common::manifest::Manifest;
///
/// let manifest = Manifest::new(vec![
///     ArtifactCoordinate::try_from("acme:foo:1.2.3").expect("valid"),
///     ArtifactCoordinate::try_from("acme:bar:2.0.0").expect("valid"),
/// ]);
/// assert_eq!(manifest.render(), "acme:bar:2.0.0\nacme:foo:1.2.3\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    entries: Vec<ArtifactCoordinate>,
}

impl Manifest {
    /// Build a manifest from coordinates, sorting them and dropping
    /// duplicate `(group, name)` entries.
    ///
    /// When two entries share `(group, name)` but disagree on version, the
    /// lexicographically first entry is kept and the conflict is logged.
    #[must_use]
    pub fn new(mut coordinates: Vec<ArtifactCoordinate>) -> Self {
        coordinates.sort();
        coordinates.dedup();

        let mut entries: Vec<ArtifactCoordinate> = Vec::with_capacity(coordinates.len());
        for coordinate in coordinates {
            match entries.last() {
                Some(last) if last.key() == coordinate.key() => {
                    log::warn!(
                        "manifest keeps {last}, dropping conflicting version {}",
                        coordinate.version()
                    );
                }
                _ => entries.push(coordinate),
            }
        }
        Self { entries }
    }

    /// Return the coordinates in manifest order.
    #[must_use]
    pub fn entries(&self) -> &[ArtifactCoordinate] {
        &self.entries
    }

    /// Return the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if the manifest has no entries.
    ///
    /// An empty manifest is valid: a module with no external dependencies
    /// simply provisions nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse manifest text in the one-coordinate-per-line format.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] for an unparseable line or
    /// [`ManifestError::BlankLine`] for a blank one, each naming the
    /// one-based line number.
    pub fn parse(text: &str) -> Result<Self> {
        let mut coordinates = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty() {
                return Err(ManifestError::BlankLine { line: line_no });
            }
            let coordinate = ArtifactCoordinate::try_from(line).map_err(|source| {
                ManifestError::Parse {
                    line: line_no,
                    source,
                }
            })?;
            coordinates.push(coordinate);
        }
        Ok(Self::new(coordinates))
    }

    /// Render the manifest to its canonical text form: sorted lines, each
    /// newline-terminated. An empty manifest renders as an empty string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a parse error
    /// for malformed content.
    pub fn read_from(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Write the manifest in canonical form.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn write_to(&self, path: &Utf8Path) -> Result<()> {
        std::fs::write(path, self.render())?;
        Ok(())
    }
}

/// One entry of a merged manifest: a coordinate plus an optional expected
/// digest for download verification.
///
/// The manifest line format carries no checksums; expected digests are
/// supplied programmatically by callers that hold them out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// The artifact to provision.
    pub coordinate: ArtifactCoordinate,
    /// Expected SHA-256 of the artifact blob, when known.
    pub expected_sha256: Option<Sha256Digest>,
}

/// The union of several module manifests, de-duplicated by `(group, name)`
/// with the first-seen version winning.
///
/// Entry order is first-occurrence order across the input manifests; the
/// resolved classpath preserves it.
#[derive(Debug, Clone, Default)]
pub struct MergedManifest {
    entries: Vec<ManifestEntry>,
}

impl MergedManifest {
    /// Merge module manifests in the given order.
    ///
    /// Duplicate `(group, name)` pairs keep the first-seen version; a
    /// later manifest pinning a different version is logged as a warning
    /// so a silent downgrade cannot hide. This mirrors the build's module
    /// ordering rather than attempting version reconciliation.
    #[must_use]
    pub fn merge(manifests: &[Manifest]) -> Self {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut entries = Vec::new();
        for manifest in manifests {
            for coordinate in manifest.entries() {
                let key = (coordinate.group().to_owned(), coordinate.name().to_owned());
                if seen.insert(key) {
                    entries.push(ManifestEntry {
                        coordinate: coordinate.clone(),
                        expected_sha256: None,
                    });
                } else if let Some(existing) = entries
                    .iter()
                    .find(|e| e.coordinate.key() == coordinate.key())
                    && existing.coordinate.version() != coordinate.version()
                {
                    log::warn!(
                        "merged manifest keeps {}, ignoring later version {}",
                        existing.coordinate,
                        coordinate.version()
                    );
                }
            }
        }
        Self { entries }
    }

    /// Return the merged entries in first-occurrence order.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Return the number of merged entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if no manifests contributed any entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record an expected digest for the entry matching `(group, name)`.
    ///
    /// Returns `true` if a matching entry was found.
    pub fn set_expected_digest(&mut self, group: &str, name: &str, digest: Sha256Digest) -> bool {
        for entry in &mut self.entries {
            if entry.coordinate.key() == (group, name) {
                entry.expected_sha256 = Some(digest);
                return true;
            }
        }
        false
    }
}
