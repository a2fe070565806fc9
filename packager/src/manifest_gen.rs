//! Dependency manifest generation from resolved build-time records.
//!
//! The build hands this module the flat list of artifacts a module's
//! compile classpath resolved to; the generator filters out everything
//! the installer must not name (the application's own modules, groups the
//! provisioner itself bundles, and platform-qualified native jars) and
//! renders what remains as a canonical manifest. Generation is
//! deterministic: the same records and config always produce byte-identical
//! output.

use serde::Deserialize;
use stevedore_common::coordinate::{ArtifactCoordinate, CoordinateError};
use stevedore_common::manifest::Manifest;
use stevedore_common::platform::PLATFORM_FILE_TOKENS;
use thiserror::Error;

/// Errors arising from manifest generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A record survived filtering but does not carry a pinned version.
    ///
    /// Floating versions must be caught at build time, never defaulted:
    /// an unpinned entry would make first-launch behavior depend on what
    /// a repository happens to serve that day.
    #[error("resolution incomplete for {group}:{name}: {source}")]
    ResolutionIncomplete {
        /// Group of the offending record.
        group: String,
        /// Name of the offending record.
        name: String,
        /// The underlying coordinate error.
        #[source]
        source: CoordinateError,
    },
}

/// One resolved build-time dependency record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedArtifact {
    /// Group identifier.
    pub group: String,
    /// Artifact name.
    pub name: String,
    /// Resolved version string.
    pub version: String,
    /// File name of the resolved artifact.
    pub file_name: String,
}

/// The resolved dependency set of one application module, as read from a
/// TOML descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct DependencySet {
    /// Name of the module the records belong to.
    pub module: String,
    /// The resolved records, in resolution order.
    #[serde(default, rename = "artifact")]
    pub artifacts: Vec<ResolvedArtifact>,
}

/// Filtering configuration for manifest generation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratorConfig {
    /// The application's own group namespace; artifacts in it or under it
    /// are compiled into the installer and never provisioned.
    pub app_namespace: String,
    /// Groups the provisioner's own runtime already bundles.
    #[serde(default)]
    pub bundled_groups: Vec<String>,
}

impl GeneratorConfig {
    /// Return whether `group` is the application namespace or nested
    /// under it.
    #[must_use]
    pub fn is_internal(&self, group: &str) -> bool {
        !self.app_namespace.is_empty()
            && (group == self.app_namespace
                || group
                    .strip_prefix(&self.app_namespace)
                    .is_some_and(|rest| rest.starts_with('.')))
    }

    /// Return whether `group` is in the bundled-groups set.
    #[must_use]
    pub fn is_bundled(&self, group: &str) -> bool {
        self.bundled_groups.iter().any(|g| g == group)
    }
}

/// Return whether a file name carries a platform or fat-bundle token.
///
/// Segments are produced by splitting on `-`, `.`, and `_`, and compared
/// case-insensitively, so `opencv-3.2.0-natives-windows.jar` matches while
/// `allocation-utils-1.0.jar` does not.
#[must_use]
pub fn has_platform_token(file_name: &str) -> bool {
    file_name
        .split(['-', '.', '_'])
        .any(|segment| PLATFORM_FILE_TOKENS.iter().any(|t| segment.eq_ignore_ascii_case(t)))
}

/// Generate a module's dependency manifest from its resolved records.
///
/// Records are excluded, in order, when their group is the application's
/// own namespace, when their group is bundled by the provisioner runtime,
/// or when their file name carries a platform token. The survivors become
/// coordinates; duplicates collapse per the manifest's first-wins rule.
///
/// An empty record list yields an empty, valid manifest.
///
/// # Errors
///
/// Returns [`GeneratorError::ResolutionIncomplete`] when a surviving
/// record's version is not pinned.
pub fn generate_manifest(
    set: &DependencySet,
    config: &GeneratorConfig,
) -> Result<Manifest, GeneratorError> {
    let mut coordinates = Vec::with_capacity(set.artifacts.len());
    for record in &set.artifacts {
        if config.is_internal(&record.group) {
            log::debug!(
                "module {}: skipping internal artifact {}:{}",
                set.module,
                record.group,
                record.name
            );
            continue;
        }
        if config.is_bundled(&record.group) {
            log::debug!(
                "module {}: skipping bundled artifact {}:{}",
                set.module,
                record.group,
                record.name
            );
            continue;
        }
        if has_platform_token(&record.file_name) {
            log::debug!(
                "module {}: skipping platform-qualified artifact {}",
                set.module,
                record.file_name
            );
            continue;
        }

        let coordinate = ArtifactCoordinate::new(&record.group, &record.name, &record.version)
            .map_err(|source| GeneratorError::ResolutionIncomplete {
                group: record.group.clone(),
                name: record.name.clone(),
                source,
            })?;
        coordinates.push(coordinate);
    }
    Ok(Manifest::new(coordinates))
}
