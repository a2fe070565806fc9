//! Artifact coordinate value type.
//!
//! A coordinate uniquely identifies an external library unit by group,
//! name, version, and optional classifier. Coordinates are immutable and
//! must carry a pinned version: floating specifiers (`+`, `latest`) and
//! Maven range syntax are rejected at construction, so nothing downstream
//! ever caches or downloads an unresolved entry.

use std::fmt;
use thiserror::Error;

/// Characters that mark a version string as a range rather than a pin.
const RANGE_CHARS: [char; 5] = ['[', ']', '(', ')', ','];

/// Errors arising from coordinate construction or parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// A required coordinate field was empty.
    #[error("coordinate field '{field}' must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The version is not a concrete, pinned version string.
    #[error("version '{version}' for {group}:{name} is not pinned")]
    UnpinnedVersion {
        /// Group of the offending coordinate.
        group: String,
        /// Name of the offending coordinate.
        name: String,
        /// The floating or range version specifier.
        version: String,
    },

    /// A coordinate string did not split into the expected parts.
    #[error("malformed coordinate '{input}': expected group:name:version[:classifier]")]
    Malformed {
        /// The input string that failed to parse.
        input: String,
    },
}

/// Result type alias using [`CoordinateError`].
pub type Result<T> = std::result::Result<T, CoordinateError>;

/// A uniquely identified external library unit.
///
/// Equality and ordering consider all fields; the derived ordering is
/// lexicographic by group, then name, then version, then classifier,
/// which gives manifests a stable, diff-friendly order.
///
/// # Examples
///
/// ```
/// use stevedore_common::coordinate::ArtifactCoordinate;
///
/// let coord = ArtifactCoordinate::try_from("org.apache.commons:commons-csv:1.5")
///     .expect("valid coordinate");
/// assert_eq!(coord.group(), "org.apache.commons");
/// assert_eq!(coord.file_name(), "commons-csv-1.5.jar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactCoordinate {
    group: String,
    name: String,
    version: String,
    classifier: Option<String>,
}

impl ArtifactCoordinate {
    /// Construct a coordinate without a classifier.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::EmptyField`] if `group` or `name` is
    /// empty, or [`CoordinateError::UnpinnedVersion`] if `version` is not
    /// a concrete version string.
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        Self::build(group.into(), name.into(), version.into(), None)
    }

    /// Construct a coordinate with a classifier.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`ArtifactCoordinate::new`].
    pub fn with_classifier(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        classifier: impl Into<String>,
    ) -> Result<Self> {
        Self::build(
            group.into(),
            name.into(),
            version.into(),
            Some(classifier.into()),
        )
    }

    fn build(
        group: String,
        name: String,
        version: String,
        classifier: Option<String>,
    ) -> Result<Self> {
        if group.is_empty() {
            return Err(CoordinateError::EmptyField { field: "group" });
        }
        if name.is_empty() {
            return Err(CoordinateError::EmptyField { field: "name" });
        }
        validate_pinned(&group, &name, &version)?;
        let classifier = classifier.filter(|c| !c.is_empty());
        Ok(Self {
            group,
            name,
            version,
            classifier,
        })
    }

    /// Return the group identifier.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Return the artifact name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the pinned version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return the classifier, if any.
    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Return the `(group, name)` pair that identifies this artifact
    /// irrespective of version, used for manifest de-duplication.
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.group, &self.name)
    }

    /// Return the artifact file name, `{name}-{version}[-{classifier}].jar`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stevedore_common::coordinate::ArtifactCoordinate;
    ///
    /// let coord = ArtifactCoordinate::with_classifier("acme", "widgets", "2.0.0", "linux64")
    ///     .expect("valid coordinate");
    /// assert_eq!(coord.file_name(), "widgets-2.0.0-linux64.jar");
    /// ```
    #[must_use]
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!("{}-{}-{}.jar", self.name, self.version, classifier),
            None => format!("{}-{}.jar", self.name, self.version),
        }
    }

    /// Return the repository-relative path for this artifact, with the
    /// group's dots expanded to directory separators.
    ///
    /// # Examples
    ///
    /// ```
    /// use stevedore_common::coordinate::ArtifactCoordinate;
    ///
    /// let coord = ArtifactCoordinate::try_from("org.apache.commons:commons-csv:1.5")
    ///     .expect("valid coordinate");
    /// assert_eq!(
    ///     coord.repository_path(),
    ///     "org/apache/commons/commons-csv/1.5/commons-csv-1.5.jar"
    /// );
    /// ```
    #[must_use]
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.name,
            self.version,
            self.file_name()
        )
    }
}

impl TryFrom<&str> for ArtifactCoordinate {
    type Error = CoordinateError;

    fn try_from(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(':').collect();
        match parts.as_slice() {
            [group, name, version] => Self::build(
                (*group).to_owned(),
                (*name).to_owned(),
                (*version).to_owned(),
                None,
            ),
            [group, name, version, classifier] => Self::build(
                (*group).to_owned(),
                (*name).to_owned(),
                (*version).to_owned(),
                Some((*classifier).to_owned()),
            ),
            _ => Err(CoordinateError::Malformed {
                input: value.to_owned(),
            }),
        }
    }
}

impl std::str::FromStr for ArtifactCoordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s)
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// Validate that `version` is a concrete, pinned version string.
fn validate_pinned(group: &str, name: &str, version: &str) -> Result<()> {
    let unpinned = version.is_empty()
        || version.contains('+')
        || version.contains(RANGE_CHARS)
        || version.contains(char::is_whitespace)
        || version.eq_ignore_ascii_case("latest")
        || version.eq_ignore_ascii_case("release");
    if unpinned {
        return Err(CoordinateError::UnpinnedVersion {
            group: group.to_owned(),
            name: name.to_owned(),
            version: version.to_owned(),
        });
    }
    Ok(())
}
