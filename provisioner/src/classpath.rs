//! The resolved classpath: ordered local paths, one per manifest entry.
//!
//! Recomputed fresh on every application start and never persisted; the
//! launcher joins it with the host's path separator and hands it to the
//! runtime.

use camino::{Utf8Path, Utf8PathBuf};

/// An ordered sequence of local artifact paths in manifest order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classpath {
    entries: Vec<Utf8PathBuf>,
}

impl Classpath {
    /// Wrap an ordered list of resolved paths.
    #[must_use]
    pub fn new(entries: Vec<Utf8PathBuf>) -> Self {
        Self { entries }
    }

    /// Return the entries in manifest order.
    #[must_use]
    pub fn entries(&self) -> &[Utf8PathBuf] {
        &self.entries
    }

    /// Return the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if the classpath is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Join the entries with an explicit separator.
    #[must_use]
    pub fn joined_with(&self, separator: char) -> String {
        let mut out = String::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if index > 0 {
                out.push(separator);
            }
            out.push_str(entry.as_str());
        }
        out
    }

    /// Join the entries with the host platform's path separator.
    #[must_use]
    pub fn joined(&self) -> String {
        self.joined_with(host_separator())
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &Utf8Path> {
        self.entries.iter().map(Utf8PathBuf::as_path)
    }
}

/// The classpath separator of the host this process runs on.
fn host_separator() -> char {
    if cfg!(windows) { ';' } else { ':' }
}
