//! Durable artifact cache keyed by coordinate.
//!
//! Layout: `{root}/{group as directories}/{name}/{version}/` holding the
//! artifact blob plus a `.sha256` sidecar recorded at write time. An entry
//! counts as present only when blob and sidecar both exist and the
//! recomputed digest matches — a mismatch is logged and treated as a miss
//! so the resolver re-fetches instead of returning a corrupt file.
//!
//! Writes finalize the sidecar first and the blob last, each via an atomic
//! rename from a temp file in the entry directory. A crash mid-download
//! never leaves a partial entry visible, and arbitrarily many processes
//! may race on the same cache without a lock file: the last writer wins
//! and readers only ever observe complete entries.

use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use stevedore_common::coordinate::ArtifactCoordinate;
use stevedore_common::digest::{Sha256Digest, compute_sha256, sha256_of_bytes};
use thiserror::Error;

/// Errors arising from cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// An I/O operation on the cache directory failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`CacheError`].
pub type Result<T> = std::result::Result<T, CacheError>;

/// A directory-backed artifact cache.
///
/// The cache is created lazily on first write, persists across runs, and
/// is never evicted by this subsystem — availability is deliberately
/// favored over disk usage.
#[derive(Debug, Clone)]
pub struct DirCache {
    root: Utf8PathBuf,
}

impl DirCache {
    /// Create a cache handle rooted at `root`. No directories are created
    /// until the first write.
    #[must_use]
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    /// Return the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Look up a coordinate, returning the blob path only for a complete,
    /// checksum-valid entry.
    ///
    /// A missing sidecar, an unreadable sidecar, or a digest mismatch all
    /// count as a miss; mismatches are logged so corruption is visible.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an existing entry cannot be read.
    pub fn lookup(&self, coordinate: &ArtifactCoordinate) -> Result<Option<Utf8PathBuf>> {
        let blob_path = self.blob_path(coordinate);
        let sidecar_path = sidecar_path(&blob_path);
        if !blob_path.is_file() || !sidecar_path.is_file() {
            return Ok(None);
        }

        let recorded = std::fs::read_to_string(&sidecar_path)?;
        let Ok(expected) = Sha256Digest::try_from(recorded.trim()) else {
            log::warn!("cache sidecar for {coordinate} is unreadable; treating entry as absent");
            return Ok(None);
        };

        let actual = compute_sha256(&blob_path)?;
        if actual != expected {
            log::warn!(
                "cache entry for {coordinate} fails verification (expected {expected}, got {actual}); treating entry as absent"
            );
            return Ok(None);
        }
        Ok(Some(blob_path))
    }

    /// Write a fetched blob into the cache and return its final path.
    ///
    /// The sidecar digest is persisted before the blob, each via an atomic
    /// rename, so a reader never observes a blob without its digest or a
    /// partially written blob.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the entry directory cannot be created or
    /// either file cannot be written.
    pub fn insert(&self, coordinate: &ArtifactCoordinate, bytes: &[u8]) -> Result<Utf8PathBuf> {
        let entry_dir = self.entry_dir(coordinate);
        std::fs::create_dir_all(&entry_dir)?;

        let blob_path = self.blob_path(coordinate);
        let digest = sha256_of_bytes(bytes);

        write_atomically(&entry_dir, &sidecar_path(&blob_path), |file| {
            writeln!(file, "{digest}")
        })?;
        write_atomically(&entry_dir, &blob_path, |file| file.write_all(bytes))?;
        Ok(blob_path)
    }

    /// Return the directory holding a coordinate's entry.
    fn entry_dir(&self, coordinate: &ArtifactCoordinate) -> Utf8PathBuf {
        self.root
            .join(coordinate.group().replace('.', "/"))
            .join(coordinate.name())
            .join(coordinate.version())
    }

    /// Return the final blob path for a coordinate.
    fn blob_path(&self, coordinate: &ArtifactCoordinate) -> Utf8PathBuf {
        self.entry_dir(coordinate).join(coordinate.file_name())
    }
}

/// Return the sidecar path for a blob path.
fn sidecar_path(blob_path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{blob_path}.sha256"))
}

/// Write a file via temp-file-then-rename in the target's own directory,
/// so the rename stays on one filesystem and is atomic.
fn write_atomically(
    dir: &Utf8Path,
    dest: &Utf8Path,
    write: impl FnOnce(&mut std::fs::File) -> std::io::Result<()>,
) -> Result<()> {
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    write(temp.as_file_mut())?;
    temp.persist(dest).map_err(|e| CacheError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(s: &str) -> ArtifactCoordinate {
        ArtifactCoordinate::try_from(s).expect("valid coordinate")
    }

    fn temp_cache() -> (tempfile::TempDir, DirCache) {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().join("cache"))
            .expect("temp path is valid UTF-8");
        (dir, DirCache::new(root))
    }

    #[test]
    fn lookup_misses_on_empty_cache() {
        let (_guard, cache) = temp_cache();
        let found = cache.lookup(&coord("acme:foo:1.2.3")).expect("lookup");
        assert!(found.is_none());
    }

    #[test]
    fn insert_then_lookup_hits_with_expected_layout() {
        let (_guard, cache) = temp_cache();
        let coordinate = coord("com.acme:foo:1.2.3");

        let inserted = cache.insert(&coordinate, b"artifact bytes").expect("insert");
        assert!(inserted.as_str().ends_with("com/acme/foo/1.2.3/foo-1.2.3.jar"));

        let found = cache.lookup(&coordinate).expect("lookup");
        assert_eq!(found.as_deref(), Some(inserted.as_path()));
        assert_eq!(
            std::fs::read(&inserted).expect("read blob"),
            b"artifact bytes"
        );
    }

    #[test]
    fn corrupted_blob_is_treated_as_absent() {
        let (_guard, cache) = temp_cache();
        let coordinate = coord("acme:foo:1.2.3");
        let path = cache.insert(&coordinate, b"original").expect("insert");

        // Flip one byte behind the cache's back.
        std::fs::write(&path, b"originaX").expect("corrupt blob");

        let found = cache.lookup(&coordinate).expect("lookup");
        assert!(found.is_none(), "corrupt entry must not be returned");
    }

    #[test]
    fn blob_without_sidecar_is_treated_as_absent() {
        let (_guard, cache) = temp_cache();
        let coordinate = coord("acme:foo:1.2.3");
        let path = cache.insert(&coordinate, b"bytes").expect("insert");

        std::fs::remove_file(format!("{path}.sha256")).expect("drop sidecar");

        let found = cache.lookup(&coordinate).expect("lookup");
        assert!(found.is_none());
    }

    #[test]
    fn insert_overwrites_previous_entry() {
        let (_guard, cache) = temp_cache();
        let coordinate = coord("acme:foo:1.2.3");

        cache.insert(&coordinate, b"old bytes").expect("first insert");
        let path = cache.insert(&coordinate, b"new bytes").expect("second insert");

        assert_eq!(std::fs::read(&path).expect("read blob"), b"new bytes");
        assert!(cache.lookup(&coordinate).expect("lookup").is_some());
    }

    #[test]
    fn classifier_is_part_of_the_cached_file_name() {
        let (_guard, cache) = temp_cache();
        let coordinate = coord("acme:widgets:2.0.0:linux64");
        let path = cache.insert(&coordinate, b"native").expect("insert");
        assert!(path.as_str().ends_with("widgets-2.0.0-linux64.jar"));
    }
}
