//! Directory resolution abstraction for platform-specific paths.
//!
//! The artifact cache lives under the per-user cache directory by default.
//! The trait seam lets tests substitute fixed paths without touching the
//! real user profile.

use camino::Utf8PathBuf;

/// Provides platform-specific base directories.
pub trait BaseDirs {
    /// Return the per-user cache directory root, if one can be determined.
    fn cache_dir(&self) -> Option<Utf8PathBuf>;
}

/// Production [`BaseDirs`] backed by the `directories-next` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn cache_dir(&self) -> Option<Utf8PathBuf> {
        directories_next::ProjectDirs::from("org", "Gridscope", "gridscope")
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.cache_dir().to_path_buf()).ok())
    }
}

/// Return the default artifact cache root under the per-user cache
/// directory.
#[must_use]
pub fn default_cache_root(dirs: &dyn BaseDirs) -> Option<Utf8PathBuf> {
    dirs.cache_dir().map(|root| root.join("artifacts"))
}
