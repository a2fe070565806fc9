//! Bounded-concurrency resolution of a merged manifest.
//!
//! Network fetches dominate provisioning latency, so independent
//! coordinates resolve concurrently on a small pool of scoped threads.
//! Per coordinate the steps stay strictly ordered: cache first, then each
//! configured source in turn. The returned classpath preserves manifest
//! order regardless of download completion order, and any unresolved
//! coordinate fails the whole operation — the application must never
//! start with a partial classpath.

use crate::cache::{CacheError, DirCache};
use crate::classpath::Classpath;
use crate::source::ArtifactSource;
use camino::Utf8PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use stevedore_common::coordinate::ArtifactCoordinate;
use stevedore_common::digest::sha256_of_bytes;
use stevedore_common::manifest::{ManifestEntry, MergedManifest};
use thiserror::Error;

/// Default bound on concurrent in-flight downloads.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// Errors arising from a provisioning run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Every configured source was exhausted for a coordinate.
    #[error("dependency {coordinate} is unavailable ({})", describe_tried(sources_tried))]
    DependencyUnavailable {
        /// The coordinate that could not be resolved.
        coordinate: ArtifactCoordinate,
        /// Labels of the sources tried, in order.
        sources_tried: Vec<String>,
    },

    /// The provisioning operation was cancelled before completion.
    #[error("provisioning was cancelled")]
    Cancelled,

    /// The local cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Result type alias using [`ProvisionError`].
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Render the tried-sources list for diagnostics.
fn describe_tried(sources_tried: &[String]) -> String {
    if sources_tried.is_empty() {
        "no sources configured".to_owned()
    } else {
        format!("sources tried: {}", sources_tried.join(", "))
    }
}

/// A cooperative cancellation handle shared between the caller and the
/// resolution workers.
///
/// Cancellation is observed between units of work; in-flight temp files
/// are dropped unfinalized and never promoted to cache entries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: std::sync::Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Return whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Resolves merged manifests against an injected cache and source chain.
///
/// The cache is an explicit dependency rather than a hidden singleton so
/// tests can point it at a temp directory.
pub struct Provisioner<'a> {
    cache: &'a DirCache,
    sources: &'a [Box<dyn ArtifactSource>],
    max_in_flight: usize,
}

impl<'a> Provisioner<'a> {
    /// Create a provisioner over `cache` and the ordered `sources`.
    #[must_use]
    pub fn new(cache: &'a DirCache, sources: &'a [Box<dyn ArtifactSource>]) -> Self {
        Self {
            cache,
            sources,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Set the bound on concurrent in-flight downloads (at least one).
    #[must_use]
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Resolve every manifest entry and return the classpath in manifest
    /// order.
    ///
    /// Running twice with a fully warm cache performs zero source
    /// accesses and returns the same classpath.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::DependencyUnavailable`] if any coordinate
    /// remains unresolved after the cache and every source, or
    /// [`ProvisionError::Cancelled`] if `cancel` was triggered first.
    pub fn resolve(&self, manifest: &MergedManifest, cancel: &CancelToken) -> Result<Classpath> {
        let entries = manifest.entries();
        if entries.is_empty() {
            return Ok(Classpath::new(Vec::new()));
        }

        let next = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let results: Mutex<Vec<Option<Result<Utf8PathBuf>>>> =
            Mutex::new((0..entries.len()).map(|_| None).collect());
        let worker_count = self.max_in_flight.min(entries.len());

        std::thread::scope(|scope| {
            for _ in 0..worker_count {
                scope.spawn(|| {
                    loop {
                        if cancel.is_cancelled() || abort.load(Ordering::SeqCst) {
                            break;
                        }
                        let index = next.fetch_add(1, Ordering::SeqCst);
                        let Some(entry) = entries.get(index) else {
                            break;
                        };
                        let outcome = self.resolve_one(entry, cancel);
                        let failed = outcome.is_err();
                        if let Some(slot) = results
                            .lock()
                            .expect("resolution results mutex poisoned")
                            .get_mut(index)
                        {
                            *slot = Some(outcome);
                        }
                        if failed {
                            abort.store(true, Ordering::SeqCst);
                            break;
                        }
                    }
                });
            }
        });

        collect_in_order(
            results
                .into_inner()
                .expect("resolution results mutex poisoned"),
            cancel,
        )
    }

    /// Resolve a single entry: cache, then each source in order.
    fn resolve_one(&self, entry: &ManifestEntry, cancel: &CancelToken) -> Result<Utf8PathBuf> {
        let coordinate = &entry.coordinate;
        if let Some(path) = self.cache.lookup(coordinate)? {
            log::debug!("{coordinate} satisfied from cache");
            return Ok(path);
        }

        let mut tried = Vec::with_capacity(self.sources.len());
        for source in self.sources {
            if cancel.is_cancelled() {
                return Err(ProvisionError::Cancelled);
            }
            let label = source.describe();
            match source.fetch(coordinate) {
                Ok(Some(bytes)) => {
                    if let Some(expected) = &entry.expected_sha256 {
                        let actual = sha256_of_bytes(&bytes);
                        if actual != *expected {
                            log::warn!(
                                "{coordinate} from {label} fails verification (expected {expected}, got {actual}); trying next source"
                            );
                            tried.push(label);
                            continue;
                        }
                    }
                    let path = self.cache.insert(coordinate, &bytes)?;
                    log::debug!("{coordinate} fetched from {label}");
                    return Ok(path);
                }
                Ok(None) => tried.push(label),
                Err(e) => {
                    log::warn!("{coordinate}: source {label} failed ({e}); trying next source");
                    tried.push(label);
                }
            }
        }

        Err(ProvisionError::DependencyUnavailable {
            coordinate: coordinate.clone(),
            sources_tried: tried,
        })
    }
}

/// Fold per-index outcomes into a classpath, preferring a concrete
/// resolution error over a bare cancellation report.
fn collect_in_order(
    results: Vec<Option<Result<Utf8PathBuf>>>,
    cancel: &CancelToken,
) -> Result<Classpath> {
    let mut paths = Vec::with_capacity(results.len());
    let mut skipped = false;
    let mut first_error = None;

    for slot in results {
        match slot {
            Some(Ok(path)) => paths.push(path),
            Some(Err(e)) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            None => skipped = true,
        }
    }

    if let Some(error) = first_error {
        return Err(error);
    }
    if skipped || cancel.is_cancelled() {
        return Err(ProvisionError::Cancelled);
    }
    Ok(Classpath::new(paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockArtifactSource;
    use stevedore_common::manifest::Manifest;

    fn temp_cache() -> (tempfile::TempDir, DirCache) {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().join("cache"))
            .expect("temp path is valid UTF-8");
        (dir, DirCache::new(root))
    }

    fn merged(coordinates: &[&str]) -> MergedManifest {
        let manifest = Manifest::new(
            coordinates
                .iter()
                .map(|s| ArtifactCoordinate::try_from(*s).expect("valid coordinate"))
                .collect(),
        );
        MergedManifest::merge(&[manifest])
    }

    #[test]
    fn warm_cache_resolves_without_touching_sources() {
        let (_guard, cache) = temp_cache();
        let coordinate = ArtifactCoordinate::try_from("acme:foo:1.2.3").expect("valid");
        cache.insert(&coordinate, b"bytes").expect("warm the cache");

        let mut source = MockArtifactSource::new();
        source.expect_fetch().times(0);
        let sources: Vec<Box<dyn ArtifactSource>> = vec![Box::new(source)];

        let provisioner = Provisioner::new(&cache, &sources);
        let classpath = provisioner
            .resolve(&merged(&["acme:foo:1.2.3"]), &CancelToken::new())
            .expect("warm cache satisfies the manifest");
        assert_eq!(classpath.len(), 1);
    }

    #[test]
    fn failing_source_falls_through_to_the_next() {
        let (_guard, cache) = temp_cache();

        let mut broken = MockArtifactSource::new();
        broken
            .expect_describe()
            .return_const("https://broken".to_owned());
        broken.expect_fetch().times(1).returning(|_| {
            Err(crate::source::SourceError::Transport {
                url: "https://broken/acme/foo/1.2.3/foo-1.2.3.jar".to_owned(),
                reason: "connection refused".to_owned(),
            })
        });

        let mut working = MockArtifactSource::new();
        working
            .expect_describe()
            .return_const("https://working".to_owned());
        working
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(Some(b"jar bytes".to_vec())));

        let sources: Vec<Box<dyn ArtifactSource>> = vec![Box::new(broken), Box::new(working)];
        let provisioner = Provisioner::new(&cache, &sources);
        let classpath = provisioner
            .resolve(&merged(&["acme:foo:1.2.3"]), &CancelToken::new())
            .expect("second source satisfies the coordinate");
        assert_eq!(classpath.len(), 1);
    }

    #[test]
    fn pre_cancelled_token_aborts_before_any_fetch() {
        let (_guard, cache) = temp_cache();
        let mut source = MockArtifactSource::new();
        source.expect_fetch().times(0);
        let sources: Vec<Box<dyn ArtifactSource>> = vec![Box::new(source)];

        let token = CancelToken::new();
        token.cancel();

        let provisioner = Provisioner::new(&cache, &sources);
        let result = provisioner.resolve(&merged(&["acme:foo:1.2.3"]), &token);
        assert!(matches!(result, Err(ProvisionError::Cancelled)));
    }

    #[test]
    fn empty_manifest_resolves_to_empty_classpath() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("temp path is valid UTF-8");
        let cache = DirCache::new(root);
        let sources: Vec<Box<dyn ArtifactSource>> = Vec::new();

        let provisioner = Provisioner::new(&cache, &sources);
        let classpath = provisioner
            .resolve(&MergedManifest::default(), &CancelToken::new())
            .expect("empty resolution succeeds");
        assert!(classpath.is_empty());
    }

    #[test]
    fn unavailable_error_names_coordinate_and_sources() {
        let error = ProvisionError::DependencyUnavailable {
            coordinate: ArtifactCoordinate::try_from("acme:foo:1.2.3").expect("valid"),
            sources_tried: vec!["dir:/tmp/repo".to_owned(), "https://repo".to_owned()],
        };
        let message = error.to_string();
        assert!(message.contains("acme:foo:1.2.3"));
        assert!(message.contains("dir:/tmp/repo"));
        assert!(message.contains("https://repo"));
    }

    #[test]
    fn unavailable_error_mentions_missing_source_configuration() {
        let error = ProvisionError::DependencyUnavailable {
            coordinate: ArtifactCoordinate::try_from("acme:foo:1.2.3").expect("valid"),
            sources_tried: Vec::new(),
        };
        assert!(error.to_string().contains("no sources configured"));
    }

    #[test]
    fn cancel_token_round_trip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        assert!(token.clone().is_cancelled());
    }
}
