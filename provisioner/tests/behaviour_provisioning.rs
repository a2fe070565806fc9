//! End-to-end provisioning scenarios over real directories.
//!
//! Each scenario drives the resolver against a temp-directory cache and
//! Maven-layout repository trees on disk, checking the observable
//! contract: manifest-ordered classpaths, warm-cache short-circuits,
//! ordered source fallback, and all-or-nothing failure.

use camino::Utf8PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use stevedore_common::coordinate::ArtifactCoordinate;
use stevedore_common::digest::sha256_of_bytes;
use stevedore_common::manifest::{Manifest, MergedManifest};
use stevedore_provisioner::resolve::{CancelToken, ProvisionError, Provisioner};
use stevedore_provisioner::source::{ArtifactSource, DirSource, SourceError};
use stevedore_provisioner::{Classpath, DirCache};

/// A source wrapper that counts fetch attempts through a shared counter.
struct CountingSource<S> {
    inner: S,
    fetches: Arc<AtomicUsize>,
}

impl<S> CountingSource<S> {
    fn new(inner: S) -> (Self, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = Self {
            inner,
            fetches: Arc::clone(&fetches),
        };
        (source, fetches)
    }
}

impl<S: ArtifactSource> ArtifactSource for CountingSource<S> {
    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn fetch(&self, coordinate: &ArtifactCoordinate) -> Result<Option<Vec<u8>>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(coordinate)
    }
}

struct World {
    _guard: tempfile::TempDir,
    root: Utf8PathBuf,
    cache: DirCache,
}

impl World {
    fn new() -> Self {
        let guard = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(guard.path().to_path_buf())
            .expect("temp path is valid UTF-8");
        let cache = DirCache::new(root.join("cache"));
        Self {
            _guard: guard,
            root,
            cache,
        }
    }

    /// Create a Maven-layout repository tree holding the given artifacts.
    fn repo(&self, name: &str, artifacts: &[(&str, &[u8])]) -> DirSource {
        let repo_root = self.root.join(name);
        for (spec, bytes) in artifacts {
            let coordinate = coord(spec);
            let path = repo_root.join(coordinate.repository_path());
            std::fs::create_dir_all(path.parent().expect("artifact path has a parent"))
                .expect("create repo layout");
            std::fs::write(&path, bytes).expect("write repo artifact");
        }
        DirSource::new(repo_root)
    }

    fn resolve(
        &self,
        sources: &[Box<dyn ArtifactSource>],
        manifest: &MergedManifest,
    ) -> Result<Classpath, ProvisionError> {
        Provisioner::new(&self.cache, sources).resolve(manifest, &CancelToken::new())
    }
}

fn coord(s: &str) -> ArtifactCoordinate {
    ArtifactCoordinate::try_from(s).expect("valid coordinate")
}

fn merged(coordinates: &[&str]) -> MergedManifest {
    MergedManifest::merge(&[Manifest::new(coordinates.iter().map(|s| coord(s)).collect())])
}

#[test]
fn cold_cache_resolves_from_a_single_repository_in_manifest_order() {
    let world = World::new();
    let repo = world.repo(
        "repo",
        &[("acme:alpha:1.0", b"alpha"), ("acme:beta:2.0", b"beta")],
    );
    let sources: Vec<Box<dyn ArtifactSource>> = vec![Box::new(repo)];

    let classpath = world
        .resolve(&sources, &merged(&["acme:alpha:1.0", "acme:beta:2.0"]))
        .expect("both artifacts resolve");

    let entries = classpath.entries();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].as_str().ends_with("alpha-1.0.jar"));
    assert!(entries[1].as_str().ends_with("beta-2.0.jar"));
    for entry in entries {
        assert!(entry.as_str().starts_with(world.cache.root().as_str()));
    }
}

#[test]
fn second_run_with_warm_cache_performs_zero_fetches() {
    let world = World::new();
    let manifest = merged(&["acme:alpha:1.0"]);

    let warmup: Vec<Box<dyn ArtifactSource>> =
        vec![Box::new(world.repo("repo", &[("acme:alpha:1.0", b"alpha")]))];
    let first = world.resolve(&warmup, &manifest).expect("first run");

    let (counting, fetches) = CountingSource::new(world.repo("unused", &[]));
    let sources: Vec<Box<dyn ArtifactSource>> = vec![Box::new(counting)];
    let second = world.resolve(&sources, &manifest).expect("second run");

    assert_eq!(first.entries(), second.entries());
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[test]
fn later_source_supplies_what_the_first_lacks() {
    let world = World::new();
    let primary = world.repo("primary", &[("acme:alpha:1.0", b"alpha")]);
    let fallback = world.repo("fallback", &[("acme:beta:2.0", b"beta")]);
    let sources: Vec<Box<dyn ArtifactSource>> = vec![Box::new(primary), Box::new(fallback)];

    let classpath = world
        .resolve(&sources, &merged(&["acme:alpha:1.0", "acme:beta:2.0"]))
        .expect("the chain covers both artifacts");
    assert_eq!(classpath.len(), 2);
}

#[test]
fn exhausted_sources_fail_the_whole_run_naming_the_coordinate() {
    let world = World::new();
    let repo = world.repo("repo", &[("acme:alpha:1.0", b"alpha")]);
    let sources: Vec<Box<dyn ArtifactSource>> = vec![Box::new(repo)];

    let error = world
        .resolve(&sources, &merged(&["acme:alpha:1.0", "acme:missing:9.9"]))
        .expect_err("an unavailable coordinate must fail the run");

    match error {
        ProvisionError::DependencyUnavailable {
            coordinate,
            sources_tried,
        } => {
            assert_eq!(coordinate, coord("acme:missing:9.9"));
            assert_eq!(sources_tried.len(), 1);
        }
        other => panic!("expected DependencyUnavailable, got {other}"),
    }
}

#[test]
fn corrupted_cache_entry_is_refetched() {
    let world = World::new();
    let coordinate = coord("acme:alpha:1.0");
    let cached = world
        .cache
        .insert(&coordinate, b"alpha")
        .expect("seed the cache");
    std::fs::write(&cached, b"garbage").expect("corrupt the cached blob");

    let repo = world.repo("repo", &[("acme:alpha:1.0", b"alpha")]);
    let sources: Vec<Box<dyn ArtifactSource>> = vec![Box::new(repo)];

    let classpath = world
        .resolve(&sources, &merged(&["acme:alpha:1.0"]))
        .expect("corrupt entry is replaced from the source");

    assert_eq!(classpath.len(), 1);
    assert_eq!(
        std::fs::read(&classpath.entries()[0]).expect("read repaired blob"),
        b"alpha"
    );
}

#[test]
fn digest_mismatch_falls_through_to_the_next_source() {
    let world = World::new();
    let tampered = world.repo("tampered", &[("acme:alpha:1.0", b"evil twin")]);
    let trusted = world.repo("trusted", &[("acme:alpha:1.0", b"alpha")]);
    let sources: Vec<Box<dyn ArtifactSource>> = vec![Box::new(tampered), Box::new(trusted)];

    let mut manifest = merged(&["acme:alpha:1.0"]);
    assert!(manifest.set_expected_digest("acme", "alpha", sha256_of_bytes(b"alpha")));

    let classpath = world
        .resolve(&sources, &manifest)
        .expect("the trusted source satisfies the digest");
    assert_eq!(
        std::fs::read(&classpath.entries()[0]).expect("read resolved blob"),
        b"alpha"
    );
}

#[test]
fn bounded_concurrency_preserves_manifest_order() {
    let world = World::new();
    let specs = [
        "acme:a:1.0",
        "acme:b:1.0",
        "acme:c:1.0",
        "acme:d:1.0",
        "acme:e:1.0",
    ];
    let artifacts: Vec<(&str, &[u8])> = specs.iter().map(|s| (*s, b"jar".as_slice())).collect();
    let repo = world.repo("repo", &artifacts);
    let sources: Vec<Box<dyn ArtifactSource>> = vec![Box::new(repo)];

    let classpath = Provisioner::new(&world.cache, &sources)
        .with_max_in_flight(2)
        .resolve(&merged(&specs), &CancelToken::new())
        .expect("all artifacts resolve");

    let names: Vec<&str> = classpath
        .entries()
        .iter()
        .map(|p| p.file_name().expect("entry has a file name"))
        .collect();
    assert_eq!(
        names,
        ["a-1.0.jar", "b-1.0.jar", "c-1.0.jar", "d-1.0.jar", "e-1.0.jar"]
    );
}

#[test]
fn empty_manifests_merge_and_resolve_to_an_empty_classpath() {
    let world = World::new();
    let sources: Vec<Box<dyn ArtifactSource>> = Vec::new();
    let manifest = MergedManifest::merge(&[Manifest::default(), Manifest::default()]);

    let classpath = world.resolve(&sources, &manifest).expect("empty resolution");
    assert!(classpath.is_empty());
    assert_eq!(classpath.joined(), "");
}
