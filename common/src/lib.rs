//! Shared value types for the Stevedore distribution toolkit.
//!
//! Stevedore packages the Gridscope desktop application for distribution:
//! build-time tools generate per-module dependency manifests, assemble
//! filtered platform packages, and produce minimal runtime images, while a
//! runtime provisioner downloads and caches third-party artifacts before
//! the application starts.
//!
//! This crate holds the vocabulary those tools share:
//!
//! - [`coordinate`] - validated artifact coordinates (`group:name:version`)
//! - [`digest`] - SHA-256 digests and file hashing
//! - [`manifest`] - dependency manifests, their line format, and merging
//! - [`platform`] - supported target platforms and their conventions

pub mod coordinate;
pub mod digest;
pub mod manifest;
pub mod platform;

pub use coordinate::{ArtifactCoordinate, CoordinateError};
pub use digest::{Sha256Digest, compute_sha256, sha256_of_bytes};
pub use manifest::{Manifest, ManifestEntry, ManifestError, MergedManifest};
pub use platform::{Platform, PlatformError};
