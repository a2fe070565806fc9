//! Runtime dependency provisioner for the Gridscope application.
//!
//! Gridscope installers ship only the application's own compiled modules;
//! every third-party artifact named in the module dependency manifests is
//! resolved at first launch, downloaded from an ordered list of repository
//! sources, verified, and cached locally. This crate makes the resolved
//! classpath available before the application's entry point runs: the
//! `stevedore-provision` binary is invoked by the launcher, prints the
//! classpath on success, and refuses to let a partial classpath launch.
//!
//! # Modules
//!
//! - [`cache`] - durable coordinate-keyed artifact cache with atomic writes
//! - [`classpath`] - the ordered, manifest-order resolved classpath
//! - [`cli`] - command-line argument definitions
//! - [`dirs`] - directory resolution abstraction for the default cache path
//! - [`error`] - top-level launch error type
//! - [`repo_config`] - repository-list configuration loading
//! - [`resolve`] - bounded-concurrency resolution against cache and sources
//! - [`source`] - fetch-by-coordinate repository sources (local and HTTP)

pub mod cache;
pub mod classpath;
pub mod cli;
pub mod dirs;
pub mod error;
pub mod repo_config;
pub mod resolve;
pub mod source;

pub use cache::{CacheError, DirCache};
pub use classpath::Classpath;
pub use error::LaunchError;
pub use resolve::{CancelToken, ProvisionError, Provisioner};
pub use source::{ArtifactSource, DirSource, HttpSource, SourceError};
