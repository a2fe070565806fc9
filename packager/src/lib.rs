//! Build-time packaging tools for Gridscope distributions.
//!
//! Three build steps live here, exposed through the `stevedore-package`
//! CLI binary and usable programmatically:
//!
//! - [`manifest_gen`] turns a module's resolved build-time dependency
//!   records into the dependency manifest the installer ships.
//! - [`assembler`] (with [`include_rules`]) filters compiled output trees
//!   into one deterministic application archive per platform.
//! - [`image`] computes the JVM module set the application needs, links a
//!   stripped runtime image, and wraps image, archive, and launcher
//!   script into the final distributable.
//!
//! [`exec`] holds the external-command seam the image tools run through.

pub mod assembler;
pub mod cli;
pub mod error;
pub mod exec;
pub mod image;
pub mod include_rules;
pub mod manifest_gen;

pub use assembler::{AssembledPackage, AssemblerError, AssemblyInputs, assemble_package};
pub use error::PackagerError;
pub use exec::{CommandExecutor, ExecOutput, SystemCommandExecutor};
pub use include_rules::IncludeRules;
pub use manifest_gen::{DependencySet, GeneratorConfig, GeneratorError, generate_manifest};
