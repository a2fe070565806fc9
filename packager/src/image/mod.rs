//! Minimal runtime image building and distributable bundling.
//!
//! Shrinks the JVM shipped with an installer to the modules the
//! application actually references: static analysis over the assembled
//! package and its classpath yields a module set, the linker produces a
//! stripped image from it, and bundling adds the application archive plus
//! a launcher script and wraps the lot in a platform-appropriate archive.
//!
//! The JDK tool invocations sit behind [`analysis::ModuleAnalyzer`] and
//! [`linker::ImageLinker`] so the orchestration in [`bundle`] is testable
//! without a JDK on the build host.

pub mod analysis;
pub mod bundle;
pub mod error;
pub mod launcher;
pub mod linker;

pub use analysis::{JdepsAnalyzer, ModuleAnalysis, ModuleAnalyzer, ModuleImageSpec};
pub use bundle::{BundleOutput, BundleParams, build_runtime_image, prepare_output_dir};
pub use error::ImageError;
pub use linker::{ImageLinker, JlinkLinker};
