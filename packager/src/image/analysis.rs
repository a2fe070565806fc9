//! Static module analysis over the assembled package and its classpath.
//!
//! Production analysis shells out to `jdeps --print-module-deps`. The
//! tool fails outright when a classpath reference cannot be classified;
//! in that case the analysis retries with `--ignore-missing-deps` and
//! surfaces every unresolved reference as a detection gap, logged and
//! returned, never silently dropped. Gaps are expected for reflective
//! frameworks, which is why explicit module overrides exist.

use super::error::{ImageError, Result};
use crate::exec::CommandExecutor;
use camino::Utf8PathBuf;
use std::collections::BTreeSet;
use stevedore_common::platform::Platform;

/// The module set to link for one platform, computed once per build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleImageSpec {
    /// The platform the image targets.
    pub platform: Platform,
    /// The sorted set of JVM modules to include.
    pub modules: BTreeSet<String>,
}

impl ModuleImageSpec {
    /// Render the module set as a comma-separated `--add-modules` value.
    #[must_use]
    pub fn modules_arg(&self) -> String {
        self.modules.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

/// The outcome of static module analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleAnalysis {
    /// JVM modules the analyzed artifacts reference.
    pub modules: BTreeSet<String>,
    /// References the analyzer could not classify.
    pub gaps: Vec<String>,
}

/// Computes the JVM module set a set of artifacts requires.
#[cfg_attr(test, mockall::automock)]
pub trait ModuleAnalyzer {
    /// Analyze the artifacts and return the referenced modules plus any
    /// detection gaps.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Analysis`] when the analysis cannot produce
    /// a module set at all, or [`ImageError::ToolUnavailable`] when the
    /// tool cannot be spawned.
    fn analyze(&self, artifacts: &[Utf8PathBuf]) -> Result<ModuleAnalysis>;
}

/// Production analyzer shelling out to `jdeps`.
pub struct JdepsAnalyzer<'a> {
    executor: &'a dyn CommandExecutor,
}

impl<'a> JdepsAnalyzer<'a> {
    /// The tool name invoked on the build host.
    pub const TOOL: &'static str = "jdeps";

    /// Create an analyzer running `jdeps` through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self { executor }
    }

    fn run_jdeps(&self, ignore_missing: bool, artifacts: &[Utf8PathBuf]) -> Result<crate::exec::ExecOutput> {
        let mut args = Vec::with_capacity(artifacts.len() + 2);
        if ignore_missing {
            args.push("--ignore-missing-deps".to_owned());
        }
        args.push("--print-module-deps".to_owned());
        args.extend(artifacts.iter().map(|p| p.as_str().to_owned()));
        self.executor
            .run(Self::TOOL, &args)
            .map_err(|source| ImageError::ToolUnavailable {
                tool: Self::TOOL.to_owned(),
                source,
            })
    }
}

impl ModuleAnalyzer for JdepsAnalyzer<'_> {
    fn analyze(&self, artifacts: &[Utf8PathBuf]) -> Result<ModuleAnalysis> {
        let strict = self.run_jdeps(false, artifacts)?;
        if strict.status_ok {
            return Ok(ModuleAnalysis {
                modules: parse_module_list(&strict.stdout),
                gaps: Vec::new(),
            });
        }

        // Unclassifiable references fail the strict run. Retry leniently
        // and keep the strict run's diagnostics as detection gaps.
        let gaps = collect_gaps(&strict.stderr, &strict.stdout);
        let lenient = self.run_jdeps(true, artifacts)?;
        if !lenient.status_ok {
            return Err(ImageError::Analysis {
                reason: if lenient.stderr.trim().is_empty() {
                    lenient.stdout.trim().to_owned()
                } else {
                    lenient.stderr.trim().to_owned()
                },
            });
        }

        for gap in &gaps {
            log::warn!("module detection gap: {gap}");
        }
        Ok(ModuleAnalysis {
            modules: parse_module_list(&lenient.stdout),
            gaps,
        })
    }
}

/// Parse the comma-separated module list `--print-module-deps` emits.
fn parse_module_list(stdout: &str) -> BTreeSet<String> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| {
            line.split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Extract unresolved-reference lines from strict-run diagnostics.
fn collect_gaps(stderr: &str, stdout: &str) -> Vec<String> {
    stderr
        .lines()
        .chain(stdout.lines())
        .map(str::trim)
        .filter(|line| line.contains("not found"))
        .map(str::to_owned)
        .collect()
}

/// Compute the image spec: analyzed modules, explicit overrides, and the
/// always-required base module.
#[must_use]
pub fn image_spec(
    analysis: &ModuleAnalysis,
    platform: Platform,
    extra_modules: &[String],
) -> ModuleImageSpec {
    let mut modules = analysis.modules.clone();
    modules.extend(extra_modules.iter().cloned());
    modules.insert("java.base".to_owned());
    ModuleImageSpec { platform, modules }
}
