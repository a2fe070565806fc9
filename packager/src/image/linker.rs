//! Image linking: producing a stripped runtime from a module spec.

use super::analysis::ModuleImageSpec;
use super::error::{ImageError, Result};
use crate::exec::CommandExecutor;
use camino::Utf8Path;

/// Links a minimal runtime image from a module spec.
#[cfg_attr(test, mockall::automock)]
pub trait ImageLinker {
    /// Produce an image for `spec` at `output_dir`.
    ///
    /// The output directory must not exist; the caller prepares it.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Link`] when the linker rejects the spec, or
    /// [`ImageError::ToolUnavailable`] when the tool cannot be spawned.
    fn link(&self, spec: &ModuleImageSpec, output_dir: &Utf8Path) -> Result<()>;
}

/// Production linker shelling out to `jlink`.
pub struct JlinkLinker<'a> {
    executor: &'a dyn CommandExecutor,
}

impl<'a> JlinkLinker<'a> {
    /// The tool name invoked on the build host.
    pub const TOOL: &'static str = "jlink";

    /// Create a linker running `jlink` through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self { executor }
    }
}

impl ImageLinker for JlinkLinker<'_> {
    fn link(&self, spec: &ModuleImageSpec, output_dir: &Utf8Path) -> Result<()> {
        let args = vec![
            "--add-modules".to_owned(),
            spec.modules_arg(),
            "--strip-debug".to_owned(),
            "--no-header-files".to_owned(),
            "--no-man-pages".to_owned(),
            "--compress".to_owned(),
            "zip-6".to_owned(),
            "--output".to_owned(),
            output_dir.as_str().to_owned(),
        ];
        let output = self
            .executor
            .run(Self::TOOL, &args)
            .map_err(|source| ImageError::ToolUnavailable {
                tool: Self::TOOL.to_owned(),
                source,
            })?;
        if !output.status_ok {
            return Err(ImageError::Link {
                reason: if output.stderr.trim().is_empty() {
                    output.stdout.trim().to_owned()
                } else {
                    output.stderr.trim().to_owned()
                },
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{ExecOutput, MockCommandExecutor};
    use std::collections::BTreeSet;
    use stevedore_common::platform::Platform;

    fn spec() -> ModuleImageSpec {
        ModuleImageSpec {
            platform: Platform::Linux64,
            modules: BTreeSet::from(["java.base".to_owned(), "java.desktop".to_owned()]),
        }
    }

    #[test]
    fn passes_stripping_flags_and_module_list() {
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .times(1)
            .withf(|cmd, args| {
                cmd == "jlink"
                    && args.contains(&"--strip-debug".to_owned())
                    && args.contains(&"--no-header-files".to_owned())
                    && args.contains(&"--no-man-pages".to_owned())
                    && args.contains(&"java.base,java.desktop".to_owned())
                    && args.last().is_some_and(|a| a.ends_with("image"))
            })
            .returning(|_, _| {
                Ok(ExecOutput {
                    status_ok: true,
                    stdout: String::new(),
                    stderr: String::new(),
                })
            });

        let linker = JlinkLinker::new(&executor);
        linker
            .link(&spec(), Utf8Path::new("/tmp/out/image"))
            .expect("link succeeds");
    }

    #[test]
    fn linker_failure_carries_tool_diagnostics() {
        let mut executor = MockCommandExecutor::new();
        executor.expect_run().returning(|_, _| {
            Ok(ExecOutput {
                status_ok: false,
                stdout: String::new(),
                stderr: "Error: Module java.desktop not found\n".to_owned(),
            })
        });

        let linker = JlinkLinker::new(&executor);
        let error = linker
            .link(&spec(), Utf8Path::new("/tmp/out/image"))
            .expect_err("link must fail");
        assert!(error.to_string().contains("java.desktop not found"));
    }
}
