//! Gridscope packaging CLI entrypoint.
//!
//! Dispatches the `manifest`, `assemble`, and `image` build steps.
//! Progress goes to stderr; the commands' products are files, so stdout
//! stays silent.

use camino::Utf8Path;
use clap::Parser;
use serde::de::DeserializeOwned;
use std::io::Write;
use stevedore_packager::assembler::{AssemblyInputs, assemble_package};
use stevedore_packager::cli::{AssembleArgs, Cli, Command, ImageArgs, ManifestArgs};
use stevedore_packager::error::{PackagerError, Result};
use stevedore_packager::exec::SystemCommandExecutor;
use stevedore_packager::image::{BundleParams, JdepsAnalyzer, JlinkLinker, build_runtime_image};
use stevedore_packager::include_rules::IncludeRules;
use stevedore_packager::manifest_gen::{DependencySet, GeneratorConfig, generate_manifest};

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Command::Manifest(args) => run_manifest(args, cli.quiet, stderr),
        Command::Assemble(args) => run_assemble(args, cli.quiet, stderr),
        Command::Image(args) => run_image(args, cli.quiet, stderr),
    }
}

/// Generate a module's dependency manifest from its resolved records.
fn run_manifest(args: &ManifestArgs, quiet: bool, stderr: &mut dyn Write) -> Result<()> {
    let set: DependencySet = read_toml(&args.input)?;
    let config: GeneratorConfig = read_toml(&args.config)?;

    let manifest = generate_manifest(&set, &config)?;
    manifest
        .write_to(&args.output)
        .map_err(|source| PackagerError::Manifest {
            path: args.output.clone(),
            source,
        })?;

    if !quiet {
        write_stderr_line(
            stderr,
            format!(
                "Wrote manifest for module {} ({} entries) to {}",
                set.module,
                manifest.len(),
                args.output
            ),
        );
    }
    Ok(())
}

/// Assemble a filtered platform application archive.
fn run_assemble(args: &AssembleArgs, quiet: bool, stderr: &mut dyn Write) -> Result<()> {
    let rules: IncludeRules = read_toml(&args.rules)?;
    let inputs = AssemblyInputs {
        trees: args.trees.clone(),
        natives: args.natives.clone(),
    };

    let package = assemble_package(
        &args.module,
        args.platform,
        &inputs,
        &rules,
        &args.output_dir,
    )?;

    if !quiet {
        write_stderr_line(
            stderr,
            format!(
                "Assembled {} ({} entries)",
                package.path, package.entry_count
            ),
        );
    }
    Ok(())
}

/// Build the minimal runtime image and distributable bundle.
fn run_image(args: &ImageArgs, quiet: bool, stderr: &mut dyn Write) -> Result<()> {
    let executor = SystemCommandExecutor;
    let analyzer = JdepsAnalyzer::new(&executor);
    let linker = JlinkLinker::new(&executor);

    let params = BundleParams {
        app_name: args.app_name.clone(),
        platform: args.platform,
        app_archive: args.app_archive.clone(),
        classpath_artifacts: args.classpath_artifacts.clone(),
        extra_modules: args.extra_modules.clone(),
        output_dir: args.output_dir.clone(),
    };
    let output = build_runtime_image(&params, &analyzer, &linker)?;

    for gap in &output.detection_gaps {
        write_stderr_line(stderr, format!("warning: module detection gap: {gap}"));
    }
    if !quiet {
        write_stderr_line(
            stderr,
            format!(
                "Linked image with modules {} and wrote {}",
                output.spec.modules_arg(),
                output.distributable
            ),
        );
    }
    Ok(())
}

/// Read and parse a TOML descriptor file.
fn read_toml<T: DeserializeOwned>(path: &Utf8Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| PackagerError::Descriptor {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;
    toml::from_str(&text).map_err(|e| PackagerError::Descriptor {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}
