//! Gridscope dependency provisioner CLI entrypoint.
//!
//! Reads module dependency manifests, resolves every coordinate against
//! the local cache and the configured repository sources, and prints the
//! resulting classpath on stdout for the launcher to consume. Progress
//! and errors go to stderr so stdout stays machine-readable.

use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;
use stevedore_common::manifest::{Manifest, MergedManifest};
use stevedore_provisioner::cli::Cli;
use stevedore_provisioner::dirs::{SystemBaseDirs, default_cache_root};
use stevedore_provisioner::error::{LaunchError, Result};
use stevedore_provisioner::repo_config::{ProvisionConfig, build_sources, load_config};
use stevedore_provisioner::resolve::{CancelToken, Provisioner};
use stevedore_provisioner::{ArtifactSource, Classpath, DirCache};

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let merged = merge_manifests(&cli.manifest)?;
    let sources = configured_sources(cli.config.as_deref())?;
    let cache = DirCache::new(determine_cache_root(cli.cache_dir.clone())?);

    if !cli.quiet {
        write_stderr_line(
            stderr,
            format!(
                "Provisioning {} dependenc{} ({} source{}, cache {})...",
                merged.len(),
                if merged.len() == 1 { "y" } else { "ies" },
                sources.len(),
                if sources.len() == 1 { "" } else { "s" },
                cache.root()
            ),
        );
    }

    let classpath = Provisioner::new(&cache, &sources)
        .with_max_in_flight(cli.jobs)
        .resolve(&merged, &CancelToken::new())?;

    print_classpath(&classpath, stdout);
    Ok(())
}

/// Read and merge the manifest files in command-line order.
fn merge_manifests(paths: &[Utf8PathBuf]) -> Result<MergedManifest> {
    let mut manifests = Vec::with_capacity(paths.len());
    for path in paths {
        let manifest = Manifest::read_from(path).map_err(|source| LaunchError::Manifest {
            path: path.clone(),
            source,
        })?;
        manifests.push(manifest);
    }
    Ok(MergedManifest::merge(&manifests))
}

/// Load the repository configuration, or default to no sources when no
/// file is given (a warm cache can still satisfy the manifests).
fn configured_sources(config: Option<&camino::Utf8Path>) -> Result<Vec<Box<dyn ArtifactSource>>> {
    let config = match config {
        Some(path) => load_config(path)?,
        None => ProvisionConfig::default(),
    };
    Ok(build_sources(&config))
}

/// Use the explicit cache directory or fall back to the per-user default.
fn determine_cache_root(explicit: Option<Utf8PathBuf>) -> Result<Utf8PathBuf> {
    explicit
        .or_else(|| default_cache_root(&SystemBaseDirs))
        .ok_or(LaunchError::NoCacheDir)
}

/// Print the joined classpath as the sole stdout line.
fn print_classpath(classpath: &Classpath, stdout: &mut dyn Write) {
    if writeln!(stdout, "{}", classpath.joined()).is_err() {
        // Best-effort output; a broken pipe is the caller's concern.
    }
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
