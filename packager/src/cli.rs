//! CLI argument definitions for the packaging tool.
//!
//! Separated from the binary entrypoint so the parsing surface can be
//! constructed programmatically in tests.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use stevedore_common::platform::Platform;

/// Package a Gridscope distribution.
#[derive(Parser, Debug)]
#[command(name = "stevedore-package")]
#[command(version, about)]
#[command(long_about = concat!(
    "Package a Gridscope distribution.\n\n",
    "Three build steps: generate a module's dependency manifest from its ",
    "resolved build-time records, assemble a filtered per-platform ",
    "application archive, and build a minimal runtime image bundled as a ",
    "distributable archive.",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a module's dependency manifest.
    Manifest(ManifestArgs),

    /// Assemble a platform application archive.
    Assemble(AssembleArgs),

    /// Build a minimal runtime image and distributable bundle.
    Image(ImageArgs),
}

/// Arguments for the manifest command.
#[derive(Parser, Debug, Clone)]
pub struct ManifestArgs {
    /// Resolved dependency descriptor (TOML) for one module.
    #[arg(short, long, value_name = "FILE")]
    pub input: Utf8PathBuf,

    /// Generator configuration (TOML): namespace and bundled groups.
    #[arg(short, long, value_name = "FILE")]
    pub config: Utf8PathBuf,

    /// Where to write the generated manifest.
    #[arg(short, long, value_name = "FILE")]
    pub output: Utf8PathBuf,
}

/// Arguments for the assemble command.
#[derive(Parser, Debug, Clone)]
pub struct AssembleArgs {
    /// Module name; names the output archive.
    #[arg(short, long, value_name = "NAME")]
    pub module: String,

    /// Target platform (win32, win64, linux32, linux64, mac64).
    #[arg(short, long, value_name = "PLATFORM")]
    pub platform: Platform,

    /// Compiled output tree to filter (can be repeated).
    #[arg(short, long = "tree", value_name = "DIR", required = true)]
    pub trees: Vec<Utf8PathBuf>,

    /// Native library file for the platform (can be repeated).
    #[arg(short, long = "native", value_name = "FILE")]
    pub natives: Vec<Utf8PathBuf>,

    /// Inclusion rules (TOML): own-code fragments and vendored suffixes.
    #[arg(short, long, value_name = "FILE")]
    pub rules: Utf8PathBuf,

    /// Directory to write the archive under.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Utf8PathBuf,
}

/// Arguments for the image command.
#[derive(Parser, Debug, Clone)]
pub struct ImageArgs {
    /// Application name; names the image, archive, and launcher.
    #[arg(short, long, value_name = "NAME")]
    pub app_name: String,

    /// Target platform (win32, win64, linux32, linux64, mac64).
    #[arg(short, long, value_name = "PLATFORM")]
    pub platform: Platform,

    /// The assembled application archive.
    #[arg(long, value_name = "FILE")]
    pub app_archive: Utf8PathBuf,

    /// Classpath artifact included in module analysis (can be repeated).
    #[arg(short = 'c', long = "classpath-artifact", value_name = "FILE")]
    pub classpath_artifacts: Vec<Utf8PathBuf>,

    /// Explicit module to add beyond the analyzed set (can be repeated).
    #[arg(short = 'm', long = "add-module", value_name = "MODULE")]
    pub extra_modules: Vec<String>,

    /// Directory to write the image and distributable under.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Utf8PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_manifest_subcommand() {
        let cli = Cli::parse_from([
            "stevedore-package",
            "manifest",
            "-i",
            "deps.toml",
            "-c",
            "generator.toml",
            "-o",
            "app-deps.txt",
        ]);
        match cli.command {
            Command::Manifest(args) => {
                assert_eq!(args.input, Utf8PathBuf::from("deps.toml"));
                assert_eq!(args.output, Utf8PathBuf::from("app-deps.txt"));
            }
            other => panic!("expected manifest subcommand, got {other:?}"),
        }
    }

    #[test]
    fn parses_assemble_subcommand_with_repeated_trees() {
        let cli = Cli::parse_from([
            "stevedore-package",
            "assemble",
            "-m",
            "app",
            "-p",
            "linux64",
            "-t",
            "build/classes",
            "-t",
            "build/resources",
            "-r",
            "rules.toml",
            "-o",
            "dist",
        ]);
        match cli.command {
            Command::Assemble(args) => {
                assert_eq!(args.platform, Platform::Linux64);
                assert_eq!(args.trees.len(), 2);
                assert!(args.natives.is_empty());
            }
            other => panic!("expected assemble subcommand, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_platform() {
        let result = Cli::try_parse_from([
            "stevedore-package",
            "image",
            "-a",
            "gridscope",
            "-p",
            "solaris",
            "--app-archive",
            "app.jar",
            "-o",
            "dist",
        ]);
        assert!(result.is_err());
    }
}
