//! CLI argument definitions for the provisioner.
//!
//! Separated from the binary entrypoint so the parsing surface can be
//! constructed programmatically in tests.

use crate::resolve::DEFAULT_MAX_IN_FLIGHT;
use camino::Utf8PathBuf;
use clap::Parser;

/// Provision runtime dependencies for a Gridscope installation.
#[derive(Parser, Debug)]
#[command(name = "stevedore-provision")]
#[command(version, about)]
#[command(long_about = concat!(
    "Provision runtime dependencies for a Gridscope installation.\n\n",
    "Reads one or more module dependency manifests, resolves every ",
    "coordinate against the local artifact cache and the configured ",
    "repository sources, and prints the resulting classpath on stdout.\n\n",
    "Resolution is all-or-nothing: if any coordinate cannot be satisfied, ",
    "nothing is printed and the exit code is non-zero.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Provision from a single manifest with the default cache:\n",
    "    $ stevedore-provision -m app-deps.txt -c repositories.toml\n\n",
    "  Merge several module manifests:\n",
    "    $ stevedore-provision -m app-deps.txt -m plugins-deps.txt -c repositories.toml\n\n",
    "  Limit concurrent downloads:\n",
    "    $ stevedore-provision -m app-deps.txt -c repositories.toml -j 2\n",
))]
pub struct Cli {
    /// Module dependency manifest (can be repeated; merged in order).
    #[arg(short, long = "manifest", value_name = "FILE", required = true)]
    pub manifest: Vec<Utf8PathBuf>,

    /// Repository configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Artifact cache directory [default: platform-specific].
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Maximum concurrent downloads.
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_MAX_IN_FLIGHT)]
    pub jobs: usize,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}
