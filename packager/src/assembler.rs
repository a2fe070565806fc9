//! Platform package assembly: deterministic filtered archives.
//!
//! Collects the files the inclusion rules admit from one or more compiled
//! output trees, adds the platform's native libraries under their bare
//! file names, and writes one zip per platform. Output is deterministic:
//! entries are sorted by archive path and carry a fixed timestamp, so two
//! runs over identical input produce byte-identical archives.

use crate::include_rules::IncludeRules;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use stevedore_common::platform::Platform;
use thiserror::Error;
use zip::write::SimpleFileOptions;

/// Errors arising from package assembly.
#[derive(Debug, Error)]
pub enum AssemblerError {
    /// An input tree or file could not be read, or output written.
    #[error("assembly I/O error at {path}")]
    Io {
        /// The path involved in the failure.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The zip writer rejected an entry or failed to finalize.
    #[error("zip error writing {path}")]
    Zip {
        /// Path of the archive being written.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: zip::result::ZipError,
    },
}

/// Result type alias using [`AssemblerError`].
pub type Result<T> = std::result::Result<T, AssemblerError>;

/// Input trees and native files for one platform's package.
#[derive(Debug, Clone, Default)]
pub struct AssemblyInputs {
    /// Compiled output trees to filter.
    pub trees: Vec<Utf8PathBuf>,
    /// Native library files for the target platform. May be empty.
    pub natives: Vec<Utf8PathBuf>,
}

/// A successfully assembled platform package.
#[derive(Debug, Clone)]
pub struct AssembledPackage {
    /// Path of the written archive.
    pub path: Utf8PathBuf,
    /// Number of entries in the archive.
    pub entry_count: usize,
}

/// Assemble the platform package `{module}-{platform}.jar` under
/// `output_dir`.
///
/// Directories in the input trees are always recursed; regular files are
/// admitted by `rules`. Native files are placed under their bare file
/// names; supplying none is not an error. When two inputs map to the same
/// archive path, the first wins and the collision is logged.
///
/// # Errors
///
/// Returns [`AssemblerError::Io`] if an input cannot be read or the
/// output cannot be written, or [`AssemblerError::Zip`] on archive
/// failures.
pub fn assemble_package(
    module: &str,
    platform: Platform,
    inputs: &AssemblyInputs,
    rules: &IncludeRules,
    output_dir: &Utf8Path,
) -> Result<AssembledPackage> {
    let mut entries = Vec::new();
    for tree in &inputs.trees {
        collect_tree(tree, tree, rules, &mut entries)?;
    }
    for native in &inputs.natives {
        let Some(file_name) = native.file_name() else {
            continue;
        };
        entries.push((file_name.to_owned(), native.clone()));
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    dedup_first_wins(&mut entries);

    std::fs::create_dir_all(output_dir).map_err(|source| AssemblerError::Io {
        path: output_dir.to_owned(),
        source,
    })?;
    let archive_path = output_dir.join(format!("{module}-{platform}.jar"));
    write_archive(&archive_path, &entries)?;

    Ok(AssembledPackage {
        path: archive_path,
        entry_count: entries.len(),
    })
}

/// Recursively collect admitted files from `dir`, keyed by their
/// `root`-relative archive path.
fn collect_tree(
    root: &Utf8Path,
    dir: &Utf8Path,
    rules: &IncludeRules,
    entries: &mut Vec<(String, Utf8PathBuf)>,
) -> Result<()> {
    let read_dir = dir.read_dir_utf8().map_err(|source| AssemblerError::Io {
        path: dir.to_owned(),
        source,
    })?;
    for entry in read_dir {
        let entry = entry.map_err(|source| AssemblerError::Io {
            path: dir.to_owned(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_tree(root, path, rules, entries)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            let archive_path = relative.as_str().replace('\\', "/");
            if rules.includes(&archive_path) {
                entries.push((archive_path, path.to_owned()));
            }
        }
    }
    Ok(())
}

/// Drop later duplicates from a sorted entry list, logging each collision.
fn dedup_first_wins(entries: &mut Vec<(String, Utf8PathBuf)>) {
    entries.dedup_by(|later, earlier| {
        let duplicate = later.0 == earlier.0;
        if duplicate {
            log::warn!(
                "duplicate archive entry {}: keeping {}, dropping {}",
                earlier.0,
                earlier.1,
                later.1
            );
        }
        duplicate
    });
}

/// Write the sorted entries as a deterministic zip archive.
fn write_archive(archive_path: &Utf8Path, entries: &[(String, Utf8PathBuf)]) -> Result<()> {
    let io_err = |source| AssemblerError::Io {
        path: archive_path.to_owned(),
        source,
    };
    let zip_err = |source| AssemblerError::Zip {
        path: archive_path.to_owned(),
        source,
    };

    let file = std::fs::File::create(archive_path).map_err(io_err)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    for (name, source_path) in entries {
        writer.start_file(name.as_str(), options).map_err(zip_err)?;
        let bytes = std::fs::read(source_path).map_err(|source| AssemblerError::Io {
            path: source_path.clone(),
            source,
        })?;
        writer.write_all(&bytes).map_err(io_err)?;
    }
    writer.finish().map_err(zip_err)?;
    Ok(())
}
