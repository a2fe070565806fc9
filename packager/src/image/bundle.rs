//! Bundling: image plus application archive plus launcher, wrapped in a
//! distributable archive.
//!
//! The orchestration here owns the output-directory hygiene rule: an
//! image is always linked into a fresh directory. Merging into stale
//! contents could ship files from a previous build, so an unremovable
//! pre-existing directory stops the build.

use super::analysis::{ModuleAnalyzer, ModuleImageSpec, image_spec};
use super::error::{ImageError, Result};
use super::launcher::write_launcher;
use super::linker::ImageLinker;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use stevedore_common::platform::Platform;
use zip::write::SimpleFileOptions;

/// Input parameters for [`build_runtime_image`].
#[derive(Debug, Clone)]
pub struct BundleParams {
    /// Application name; names the image directory, archive, and scripts.
    pub app_name: String,
    /// The platform the bundle targets.
    pub platform: Platform,
    /// The assembled application archive.
    pub app_archive: Utf8PathBuf,
    /// Every classpath artifact the application runs with, included in
    /// the module analysis.
    pub classpath_artifacts: Vec<Utf8PathBuf>,
    /// Explicit module overrides unioned into the analyzed set.
    pub extra_modules: Vec<String>,
    /// Directory the image and distributable are written under.
    pub output_dir: Utf8PathBuf,
}

/// Output produced by [`build_runtime_image`].
#[derive(Debug, Clone)]
pub struct BundleOutput {
    /// Root of the linked image.
    pub image_dir: Utf8PathBuf,
    /// Path of the final distributable archive.
    pub distributable: Utf8PathBuf,
    /// The module spec the image was linked from.
    pub spec: ModuleImageSpec,
    /// Detection gaps reported by the analysis, for build diagnostics.
    pub detection_gaps: Vec<String>,
}

/// Ensure `path` does not exist, removing a pre-existing directory.
///
/// # Errors
///
/// Returns [`ImageError::StaleOutput`] when an existing directory cannot
/// be removed.
pub fn prepare_output_dir(path: &Utf8Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|source| ImageError::StaleOutput {
            path: path.to_owned(),
            source,
        })?;
    }
    Ok(())
}

/// Build the minimal runtime image and wrap it as a distributable.
///
/// Steps: analyze the application archive plus its classpath, link the
/// image into a fresh directory, place the application archive and a
/// launcher script in the image's `bin/`, then archive the image root as
/// a zip (Windows targets) or tar.gz (other targets).
///
/// # Errors
///
/// Propagates analysis, linking, stale-output, and I/O failures; see
/// [`ImageError`].
pub fn build_runtime_image(
    params: &BundleParams,
    analyzer: &dyn ModuleAnalyzer,
    linker: &dyn ImageLinker,
) -> Result<BundleOutput> {
    let mut artifacts = Vec::with_capacity(params.classpath_artifacts.len() + 1);
    artifacts.push(params.app_archive.clone());
    artifacts.extend(params.classpath_artifacts.iter().cloned());
    let analysis = analyzer.analyze(&artifacts)?;
    let spec = image_spec(&analysis, params.platform, &params.extra_modules);

    std::fs::create_dir_all(&params.output_dir).map_err(|source| ImageError::Io {
        path: params.output_dir.clone(),
        source,
    })?;
    let image_dir = params
        .output_dir
        .join(format!("{}-{}", params.app_name, params.platform));
    prepare_output_dir(&image_dir)?;
    linker.link(&spec, &image_dir)?;

    let bin_dir = image_dir.join("bin");
    std::fs::create_dir_all(&bin_dir).map_err(|source| ImageError::Io {
        path: bin_dir.clone(),
        source,
    })?;
    let bundled_archive = bin_dir.join(format!("{}.jar", params.app_name));
    std::fs::copy(&params.app_archive, &bundled_archive).map_err(|source| ImageError::Io {
        path: params.app_archive.clone(),
        source,
    })?;
    write_launcher(&bin_dir, params.platform, &params.app_name)?;

    let distributable = params.output_dir.join(format!(
        "{}-{}.{}",
        params.app_name,
        params.platform,
        params.platform.distributable_extension()
    ));
    archive_image(&image_dir, &distributable, params.platform)?;

    Ok(BundleOutput {
        image_dir,
        distributable,
        spec,
        detection_gaps: analysis.gaps,
    })
}

/// Archive the image root in the platform's distributable format.
fn archive_image(image_dir: &Utf8Path, destination: &Utf8Path, platform: Platform) -> Result<()> {
    if platform.is_windows() {
        zip_directory(image_dir, destination)
    } else {
        tar_gz_directory(image_dir, destination)
    }
}

/// Return the archive prefix for an image root (its directory name).
fn image_prefix(image_dir: &Utf8Path) -> &str {
    image_dir.file_name().unwrap_or("image")
}

/// Write a deterministic zip of `image_dir`, entries prefixed with the
/// image directory name.
fn zip_directory(image_dir: &Utf8Path, destination: &Utf8Path) -> Result<()> {
    let mut files = Vec::new();
    collect_files(image_dir, image_dir, &mut files)?;
    files.sort();

    let io_err = |path: &Utf8Path| {
        let path = path.to_owned();
        move |source| ImageError::Io { path, source }
    };
    let file = std::fs::File::create(destination).map_err(io_err(destination))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());
    let prefix = image_prefix(image_dir);

    for relative in &files {
        writer
            .start_file(format!("{prefix}/{relative}"), options)
            .map_err(|source| ImageError::Zip {
                path: destination.to_owned(),
                source,
            })?;
        let source_path = image_dir.join(relative);
        let bytes = std::fs::read(&source_path).map_err(io_err(&source_path))?;
        writer.write_all(&bytes).map_err(io_err(destination))?;
    }
    writer.finish().map_err(|source| ImageError::Zip {
        path: destination.to_owned(),
        source,
    })?;
    Ok(())
}

/// Write a gzipped tar of `image_dir`, entries prefixed with the image
/// directory name so extraction yields a single root.
fn tar_gz_directory(image_dir: &Utf8Path, destination: &Utf8Path) -> Result<()> {
    let io_err = |path: &Utf8Path| {
        let path = path.to_owned();
        move |source| ImageError::Io { path, source }
    };
    let file = std::fs::File::create(destination).map_err(io_err(destination))?;
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder
        .append_dir_all(image_prefix(image_dir), image_dir)
        .map_err(io_err(destination))?;
    builder.finish().map_err(io_err(destination))?;
    Ok(())
}

/// Recursively collect `root`-relative paths of every file under `dir`.
fn collect_files(root: &Utf8Path, dir: &Utf8Path, files: &mut Vec<String>) -> Result<()> {
    let read_dir = dir.read_dir_utf8().map_err(|source| ImageError::Io {
        path: dir.to_owned(),
        source,
    })?;
    for entry in read_dir {
        let entry = entry.map_err(|source| ImageError::Io {
            path: dir.to_owned(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, path, files)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.as_str().to_owned());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::analysis::{MockModuleAnalyzer, ModuleAnalysis};
    use crate::image::linker::MockImageLinker;
    use std::collections::BTreeSet;

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("temp path is valid UTF-8");
        (dir, root)
    }

    fn params(root: &Utf8Path) -> BundleParams {
        let app_archive = root.join("app-linux64.jar");
        std::fs::write(&app_archive, b"app archive").expect("write app archive");
        BundleParams {
            app_name: "gridscope".to_owned(),
            platform: Platform::Linux64,
            app_archive,
            classpath_artifacts: vec![],
            extra_modules: vec!["jdk.crypto.ec".to_owned()],
            output_dir: root.join("dist"),
        }
    }

    fn analyzer_with(modules: &[&str], gaps: &[&str]) -> MockModuleAnalyzer {
        let analysis = ModuleAnalysis {
            modules: modules.iter().map(|m| (*m).to_owned()).collect(),
            gaps: gaps.iter().map(|g| (*g).to_owned()).collect(),
        };
        let mut analyzer = MockModuleAnalyzer::new();
        analyzer
            .expect_analyze()
            .times(1)
            .returning(move |_| Ok(analysis.clone()));
        analyzer
    }

    /// A linker stub that fabricates a plausible image layout.
    fn fake_linker() -> MockImageLinker {
        let mut linker = MockImageLinker::new();
        linker.expect_link().times(1).returning(|_, output_dir| {
            let bin = output_dir.join("bin");
            std::fs::create_dir_all(&bin).map_err(|source| ImageError::Io {
                path: bin.clone(),
                source,
            })?;
            std::fs::write(bin.join("java"), b"runtime").map_err(|source| ImageError::Io {
                path: bin.join("java"),
                source,
            })?;
            Ok(())
        });
        linker
    }

    #[test]
    fn bundle_places_archive_and_launcher_in_bin() {
        let (_guard, root) = temp_root();
        let params = params(&root);
        let analyzer = analyzer_with(&["java.desktop"], &[]);
        let linker = fake_linker();

        let output =
            build_runtime_image(&params, &analyzer, &linker).expect("bundle succeeds");

        let bin = output.image_dir.join("bin");
        assert!(bin.join("gridscope.jar").is_file());
        assert!(bin.join("gridscope").is_file());
        assert!(output.distributable.as_str().ends_with("gridscope-linux64.tar.gz"));
        assert!(output.distributable.is_file());
        assert_eq!(
            output.spec.modules_arg(),
            "java.base,java.desktop,jdk.crypto.ec"
        );
    }

    #[test]
    fn detection_gaps_propagate_to_the_bundle_output() {
        let (_guard, root) = temp_root();
        let params = params(&root);
        let analyzer = analyzer_with(&["java.base"], &["com.sun.jna not found"]);
        let linker = fake_linker();

        let output =
            build_runtime_image(&params, &analyzer, &linker).expect("bundle succeeds");
        assert_eq!(output.detection_gaps, vec!["com.sun.jna not found".to_owned()]);
    }

    #[test]
    fn pre_existing_image_directory_is_replaced() {
        let (_guard, root) = temp_root();
        let params = params(&root);
        let stale = params.output_dir.join("gridscope-linux64");
        std::fs::create_dir_all(&stale).expect("create stale image dir");
        std::fs::write(stale.join("leftover.txt"), b"old").expect("write stale file");

        let analyzer = analyzer_with(&["java.base"], &[]);
        let linker = fake_linker();
        let output =
            build_runtime_image(&params, &analyzer, &linker).expect("bundle succeeds");
        assert!(!output.image_dir.join("leftover.txt").exists());
    }

    #[test]
    fn windows_bundles_produce_zip_distributables() {
        let (_guard, root) = temp_root();
        let mut params = params(&root);
        params.platform = Platform::Win64;

        let analyzer = analyzer_with(&["java.base"], &[]);
        let linker = fake_linker();
        let output =
            build_runtime_image(&params, &analyzer, &linker).expect("bundle succeeds");
        assert!(output.distributable.as_str().ends_with("gridscope-win64.zip"));

        let file = std::fs::File::open(&output.distributable).expect("open distributable");
        let archive = zip::ZipArchive::new(file).expect("valid zip");
        assert!(archive.len() >= 3, "runtime, archive, and launcher expected");
    }

    #[test]
    fn analysis_failure_stops_the_bundle() {
        let (_guard, root) = temp_root();
        let params = params(&root);

        let mut analyzer = MockModuleAnalyzer::new();
        analyzer.expect_analyze().returning(|_| {
            Err(ImageError::Analysis {
                reason: "invalid class file".to_owned(),
            })
        });
        let mut linker = MockImageLinker::new();
        linker.expect_link().times(0);

        let error = build_runtime_image(&params, &analyzer, &linker)
            .expect_err("analysis failure must stop the bundle");
        assert!(matches!(error, ImageError::Analysis { .. }));
    }
}
