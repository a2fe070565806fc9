//! Launcher script generation.
//!
//! The bundled scripts do one thing: invoke the image's own `java` on the
//! application archive next to them, forwarding arguments.

use super::error::{ImageError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use stevedore_common::platform::Platform;

/// Render the launcher script body for a platform.
#[must_use]
pub fn launcher_script(platform: Platform, app_name: &str) -> String {
    if platform.is_windows() {
        format!(
            "@echo off\r\n\
             \"%~dp0java.exe\" -jar \"%~dp0{app_name}.jar\" %*\r\n"
        )
    } else {
        format!(
            "#!/bin/sh\n\
             DIR=\"$(dirname \"$0\")\"\n\
             exec \"$DIR/java\" -jar \"$DIR/{app_name}.jar\" \"$@\"\n"
        )
    }
}

/// Write the launcher script into `bin_dir` and return its path.
///
/// On Unix hosts the script is made executable.
///
/// # Errors
///
/// Returns [`ImageError::Io`] if the script cannot be written.
pub fn write_launcher(
    bin_dir: &Utf8Path,
    platform: Platform,
    app_name: &str,
) -> Result<Utf8PathBuf> {
    let path = bin_dir.join(platform.launcher_script_name(app_name));
    let io_err = |source| ImageError::Io {
        path: path.clone(),
        source,
    };
    std::fs::write(&path, launcher_script(platform, app_name)).map_err(io_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .map_err(io_err)?;
    }

    Ok(path)
}
