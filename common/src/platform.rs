//! Supported target platforms and their distribution conventions.
//!
//! A platform drives three things: which native-library subset ships in the
//! assembled package, which launcher script flavor the runtime image
//! bundles, and which archive format the final distributable uses.

use std::fmt;
use thiserror::Error;

/// File-name tokens that mark an artifact as a platform-qualified native
/// bundle or an all-platforms fat packaging. Matched case-insensitively
/// against `-`/`.`/`_`-delimited file-name segments.
pub const PLATFORM_FILE_TOKENS: &[&str] = &[
    "all", "natives", "windows", "win32", "win64", "linux", "linux32", "linux64", "mac", "mac64",
    "macos", "osx",
];

/// Errors arising from platform identifier parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The identifier does not name a supported platform.
    #[error("unknown platform '{input}'; expected one of win32, win64, linux32, linux64, mac64")]
    Unknown {
        /// The unrecognized identifier.
        input: String,
    },
}

/// A supported target operating system and architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    /// 32-bit Windows.
    Win32,
    /// 64-bit Windows.
    Win64,
    /// 32-bit Linux.
    Linux32,
    /// 64-bit Linux.
    Linux64,
    /// 64-bit macOS.
    Mac64,
}

impl Platform {
    /// All supported platforms, in identifier order.
    pub const ALL: [Self; 5] = [
        Self::Win32,
        Self::Win64,
        Self::Linux32,
        Self::Linux64,
        Self::Mac64,
    ];

    /// Return the canonical identifier used in file names and CLI flags.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Win32 => "win32",
            Self::Win64 => "win64",
            Self::Linux32 => "linux32",
            Self::Linux64 => "linux64",
            Self::Mac64 => "mac64",
        }
    }

    /// Return whether this platform is a Windows target.
    #[must_use]
    pub fn is_windows(self) -> bool {
        matches!(self, Self::Win32 | Self::Win64)
    }

    /// Return the classpath entry separator the platform's runtime expects.
    #[must_use]
    pub fn classpath_separator(self) -> char {
        if self.is_windows() { ';' } else { ':' }
    }

    /// Return the launcher script file name for an application.
    ///
    /// Windows targets get a batch file; everything else gets an
    /// extensionless shell script.
    ///
    /// # Examples
    ///
    /// ```
    /// use stevedore_common::platform::Platform;
    ///
    /// assert_eq!(Platform::Win64.launcher_script_name("gridscope"), "gridscope.bat");
    /// assert_eq!(Platform::Linux64.launcher_script_name("gridscope"), "gridscope");
    /// ```
    #[must_use]
    pub fn launcher_script_name(self, app_name: &str) -> String {
        if self.is_windows() {
            format!("{app_name}.bat")
        } else {
            app_name.to_owned()
        }
    }

    /// Return the file extension of the platform's distributable archive.
    #[must_use]
    pub fn distributable_extension(self) -> &'static str {
        if self.is_windows() { "zip" } else { "tar.gz" }
    }
}

impl std::str::FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, PlatformError> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.id() == s)
            .ok_or_else(|| PlatformError::Unknown {
                input: s.to_owned(),
            })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Platform::Win32, "win32")]
    #[case(Platform::Win64, "win64")]
    #[case(Platform::Linux32, "linux32")]
    #[case(Platform::Linux64, "linux64")]
    #[case(Platform::Mac64, "mac64")]
    fn identifiers_round_trip(#[case] platform: Platform, #[case] id: &str) {
        assert_eq!(platform.id(), id);
        assert_eq!(id.parse::<Platform>().expect("known id"), platform);
    }

    #[test]
    fn rejects_unknown_identifier() {
        let result = "solaris".parse::<Platform>();
        assert!(matches!(result, Err(PlatformError::Unknown { .. })));
    }

    #[test]
    fn windows_targets_use_semicolon_and_zip() {
        assert_eq!(Platform::Win64.classpath_separator(), ';');
        assert_eq!(Platform::Win64.distributable_extension(), "zip");
        assert_eq!(Platform::Linux64.classpath_separator(), ':');
        assert_eq!(Platform::Mac64.distributable_extension(), "tar.gz");
    }

    #[test]
    fn launcher_script_names_follow_platform() {
        assert_eq!(Platform::Win32.launcher_script_name("app"), "app.bat");
        assert_eq!(Platform::Mac64.launcher_script_name("app"), "app");
    }
}
