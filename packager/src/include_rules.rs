//! Inclusion rules for platform package assembly.
//!
//! The compiled output trees mix the application's own classes with
//! third-party classes pulled in by the build. The assembler keeps a file
//! only when its tree-relative path matches one of the configured
//! own-code path fragments, or ends with one of the vendored allow-list
//! suffixes. Java module metadata is dropped unconditionally: the
//! assembled package is a plain classpath jar, not a module.

use serde::Deserialize;

/// File names of Java module metadata, never included in packages.
const MODULE_METADATA: [&str; 2] = ["module-info.class", "module-info.java"];

/// Path-based inclusion rules for one application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludeRules {
    /// Path fragments naming own-code namespaces, e.g.
    /// `org/gridscope`. A file is included when any fragment occurs in
    /// its normalized relative path.
    #[serde(default)]
    pub fragments: Vec<String>,
    /// Exact path suffixes for vendored third-party classes shipped
    /// inline, e.g. `com/thirdparty/Util.class`.
    #[serde(default)]
    pub vendored: Vec<String>,
}

impl IncludeRules {
    /// Create rules from own-code fragments and a vendored allow-list.
    #[must_use]
    pub fn new(fragments: Vec<String>, vendored: Vec<String>) -> Self {
        Self {
            fragments,
            vendored,
        }
    }

    /// Decide whether a tree-relative path belongs in the package.
    ///
    /// The path is normalized to forward slashes before matching, so
    /// rules behave identically for trees produced on Windows.
    #[must_use]
    pub fn includes(&self, relative_path: &str) -> bool {
        let normalized = normalize(relative_path);
        if is_module_metadata(&normalized) {
            return false;
        }
        self.fragments.iter().any(|f| normalized.contains(f.as_str()))
            || self.vendored.iter().any(|v| normalized.ends_with(v.as_str()))
    }
}

/// Normalize a relative path to forward slashes.
fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Return whether the path's final component is Java module metadata.
fn is_module_metadata(normalized: &str) -> bool {
    let file_name = normalized.rsplit('/').next().unwrap_or(normalized);
    MODULE_METADATA.contains(&file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rules() -> IncludeRules {
        IncludeRules::new(
            vec!["org/gridscope".to_owned()],
            vec!["com/thirdparty/Util.class".to_owned()],
        )
    }

    #[rstest]
    #[case::own_class("org/gridscope/app/Main.class", true)]
    #[case::own_resource("org/gridscope/app/icons/logo.png", true)]
    #[case::foreign_class("com/google/common/collect/Lists.class", false)]
    #[case::vendored_match("classes/com/thirdparty/Util.class", true)]
    #[case::vendored_other("com/thirdparty/Other.class", false)]
    #[case::module_info_class("org/gridscope/module-info.class", false)]
    #[case::module_info_java("module-info.java", false)]
    fn classification(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(rules().includes(path), expected);
    }

    #[test]
    fn backslash_paths_are_normalized_before_matching() {
        assert!(rules().includes(r"org\gridscope\app\Main.class"));
        assert!(!rules().includes(r"org\gridscope\module-info.class"));
    }

    #[test]
    fn empty_rules_include_nothing() {
        let rules = IncludeRules::default();
        assert!(!rules.includes("org/gridscope/app/Main.class"));
    }
}
