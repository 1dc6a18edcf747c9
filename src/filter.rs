//! Candidate selection for the tree walker.
//!
//! Decides which files under the root are handed to a rewrite pass:
//! extension match, reserved file names, and optional glob exclusions.

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Configuration for candidate file selection.
#[derive(Debug, Clone, Default)]
pub(crate) struct FileFilterConfig {
    extension: String,
    exclude_names: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl FileFilterConfig {
    /// Creates a filter configuration accepting files with `extension`.
    ///
    /// The extension is given without the leading dot.
    pub(crate) fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..Self::default()
        }
    }

    /// Excludes files whose file name is exactly one of `names`.
    #[must_use]
    pub(crate) fn exclude_names(mut self, names: Vec<String>) -> Self {
        self.exclude_names = names;
        self
    }

    /// Excludes files and directories matching any of the glob `patterns`.
    #[must_use]
    pub(crate) fn exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FileFilter {
    suffix: String,
    exclude_names: Vec<String>,
    exclude_patterns: GlobSet,
}

impl FileFilter {
    /// Builds a filter, compiling the exclusion globs.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob pattern is malformed.
    pub(crate) fn new(config: FileFilterConfig) -> Result<Self> {
        let exclude_patterns = Self::build_globset(&config.exclude_patterns)?;

        Ok(Self {
            suffix: format!(".{}", config.extension.to_ascii_lowercase()),
            exclude_names: config.exclude_names,
            exclude_patterns,
        })
    }

    pub(crate) fn build_globset(patterns: &[String]) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;
            builder.add(glob);
        }

        builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build glob set: {e}")))
    }

    /// Returns true if the file name carries the configured extension.
    pub(crate) fn has_extension(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(&self.suffix))
    }

    /// Returns true if the file name is reserved and must be left alone.
    pub(crate) fn is_reserved(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.exclude_names.iter().any(|n| n == name))
    }

    /// Returns true if `relative` or one of its ancestors matches an exclusion glob.
    pub(crate) fn is_excluded(&self, relative: &Path) -> bool {
        if self.exclude_patterns.is_empty() {
            return false;
        }

        relative
            .ancestors()
            .filter(|p| !p.as_os_str().is_empty())
            .any(|p| self.exclude_patterns.is_match(p))
    }

    /// Returns true if the file at `relative` (path from the root) should be rewritten.
    pub(crate) fn should_process(&self, relative: &Path) -> bool {
        self.has_extension(relative) && !self.is_reserved(relative) && !self.is_excluded(relative)
    }
}
