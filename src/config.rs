use crate::error::{Error, Result};
use crate::filter::{FileFilter, FileFilterConfig};
use crate::transform::{ArrowFix, BlockPattern, Transform};
use serde::Serialize;
use std::path::PathBuf;

const DEFAULT_EXTENSION: &str = "html";
const DEFAULT_HOME_FILE: &str = "index.html";
const DEFAULT_MARKER_CLASS: &str = "index-map-btn";

/// Rewrite pass to run over the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pass {
    /// Repair arrow glyphs corrupted by a UTF-8 / Windows-1252 mix-up
    FixArrows,
    /// Comment out the marked navigation button on every page but the home page
    RemoveButton,
}

impl Pass {
    /// Returns the name used in logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FixArrows => "fix-arrows",
            Self::RemoveButton => "remove-button",
        }
    }
}

/// Configuration for a site-fixup run.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory of the site
    pub root_dir: PathBuf,

    /// Pass to run
    pub pass: Pass,

    /// Extension of candidate files, without the leading dot
    pub extension: String,

    /// File name left untouched by the remove-button pass
    pub home_file: String,

    /// Class token identifying the button anchor
    pub marker_class: String,

    /// Glob patterns (relative to the root) excluded from the walk
    pub exclude_patterns: Vec<String>,

    /// Dry run mode (no file writes)
    pub dry_run: bool,

    /// Keep a timestamped backup of every file before rewriting it
    pub backup_existing: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use site_fixup::{Config, Pass};
    ///
    /// let config = Config::builder()
    ///     .root_dir(".")
    ///     .pass(Pass::FixArrows)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist or isn't a directory
    /// - Extension is empty or starts with a dot
    /// - Marker class is not a single token
    /// - An exclusion glob is malformed
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.exists() {
            return Err(Error::config(format!(
                "Root directory does not exist: {}",
                self.root_dir.display()
            )));
        }

        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "Root path is not a directory: {}",
                self.root_dir.display()
            )));
        }

        if self.extension.is_empty() {
            return Err(Error::config("extension must not be empty"));
        }

        if self.extension.starts_with('.') {
            return Err(Error::config(format!(
                "extension '{}' must be given without the leading dot",
                self.extension
            )));
        }

        if self.home_file.is_empty() {
            return Err(Error::config("home_file must not be empty"));
        }

        if self.marker_class.is_empty()
            || self
                .marker_class
                .chars()
                .any(|c| c.is_whitespace() || c == '"')
        {
            return Err(Error::invalid_pattern(
                &self.marker_class,
                "marker class must be a single class token",
            ));
        }

        FileFilter::build_globset(&self.exclude_patterns)?;

        Ok(())
    }

    /// Returns the candidate filter for the configured pass.
    ///
    /// Only the remove-button pass reserves the home file.
    pub(crate) fn file_filter_config(&self) -> FileFilterConfig {
        let config = FileFilterConfig::new(&self.extension)
            .exclude_patterns(self.exclude_patterns.clone());

        match self.pass {
            Pass::FixArrows => config,
            Pass::RemoveButton => config.exclude_names(vec![self.home_file.clone()]),
        }
    }

    /// Creates the content transformer for the configured pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the block pattern fails to compile.
    pub(crate) fn transform(&self) -> Result<Box<dyn Transform>> {
        Ok(match self.pass {
            Pass::FixArrows => Box::new(ArrowFix::default()),
            Pass::RemoveButton => Box::new(BlockPattern::new("div", "a", &self.marker_class)?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            pass: Pass::FixArrows,
            extension: DEFAULT_EXTENSION.to_string(),
            home_file: DEFAULT_HOME_FILE.to_string(),
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            exclude_patterns: Vec::new(),
            dry_run: false,
            backup_existing: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    pass: Option<Pass>,
    extension: Option<String>,
    home_file: Option<String>,
    marker_class: Option<String>,
    exclude_patterns: Vec<String>,
    dry_run: bool,
    backup_existing: bool,
}

impl ConfigBuilder {
    /// Sets the root directory of the site.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the pass to run.
    #[must_use]
    pub fn pass(mut self, pass: Pass) -> Self {
        self.pass = Some(pass);
        self
    }

    /// Sets the candidate file extension (without the leading dot).
    #[must_use]
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = Some(ext.into());
        self
    }

    /// Sets the home page file name kept intact by the remove-button pass.
    #[must_use]
    pub fn home_file(mut self, name: impl Into<String>) -> Self {
        self.home_file = Some(name.into());
        self
    }

    /// Sets the class token identifying the button anchor.
    #[must_use]
    pub fn marker_class(mut self, class: impl Into<String>) -> Self {
        self.marker_class = Some(class.into());
        self
    }

    /// Sets glob patterns excluded from the walk.
    ///
    /// Patterns are matched against paths relative to the root; a matching
    /// directory excludes everything below it.
    #[must_use]
    pub fn exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Enables or disables timestamped backups before rewriting.
    #[must_use]
    pub fn backup_existing(mut self, enabled: bool) -> Self {
        self.backup_existing = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            root_dir: self.root_dir.unwrap_or_else(|| PathBuf::from(".")),
            pass: self.pass.unwrap_or(Pass::FixArrows),
            extension: self
                .extension
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
            home_file: self
                .home_file
                .unwrap_or_else(|| DEFAULT_HOME_FILE.to_string()),
            marker_class: self
                .marker_class
                .unwrap_or_else(|| DEFAULT_MARKER_CLASS.to_string()),
            exclude_patterns: self.exclude_patterns,
            dry_run: self.dry_run,
            backup_existing: self.backup_existing,
        };

        config.validate()?;
        Ok(config)
    }
}
