use crate::{
    config::{Config, Pass},
    error::{Error, Result},
    file::relative_path,
    scanner::Scanner,
    writer::{Outcome, Rewriter},
};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    /// Path relative to the root directory
    pub path: String,

    /// Error message
    pub error: String,
}

/// Outcome of a complete run over the site.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Pass that was run
    pub pass: Pass,

    /// Root directory of the site
    pub root_dir: String,

    /// Whether writes were suppressed
    pub dry_run: bool,

    /// Number of candidate files visited
    pub files_scanned: usize,

    /// Relative paths of files that were (or would be) rewritten
    pub changed: Vec<String>,

    /// Number of candidates left untouched because nothing matched
    pub unchanged: usize,

    /// Relative paths of files skipped because they are not valid UTF-8
    pub skipped: Vec<String>,

    /// Files that could not be read, written or visited
    pub failed: Vec<FailedFile>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,

    /// Completion timestamp (RFC 3339)
    pub generated_at: String,
}

impl RunReport {
    fn new(config: &Config) -> Self {
        Self {
            pass: config.pass,
            root_dir: config.root_dir.display().to_string(),
            dry_run: config.dry_run,
            files_scanned: 0,
            changed: Vec::new(),
            unchanged: 0,
            skipped: Vec::new(),
            failed: Vec::new(),
            duration_ms: 0,
            generated_at: String::new(),
        }
    }

    /// Returns the number of changed files.
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.changed.len()
    }

    /// Returns true if any file failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders the human-readable summary.
    #[must_use]
    pub fn render_summary(&self) -> String {
        let headline = match (self.pass, self.dry_run) {
            (Pass::FixArrows, false) => "Replaced misencoded arrows in",
            (Pass::FixArrows, true) => "Would replace misencoded arrows in",
            (Pass::RemoveButton, false) => "Removed index map buttons from",
            (Pass::RemoveButton, true) => "Would remove index map buttons from",
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{headline} {} of {} file(s) scanned{}",
            self.changed.len(),
            self.files_scanned,
            if self.changed.is_empty() { "." } else { ":" }
        );
        for path in &self.changed {
            let _ = writeln!(out, " - {path}");
        }

        if !self.skipped.is_empty() {
            let _ = writeln!(out, "Skipped {} file(s) (not valid UTF-8):", self.skipped.len());
            for path in &self.skipped {
                let _ = writeln!(out, " - {path}");
            }
        }

        if !self.failed.is_empty() {
            let _ = writeln!(out, "Failed {} file(s):", self.failed.len());
            for failed in &self.failed {
                let _ = writeln!(out, " - {}: {}", failed.path, failed.error);
            }
        }

        out
    }

    /// Prints the human-readable summary to stdout.
    pub fn print_summary(&self) {
        print!("{}", self.render_summary());
    }
}

/// Drives the tree walker and file rewriter across the site.
pub struct Pipeline {
    config: Config,
    scanner: Scanner,
    rewriter: Rewriter,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The block pattern or exclusion globs fail to compile
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let scanner = Scanner::new(&config)?;
        let rewriter = Rewriter::new(&config)?;

        Ok(Self {
            config,
            scanner,
            rewriter,
        })
    }

    /// Runs the pass over every candidate file and returns the report.
    ///
    /// Files are processed one at a time. A file that cannot be read or
    /// written is recorded in [`RunReport::failed`] and the run continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be enumerated. Nothing
    /// is modified in that case.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use site_fixup::{Config, Pass, Pipeline};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .root_dir("./site")
    ///     .pass(Pass::RemoveButton)
    ///     .build()?;
    ///
    /// let report = Pipeline::new(config)?.run()?;
    /// report.print_summary();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(pass = self.config.pass.name(), root_dir = %self.config.root_dir.display()))]
    pub fn run(self) -> Result<RunReport> {
        let start_time = Instant::now();
        let root = self.config.root_dir.as_path();
        let mut report = RunReport::new(&self.config);

        info!("Starting {} pass", self.config.pass.name());
        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping file writes");
        }

        for candidate in self.scanner.candidates()? {
            match candidate {
                Ok(path) => {
                    report.files_scanned += 1;
                    self.process(&path, root, &mut report);
                }
                Err(e) => {
                    warn!("{e}");
                    let path = match &e {
                        Error::Walk { path, .. } => relative_path(path, root),
                        _ => String::new(),
                    };
                    report.failed.push(FailedFile {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.changed.sort();
        report.skipped.sort();
        report.failed.sort_by(|a, b| a.path.cmp(&b.path));

        let elapsed = start_time.elapsed();
        report.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        report.generated_at = chrono::Local::now().to_rfc3339();

        info!(
            "✓ {} pass finished in {:.2}s: {} changed, {} unchanged, {} skipped, {} failed",
            self.config.pass.name(),
            elapsed.as_secs_f64(),
            report.changed.len(),
            report.unchanged,
            report.skipped.len(),
            report.failed.len()
        );

        Ok(report)
    }

    fn process(&self, path: &Path, root: &Path, report: &mut RunReport) {
        let relative = relative_path(path, root);

        match self.rewriter.rewrite(path) {
            Ok(Outcome::Changed) => {
                info!("Updated {relative}");
                report.changed.push(relative);
            }
            Ok(Outcome::Unchanged) => report.unchanged += 1,
            Ok(Outcome::Skipped) => {
                info!("Skipped {relative}: not valid UTF-8");
                report.skipped.push(relative);
            }
            Err(e) => {
                warn!("Failed to process {relative}: {e}");
                report.failed.push(FailedFile {
                    path: relative,
                    error: e.to_string(),
                });
            }
        }

        debug!("Processed {}", path.display());
    }
}
