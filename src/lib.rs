//! # site-fixup
//!
//! In-place maintenance passes for a static HTML site.
//!
//! ## Passes
//!
//! - **fix-arrows**: repairs `←` / `→` glyphs whose UTF-8 bytes were read as
//!   Windows-1252 (`â†` + U+0090, `â†’`).
//! - **remove-button**: wraps the `<div>` holding the `index-map-btn` anchor
//!   in an HTML comment on every page except `index.html`.
//!
//! Both passes are idempotent, so re-running them is always safe.
//!
//! ## Quick Start
//!
//! ```no_run
//! use site_fixup::{Config, Pass, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir("./site")
//!     .pass(Pass::FixArrows)
//!     .build()?;
//!
//! let report = Pipeline::new(config)?.run()?;
//! report.print_summary();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Each pass is a pipeline:
//! 1. **Scanner**: Walks the tree and yields candidate files
//! 2. **Transform**: Rewrites text, reporting whether anything changed
//! 3. **Rewriter**: Writes changed files back in place
//! 4. **Pipeline**: Drives the stages and builds the [`RunReport`]

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod file;
mod filter;
mod pipeline;
mod scanner;
mod writer;

pub mod transform;

pub use config::{Config, ConfigBuilder, Pass};
pub use error::{Error, Result};
pub use file::FileEntry;
pub use pipeline::{FailedFile, Pipeline, RunReport};
pub use transform::{ArrowFix, BlockPattern, Transform, Transformed};

/// Runs a pass with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - Root directory doesn't exist or is inaccessible
///
/// Failures on individual files are not errors; they are listed in
/// [`RunReport::failed`].
///
/// # Examples
///
/// ```no_run
/// use site_fixup::{Config, Pass, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .root_dir(".")
///     .pass(Pass::RemoveButton)
///     .build()?;
///
/// let report = run(config)?;
/// println!("{} file(s) changed", report.changed_count());
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<RunReport> {
    Pipeline::new(config)?.run()
}
