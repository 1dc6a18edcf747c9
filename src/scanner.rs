use crate::{
    config::Config,
    error::{Error, Result},
    filter::FileFilter,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Walks the site tree and yields candidate files for a pass.
pub(crate) struct Scanner {
    root_dir: PathBuf,
    file_filter: FileFilter,
}

impl Scanner {
    /// Creates a new scanner from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the exclusion globs fail to compile.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            root_dir: config.root_dir.clone(),
            file_filter: FileFilter::new(config.file_filter_config())?,
        })
    }

    /// Returns a lazy iterator over candidate file paths.
    ///
    /// Order follows directory-entry order. Symbolic links are not followed.
    /// Entries below the root that cannot be read are yielded as errors so
    /// the caller can report them and keep going.
    ///
    /// # Errors
    ///
    /// Returns an error up front if the root is missing, not a directory, or
    /// not readable.
    pub(crate) fn candidates(&self) -> Result<impl Iterator<Item = Result<PathBuf>> + '_> {
        let metadata = fs::metadata(&self.root_dir).map_err(|e| Error::io(&self.root_dir, e))?;
        if !metadata.is_dir() {
            return Err(Error::config(format!(
                "Root path is not a directory: {}",
                self.root_dir.display()
            )));
        }
        fs::read_dir(&self.root_dir).map_err(|e| Error::io(&self.root_dir, e))?;

        debug!("Walking {}", self.root_dir.display());

        let walker = WalkDir::new(&self.root_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| !self.is_excluded_dir(entry));

        Ok(walker.filter_map(move |result| match result {
            Ok(entry) if entry.file_type().is_file() => {
                let relative = self.relative(entry.path());
                if self.file_filter.should_process(relative) {
                    trace!("Candidate: {}", entry.path().display());
                    Some(Ok(entry.into_path()))
                } else {
                    trace!("Skipping: {}", entry.path().display());
                    None
                }
            }
            Ok(_) => None,
            Err(e) => Some(Err(Error::from(e))),
        }))
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root_dir).unwrap_or(path)
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self.file_filter.is_excluded(self.relative(entry.path()))
    }
}
