use crate::{
    config::Config,
    error::{Error, Result},
    file::FileEntry,
    transform::Transform,
};
use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::debug;

/// What happened to a single candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Content changed (and was written back unless in dry run mode)
    Changed,
    /// Nothing matched; the file was not written
    Unchanged,
    /// Content was not valid UTF-8; the file was not transformed
    Skipped,
}

/// Reads, transforms and conditionally writes back candidate files.
pub(crate) struct Rewriter {
    root_dir: PathBuf,
    transform: Box<dyn Transform>,
    dry_run: bool,
    backup_existing: bool,
}

impl Rewriter {
    /// Creates a new rewriter from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformer cannot be built.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            root_dir: config.root_dir.clone(),
            transform: config.transform()?,
            dry_run: config.dry_run,
            backup_existing: config.backup_existing,
        })
    }

    /// Rewrites the file at `path` in place if the transform changes it.
    ///
    /// A file that is not valid UTF-8 yields [`Outcome::Skipped`]. A file
    /// with no match is never opened for writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub(crate) fn rewrite(&self, path: &Path) -> Result<Outcome> {
        let entry = match FileEntry::load(path, &self.root_dir) {
            Ok(entry) => entry,
            Err(e) if e.is_invalid_utf8() => {
                debug!("Skipping non-UTF-8 file: {}", path.display());
                return Ok(Outcome::Skipped);
            }
            Err(e) => return Err(e),
        };

        let Some(content) = self.transform.apply(&entry.content).into_changed() else {
            debug!("No {} match in {}", self.transform.name(), entry.relative_path);
            return Ok(Outcome::Unchanged);
        };

        if self.dry_run {
            debug!("Would rewrite {} (dry run)", entry.relative_path);
            return Ok(Outcome::Changed);
        }

        self.write_file_atomic(path, &content)?;

        debug!(
            "Rewrote {} ({} -> {} bytes)",
            entry.relative_path,
            entry.size_bytes(),
            content.len()
        );

        Ok(Outcome::Changed)
    }

    /// Replaces the contents of `path` atomically with optional backup.
    ///
    /// # Process
    ///
    /// 1. Creates a timestamped backup if backups are enabled
    /// 2. Writes content to a new sibling temporary file with the same permissions
    /// 3. Syncs the temporary file to disk
    /// 4. Renames the temporary file over the target
    ///
    /// An existing file at the temporary path is never reused or removed; the
    /// write fails instead.
    fn write_file_atomic(&self, path: &Path, content: &str) -> Result<()> {
        if self.backup_existing {
            Self::backup_file(path)?;
        }

        let permissions = fs::metadata(path)
            .map_err(|e| Error::io(path, e))?
            .permissions();

        let temp_path = Self::sibling(path, "site-fixup.tmp")?;
        let temp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;

        let result = Self::write_temp(temp_file, &temp_path, content, permissions)
            .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }

        result
    }

    fn write_temp(
        mut temp_file: File,
        temp_path: &Path,
        content: &str,
        permissions: fs::Permissions,
    ) -> Result<()> {
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| Error::io(temp_path, e))?;

        temp_file
            .sync_all()
            .map_err(|e| Error::io(temp_path, e))?;

        drop(temp_file);

        fs::set_permissions(temp_path, permissions).map_err(|e| Error::io(temp_path, e))
    }

    /// Copies the current contents of `path` to `<name>.backup.<nanos>` next to it.
    fn backup_file(path: &Path) -> Result<()> {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let backup_path = Self::sibling(path, &format!("backup.{timestamp}"))?;

        fs::copy(path, &backup_path).map_err(|e| Error::io(&backup_path, e))?;

        debug!("Created backup: {}", backup_path.display());
        Ok(())
    }

    /// Returns `<dir>/<file name>.<suffix>`.
    fn sibling(path: &Path, suffix: &str) -> Result<PathBuf> {
        let filename = path
            .file_name()
            .ok_or_else(|| Error::config(format!("Invalid file path: {}", path.display())))?
            .to_string_lossy();

        Ok(path.with_file_name(format!("{filename}.{suffix}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Pass;
    use assert_fs::prelude::*;

    const BUTTON: &str =
        r#"<div class="nav"><a href="evidence-central-index.html" class="index-map-btn">Index Map</a></div>"#;

    fn rewriter(root: &Path, pass: Pass, dry_run: bool, backup: bool) -> Rewriter {
        let config = Config::builder()
            .root_dir(root)
            .pass(pass)
            .dry_run(dry_run)
            .backup_existing(backup)
            .build()
            .unwrap();
        Rewriter::new(&config).unwrap()
    }

    fn backups(dir: &Path, name: &str) -> Vec<PathBuf> {
        let prefix = format!("{name}.backup.");
        let mut found: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(&prefix))
            })
            .collect();
        found.sort();
        found
    }

    #[test]
    fn test_rewrite_changes_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let page = temp.child("module1.html");
        page.write_str(BUTTON).unwrap();

        let outcome = rewriter(temp.path(), Pass::RemoveButton, false, false)
            .rewrite(page.path())
            .unwrap();

        assert_eq!(outcome, Outcome::Changed);
        assert_eq!(
            fs::read_to_string(page.path()).unwrap(),
            format!("<!-- {BUTTON} -->")
        );
        assert!(!temp.child("module1.html.site-fixup.tmp").exists());
    }

    #[test]
    fn test_rewrite_no_match_is_untouched() {
        let temp = assert_fs::TempDir::new().unwrap();
        let page = temp.child("module1.html");
        page.write_str("<p>plain</p>").unwrap();
        let before = fs::metadata(page.path()).unwrap().modified().unwrap();

        let outcome = rewriter(temp.path(), Pass::FixArrows, false, true)
            .rewrite(page.path())
            .unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(fs::read_to_string(page.path()).unwrap(), "<p>plain</p>");
        assert_eq!(fs::metadata(page.path()).unwrap().modified().unwrap(), before);
        assert!(backups(temp.path(), "module1.html").is_empty());
    }

    #[test]
    fn test_rewrite_skips_invalid_utf8() {
        let temp = assert_fs::TempDir::new().unwrap();
        let page = temp.child("logo.html");
        let bytes = [0x89, b'P', b'N', b'G', 0x00, 0xFF];
        page.write_binary(&bytes).unwrap();

        let outcome = rewriter(temp.path(), Pass::FixArrows, false, false)
            .rewrite(page.path())
            .unwrap();

        assert_eq!(outcome, Outcome::Skipped);
        assert_eq!(fs::read(page.path()).unwrap(), bytes);
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let page = temp.child("module1.html");
        page.write_str(BUTTON).unwrap();

        let outcome = rewriter(temp.path(), Pass::RemoveButton, true, false)
            .rewrite(page.path())
            .unwrap();

        assert_eq!(outcome, Outcome::Changed);
        assert_eq!(fs::read_to_string(page.path()).unwrap(), BUTTON);
    }

    #[test]
    fn test_backup_keeps_original() {
        let temp = assert_fs::TempDir::new().unwrap();
        let page = temp.child("module1.html");
        page.write_str("\u{00E2}\u{2020}\u{2019} Next").unwrap();

        rewriter(temp.path(), Pass::FixArrows, false, true)
            .rewrite(page.path())
            .unwrap();

        assert_eq!(fs::read_to_string(page.path()).unwrap(), "\u{2192} Next");
        let backups = backups(temp.path(), "module1.html");
        assert_eq!(backups.len(), 1);
        assert_eq!(
            fs::read_to_string(&backups[0]).unwrap(),
            "\u{00E2}\u{2020}\u{2019} Next"
        );
    }

    #[test]
    fn test_second_backup_keeps_first() {
        let temp = assert_fs::TempDir::new().unwrap();
        let page = temp.child("module1.html");
        let original = format!("{BUTTON}\u{00E2}\u{2020}\u{2019} Next");
        page.write_str(&original).unwrap();

        rewriter(temp.path(), Pass::RemoveButton, false, true)
            .rewrite(page.path())
            .unwrap();
        rewriter(temp.path(), Pass::FixArrows, false, true)
            .rewrite(page.path())
            .unwrap();

        let contents: Vec<String> = backups(temp.path(), "module1.html")
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        assert_eq!(contents.len(), 2);
        assert!(contents.contains(&original));
        assert!(contents.contains(&format!("<!-- {BUTTON} -->\u{00E2}\u{2020}\u{2019} Next")));
    }

    #[test]
    fn test_existing_temp_file_is_not_clobbered() {
        let temp = assert_fs::TempDir::new().unwrap();
        let page = temp.child("module1.html");
        page.write_str(BUTTON).unwrap();
        let user_file = temp.child("module1.html.site-fixup.tmp");
        user_file.write_str("user data").unwrap();

        let result = rewriter(temp.path(), Pass::RemoveButton, false, false).rewrite(page.path());

        assert!(result.unwrap_err().is_io());
        user_file.assert("user data");
        page.assert(BUTTON);
    }

    #[test]
    fn test_missing_file_is_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = rewriter(temp.path(), Pass::FixArrows, false, false)
            .rewrite(&temp.path().join("gone.html"));

        assert!(result.unwrap_err().is_io());
    }

    #[test]
    fn test_sibling_path() {
        let path = Rewriter::sibling(Path::new("site/page.html"), "backup.42").unwrap();
        assert_eq!(path, Path::new("site/page.html.backup.42"));
    }
}
