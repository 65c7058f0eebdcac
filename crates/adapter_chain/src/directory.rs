//! On-disk snapshot tree: `<root>/<INDEX>/<EXPIRY>/<stamp>.csv`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::LoadError;

/// A capture tree rooted at a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDirectory {
    root: PathBuf,
}

impl SnapshotDirectory {
    /// Wraps `root`. The directory need not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one index's expiries.
    pub fn index_dir(&self, index: &str) -> PathBuf {
        self.root.join(index)
    }

    /// Directory holding one expiry's snapshots.
    pub fn expiry_dir(&self, index: &str, expiry: &str) -> PathBuf {
        self.index_dir(index).join(expiry)
    }

    /// Path for a new snapshot file.
    pub fn snapshot_path(&self, index: &str, expiry: &str, stamp: &str) -> PathBuf {
        self.expiry_dir(index, expiry).join(format!("{stamp}.csv"))
    }

    /// Expiry directory names for `index`, greatest first.
    ///
    /// A missing index directory yields an empty list.
    pub fn expiries(&self, index: &str) -> Result<Vec<String>, LoadError> {
        let dir = self.index_dir(index);
        let mut expiries: Vec<String> = entries(&dir)?
            .into_iter()
            .filter(|path| path.is_dir())
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .collect();
        expiries.sort_unstable_by(|a, b| b.cmp(a));
        Ok(expiries)
    }

    /// CSV snapshots for one expiry, newest first by file name.
    ///
    /// A missing expiry directory yields an empty list.
    pub fn files(&self, index: &str, expiry: &str) -> Result<Vec<PathBuf>, LoadError> {
        let dir = self.expiry_dir(index, expiry);
        let mut files: Vec<PathBuf> = entries(&dir)?
            .into_iter()
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        files.sort_unstable_by(|a, b| b.file_name().cmp(&a.file_name()));
        Ok(files)
    }

    /// Newest snapshot of the greatest expiry that has any.
    ///
    /// # Errors
    /// `LoadError::NoSnapshots` if no expiry of `index` holds a CSV file.
    pub fn latest(&self, index: &str) -> Result<PathBuf, LoadError> {
        let (_, mut files) = self.latest_expiry_files(index)?;
        Ok(files.swap_remove(0))
    }

    /// The two newest snapshots `(now, prev)` of the greatest expiry that
    /// has any, for flow classification.
    ///
    /// # Errors
    /// - `LoadError::NoSnapshots` if no expiry of `index` holds a CSV file
    /// - `LoadError::NotEnoughSnapshots` if that expiry holds only one
    pub fn latest_pair(&self, index: &str) -> Result<(PathBuf, PathBuf), LoadError> {
        let (expiry, files) = self.latest_expiry_files(index)?;
        let mut newest = files.into_iter();
        match (newest.next(), newest.next()) {
            (Some(now), Some(prev)) => Ok((now, prev)),
            (found, _) => Err(LoadError::NotEnoughSnapshots {
                index: index.to_string(),
                dir: self.expiry_dir(index, &expiry),
                needed: 2,
                found: usize::from(found.is_some()),
            }),
        }
    }

    fn latest_expiry_files(&self, index: &str) -> Result<(String, Vec<PathBuf>), LoadError> {
        for expiry in self.expiries(index)? {
            let files = self.files(index, &expiry)?;
            if !files.is_empty() {
                debug!(index, expiry = %expiry, files = files.len(), "selected latest expiry");
                return Ok((expiry, files));
            }
        }
        Err(LoadError::NoSnapshots {
            index: index.to_string(),
            dir: self.index_dir(index),
        })
    }
}

fn entries(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(LoadError::io(dir, e)),
    };
    read.map(|entry| entry.map(|e| e.path()).map_err(|e| LoadError::io(dir, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn tree() -> (TempDir, SnapshotDirectory) {
        let tmp = TempDir::new().unwrap();
        let dir = SnapshotDirectory::new(tmp.path());
        for (expiry, stamp) in [
            ("2025-01-23", "23_153000"),
            ("2025-01-30", "24_091500"),
            ("2025-01-30", "24_093000"),
            ("2025-01-30", "24_092000"),
        ] {
            touch(&dir.snapshot_path("Nifty", expiry, stamp));
        }
        touch(&dir.expiry_dir("Nifty", "2025-01-30").join("notes.txt"));
        fs::create_dir_all(dir.expiry_dir("Nifty", "2025-02-06")).unwrap();
        (tmp, dir)
    }

    #[test]
    fn test_expiries_greatest_first() {
        let (_tmp, dir) = tree();
        assert_eq!(
            dir.expiries("Nifty").unwrap(),
            vec!["2025-02-06", "2025-01-30", "2025-01-23"]
        );
        assert!(dir.expiries("Sensex").unwrap().is_empty());
    }

    #[test]
    fn test_files_newest_first_csv_only() {
        let (_tmp, dir) = tree();
        let names: Vec<String> = dir
            .files("Nifty", "2025-01-30")
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["24_093000.csv", "24_092000.csv", "24_091500.csv"]);
    }

    #[test]
    fn test_latest_skips_empty_expiry() {
        let (_tmp, dir) = tree();
        assert_eq!(
            dir.latest("Nifty").unwrap(),
            dir.snapshot_path("Nifty", "2025-01-30", "24_093000")
        );
    }

    #[test]
    fn test_latest_pair() {
        let (_tmp, dir) = tree();
        let (now, prev) = dir.latest_pair("Nifty").unwrap();
        assert_eq!(now, dir.snapshot_path("Nifty", "2025-01-30", "24_093000"));
        assert_eq!(prev, dir.snapshot_path("Nifty", "2025-01-30", "24_092000"));
    }

    #[test]
    fn test_latest_pair_needs_two_files() {
        let tmp = TempDir::new().unwrap();
        let dir = SnapshotDirectory::new(tmp.path());
        touch(&dir.snapshot_path("BankNifty", "2025-01-29", "29_100000"));
        assert!(matches!(
            dir.latest_pair("BankNifty"),
            Err(LoadError::NotEnoughSnapshots { needed: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_missing_index_has_no_snapshots() {
        let tmp = TempDir::new().unwrap();
        let dir = SnapshotDirectory::new(tmp.path());
        assert!(matches!(dir.latest("Nifty"), Err(LoadError::NoSnapshots { .. })));
    }
}
