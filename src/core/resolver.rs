use crate::domain::model::CopyOutcome;
use crate::utils::error::{Result, VoucherError};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Ordered list of source roots; earlier roots win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoots {
    roots: Vec<PathBuf>,
}

impl SourceRoots {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// First `root/identifier` that is a directory, in root order.
    pub fn locate(&self, identifier: &str) -> Option<PathBuf> {
        if !is_plain_name(identifier) {
            tracing::warn!(
                "Identifier '{}' is not a plain directory name, treating as not found",
                identifier
            );
            return None;
        }
        self.roots
            .iter()
            .map(|root| root.join(identifier))
            .find(|candidate| candidate.is_dir())
    }

    /// Copies the first matching source directory to `destination_folder/identifier`.
    ///
    /// An existing entry at the destination is never touched. A failed copy is
    /// reported as-is and not retried against later roots; whatever was already
    /// written stays in place.
    pub fn resolve_and_copy(&self, identifier: &str, destination_folder: &Path) -> CopyOutcome {
        let Some(source) = self.locate(identifier) else {
            tracing::debug!("'{}' not found in {} source roots", identifier, self.roots.len());
            return CopyOutcome::NotFound;
        };

        let destination = destination_folder.join(identifier);
        // 任何既有項目（檔案、目錄或失效的連結）都視為已複製
        if fs::symlink_metadata(&destination).is_ok() {
            tracing::debug!("Destination {} already exists", destination.display());
            return CopyOutcome::Skipped;
        }

        match copy_tree(&source, &destination) {
            Ok(files) => {
                tracing::debug!(
                    "Copied {} files from {} to {}",
                    files,
                    source.display(),
                    destination.display()
                );
                CopyOutcome::Success { source }
            }
            Err(e) => {
                tracing::warn!("Copy of {} failed: {}", source.display(), e);
                CopyOutcome::CopyError {
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl From<Vec<PathBuf>> for SourceRoots {
    fn from(roots: Vec<PathBuf>) -> Self {
        Self::new(roots)
    }
}

/// Recursively copies `source` into `destination`, following symlinks.
///
/// Returns the number of regular files copied.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<usize> {
    let mut files = 0usize;
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| VoucherError::ProcessingError {
                message: format!("{}: {}", entry.path().display(), e),
            })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }
    Ok(files)
}

/// 只接受單一、一般的路徑元件，避免 `..` 或分隔符跳出來源目錄
fn is_plain_name(identifier: &str) -> bool {
    if identifier.contains(|c: char| c == '/' || c == '\\') {
        return false;
    }
    let mut components = Path::new(identifier).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_source(root: &Path, identifier: &str, marker: &str) -> PathBuf {
        let dir = root.join(identifier);
        fs::create_dir_all(dir.join("scans")).unwrap();
        fs::write(dir.join("voucher.txt"), marker).unwrap();
        fs::write(dir.join("scans").join("page1.jpg"), b"\xff\xd8jpeg").unwrap();
        dir
    }

    #[test]
    fn test_first_root_wins() {
        let temp = TempDir::new().unwrap();
        let s1 = temp.path().join("S1");
        let s2 = temp.path().join("S2");
        make_source(&s1, "A001", "from s1");
        make_source(&s2, "A001", "from s2");
        let dest = temp.path().join("PZIMG");
        fs::create_dir_all(&dest).unwrap();

        let roots = SourceRoots::new(vec![s1.clone(), s2]);
        let outcome = roots.resolve_and_copy("A001", &dest);

        assert_eq!(
            outcome,
            CopyOutcome::Success {
                source: s1.join("A001")
            }
        );
        assert_eq!(
            fs::read_to_string(dest.join("A001").join("voucher.txt")).unwrap(),
            "from s1"
        );
        assert_eq!(
            fs::read(dest.join("A001").join("scans").join("page1.jpg")).unwrap(),
            b"\xff\xd8jpeg"
        );
    }

    #[test]
    fn test_later_root_used_when_earlier_lacks_directory() {
        let temp = TempDir::new().unwrap();
        let s1 = temp.path().join("S1");
        let s2 = temp.path().join("S2");
        fs::create_dir_all(&s1).unwrap();
        // 同名檔案不算目錄
        fs::write(s1.join("A002"), "not a dir").unwrap();
        make_source(&s2, "A002", "from s2");

        let roots = SourceRoots::new(vec![s1, s2.clone()]);
        assert_eq!(roots.locate("A002"), Some(s2.join("A002")));
    }

    #[test]
    fn test_second_run_skips_and_keeps_content() {
        let temp = TempDir::new().unwrap();
        let s1 = temp.path().join("S1");
        let source = make_source(&s1, "A001", "original");
        let dest = temp.path().join("PZIMG");
        fs::create_dir_all(&dest).unwrap();
        let roots = SourceRoots::new(vec![s1]);

        assert!(matches!(
            roots.resolve_and_copy("A001", &dest),
            CopyOutcome::Success { .. }
        ));

        fs::write(source.join("voucher.txt"), "changed").unwrap();
        assert_eq!(roots.resolve_and_copy("A001", &dest), CopyOutcome::Skipped);
        assert_eq!(
            fs::read_to_string(dest.join("A001").join("voucher.txt")).unwrap(),
            "original"
        );
    }

    #[test]
    fn test_existing_file_at_destination_counts_as_copied() {
        let temp = TempDir::new().unwrap();
        let s1 = temp.path().join("S1");
        make_source(&s1, "A001", "x");
        let dest = temp.path().join("PZIMG");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("A001"), "placeholder").unwrap();

        let roots = SourceRoots::new(vec![s1]);
        assert_eq!(roots.resolve_and_copy("A001", &dest), CopyOutcome::Skipped);
        assert_eq!(fs::read_to_string(dest.join("A001")).unwrap(), "placeholder");
    }

    #[test]
    fn test_not_found_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let s1 = temp.path().join("S1");
        fs::create_dir_all(&s1).unwrap();
        let dest = temp.path().join("PZIMG");
        fs::create_dir_all(&dest).unwrap();

        let roots = SourceRoots::new(vec![s1]);
        assert_eq!(roots.resolve_and_copy("A404", &dest), CopyOutcome::NotFound);
        assert!(!dest.join("A404").exists());
    }

    #[test]
    fn test_copy_failure_is_reported_not_retried() {
        let temp = TempDir::new().unwrap();
        let s1 = temp.path().join("S1");
        let s2 = temp.path().join("S2");
        make_source(&s1, "A001", "s1");
        make_source(&s2, "A001", "s2");
        // 目的地的上層是檔案，建立目錄一定失敗
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "file").unwrap();

        let roots = SourceRoots::new(vec![s1, s2]);
        let outcome = roots.resolve_and_copy("A001", &blocker);

        assert!(matches!(outcome, CopyOutcome::CopyError { .. }));
    }

    #[test]
    fn test_path_like_identifiers_are_not_found() {
        let temp = TempDir::new().unwrap();
        let s1 = temp.path().join("S1");
        make_source(&s1, "A001", "x");
        make_source(temp.path(), "outside", "x");

        let roots = SourceRoots::new(vec![s1]);
        assert_eq!(roots.locate("../outside"), None);
        assert_eq!(roots.locate(".."), None);
        assert_eq!(roots.locate("."), None);
        assert_eq!(roots.locate("A001/scans"), None);
        assert!(roots.locate("A001").is_some());
    }

    #[test]
    fn test_copy_tree_counts_files() {
        let temp = TempDir::new().unwrap();
        let source = make_source(temp.path(), "A001", "x");
        fs::create_dir_all(source.join("empty")).unwrap();
        let target = temp.path().join("out").join("A001");

        let files = copy_tree(&source, &target).unwrap();

        assert_eq!(files, 2);
        assert!(target.join("empty").is_dir());
    }
}
