use crate::error::{Result, SorterError};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The most recent relocation, kept until it is undone or superseded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub category: String,
    pub moved_at: DateTime<Utc>,
}

impl MoveRecord {
    pub fn file_name(&self) -> &str {
        self.source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }
}

/// What an undo request ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The file went back to its source path
    Restored(MoveRecord),
    /// No move has been recorded since the last undo
    NothingToUndo,
    /// A move is recorded but its file is no longer at the destination
    TargetMissing(PathBuf),
}

/// Performs category moves and keeps a single-slot history for undo
#[derive(Debug)]
pub struct MoveExecutor {
    sorted_root: PathBuf,
    last_move: Option<MoveRecord>,
    /// Dry run mode - record moves without touching the filesystem
    dry_run: bool,
}

impl MoveExecutor {
    pub fn new(sorted_root: PathBuf) -> Self {
        Self {
            sorted_root,
            last_move: None,
            dry_run: false,
        }
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn sorted_root(&self) -> &Path {
        &self.sorted_root
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.last_move.as_ref()
    }

    /// Destination folder for a category label. The label is used verbatim.
    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.sorted_root.join(category)
    }

    /// Moves `source_dir/file_name` into the category folder.
    ///
    /// Fails with an `AlreadyExists` filesystem error instead of overwriting a
    /// file of the same name. On failure the previous record is left in place.
    pub fn move_to_category(
        &mut self,
        source_dir: &Path,
        file_name: &str,
        category: &str,
    ) -> Result<MoveRecord> {
        let source_path = source_dir.join(file_name);
        let dest_dir = self.category_dir(category);
        let destination_path = dest_dir.join(file_name);

        if !self.dry_run {
            if !source_path.exists() {
                return Err(SorterError::FileSystem(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("File not found: {}", source_path.display()),
                )));
            }

            fs::create_dir_all(&dest_dir)?;

            if destination_path.exists() {
                return Err(SorterError::already_exists(&destination_path));
            }

            relocate(&source_path, &destination_path)?;
        }

        let record = MoveRecord {
            source_path,
            destination_path,
            category: category.to_string(),
            moved_at: Utc::now(),
        };

        tracing::info!(
            "Moved {} -> {}{}",
            record.source_path.display(),
            record.destination_path.display(),
            if self.dry_run { " (dry run)" } else { "" }
        );

        self.last_move = Some(record.clone());
        Ok(record)
    }

    /// Moves the last recorded file back to where it came from.
    ///
    /// The record is only cleared once the file is back; a missing target or a
    /// failed move leaves it in place.
    pub fn undo(&mut self) -> Result<UndoOutcome> {
        let record = match self.last_move.take() {
            Some(r) => r,
            None => return Ok(UndoOutcome::NothingToUndo),
        };

        if !self.dry_run {
            if !record.destination_path.exists() {
                tracing::warn!(
                    "Cannot undo, {} is gone",
                    record.destination_path.display()
                );
                let missing = record.destination_path.clone();
                self.last_move = Some(record);
                return Ok(UndoOutcome::TargetMissing(missing));
            }

            let restored = if record.source_path.exists() {
                Err(SorterError::already_exists(&record.source_path))
            } else {
                relocate(&record.destination_path, &record.source_path).map_err(SorterError::from)
            };

            if let Err(e) = restored {
                self.last_move = Some(record);
                return Err(e);
            }
        }

        tracing::info!(
            "Restored {} from {}",
            record.source_path.display(),
            record.category
        );

        Ok(UndoOutcome::Restored(record))
    }
}

/// Renames `from` to `to`, falling back to copy and delete when a rename is not possible
/// (for example across filesystems).
fn relocate(from: &Path, to: &Path) -> io::Result<()> {
    relocate_with(from, to, |f, t| fs::rename(f, t), |f| fs::remove_file(f))
}

/// `relocate` with the rename and source removal steps supplied by the caller
fn relocate_with<R, D>(from: &Path, to: &Path, rename: R, remove_source: D) -> io::Result<()>
where
    R: FnOnce(&Path, &Path) -> io::Result<()>,
    D: FnOnce(&Path) -> io::Result<()>,
{
    let rename_err = match rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    tracing::debug!(
        "Rename {} failed ({}), copying instead",
        from.display(),
        rename_err
    );

    if fs::copy(from, to).is_err() {
        fs::remove_file(to).ok();
        return Err(rename_err);
    }

    if let Err(e) = remove_source(from) {
        fs::remove_file(to).ok();
        return Err(e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(files: &[&str]) -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("images");
        let sorted = temp_dir.path().join("sorted");
        fs::create_dir(&source).unwrap();
        for name in files {
            fs::write(source.join(name), name.as_bytes()).unwrap();
        }
        (temp_dir, source, sorted)
    }

    #[test]
    fn test_executor_new() {
        let executor = MoveExecutor::new(PathBuf::from("/sorted"));
        assert!(executor.last_move().is_none());
        assert!(!executor.is_dry_run());
        assert_eq!(
            executor.category_dir("Good"),
            PathBuf::from("/sorted/Good")
        );
    }

    #[test]
    fn test_move_to_category() {
        let (_temp, source, sorted) = setup(&["a.png"]);
        let mut executor = MoveExecutor::new(sorted.clone());

        let record = executor.move_to_category(&source, "a.png", "Good").unwrap();

        assert!(!source.join("a.png").exists());
        assert_eq!(
            fs::read(sorted.join("Good").join("a.png")).unwrap(),
            b"a.png"
        );
        assert_eq!(record.category, "Good");
        assert_eq!(record.source_path, source.join("a.png"));
        assert_eq!(record.destination_path, sorted.join("Good").join("a.png"));
        assert_eq!(record.file_name(), "a.png");
        assert_eq!(executor.last_move(), Some(&record));
    }

    #[test]
    fn test_move_twice_into_same_category() {
        let (_temp, source, sorted) = setup(&["a.png", "b.png"]);
        let mut executor = MoveExecutor::new(sorted.clone());

        executor.move_to_category(&source, "a.png", "New").unwrap();
        executor.move_to_category(&source, "b.png", "New").unwrap();

        assert!(sorted.join("New").join("a.png").exists());
        assert!(sorted.join("New").join("b.png").exists());
    }

    #[test]
    fn test_move_replaces_previous_record() {
        let (_temp, source, sorted) = setup(&["a.png", "b.png"]);
        let mut executor = MoveExecutor::new(sorted);

        executor.move_to_category(&source, "a.png", "Good").unwrap();
        executor.move_to_category(&source, "b.png", "Bad").unwrap();

        let last = executor.last_move().unwrap();
        assert_eq!(last.file_name(), "b.png");
        assert_eq!(last.category, "Bad");
    }

    #[test]
    fn test_move_refuses_to_overwrite() {
        let (_temp, source, sorted) = setup(&["a.png"]);
        fs::create_dir_all(sorted.join("Good")).unwrap();
        fs::write(sorted.join("Good").join("a.png"), b"existing").unwrap();
        let mut executor = MoveExecutor::new(sorted.clone());

        let err = executor
            .move_to_category(&source, "a.png", "Good")
            .unwrap_err();

        assert_eq!(err.io_kind(), Some(io::ErrorKind::AlreadyExists));
        assert!(source.join("a.png").exists());
        assert_eq!(
            fs::read(sorted.join("Good").join("a.png")).unwrap(),
            b"existing"
        );
        assert!(executor.last_move().is_none());
    }

    #[test]
    fn test_move_missing_source_keeps_record() {
        let (_temp, source, sorted) = setup(&["a.png"]);
        let mut executor = MoveExecutor::new(sorted);
        executor.move_to_category(&source, "a.png", "Good").unwrap();

        let result = executor.move_to_category(&source, "ghost.png", "Good");

        assert_eq!(result.unwrap_err().io_kind(), Some(io::ErrorKind::NotFound));
        assert_eq!(executor.last_move().unwrap().file_name(), "a.png");
    }

    #[test]
    fn test_undo_restores_file() {
        let (_temp, source, sorted) = setup(&["a.png"]);
        let mut executor = MoveExecutor::new(sorted.clone());
        executor.move_to_category(&source, "a.png", "Good").unwrap();

        let outcome = executor.undo().unwrap();

        assert!(matches!(outcome, UndoOutcome::Restored(ref r) if r.category == "Good"));
        assert_eq!(fs::read(source.join("a.png")).unwrap(), b"a.png");
        assert!(!sorted.join("Good").join("a.png").exists());
        // The category folder is never removed
        assert!(sorted.join("Good").is_dir());
        assert!(executor.last_move().is_none());
    }

    #[test]
    fn test_undo_twice_is_nothing_to_undo() {
        let (_temp, source, sorted) = setup(&["a.png"]);
        let mut executor = MoveExecutor::new(sorted);
        executor.move_to_category(&source, "a.png", "Good").unwrap();

        executor.undo().unwrap();

        assert_eq!(executor.undo().unwrap(), UndoOutcome::NothingToUndo);
    }

    #[test]
    fn test_undo_without_move() {
        let mut executor = MoveExecutor::new(PathBuf::from("/sorted"));
        assert_eq!(executor.undo().unwrap(), UndoOutcome::NothingToUndo);
    }

    #[test]
    fn test_undo_target_missing() {
        let (_temp, source, sorted) = setup(&["a.png"]);
        let mut executor = MoveExecutor::new(sorted.clone());
        executor.move_to_category(&source, "a.png", "Good").unwrap();
        fs::remove_file(sorted.join("Good").join("a.png")).unwrap();

        let outcome = executor.undo().unwrap();

        assert_eq!(
            outcome,
            UndoOutcome::TargetMissing(sorted.join("Good").join("a.png"))
        );
        assert!(executor.last_move().is_some());
    }

    #[test]
    fn test_undo_source_occupied() {
        let (_temp, source, sorted) = setup(&["a.png"]);
        let mut executor = MoveExecutor::new(sorted.clone());
        executor.move_to_category(&source, "a.png", "Good").unwrap();
        fs::write(source.join("a.png"), b"newcomer").unwrap();

        let err = executor.undo().unwrap_err();

        assert_eq!(err.io_kind(), Some(io::ErrorKind::AlreadyExists));
        assert!(sorted.join("Good").join("a.png").exists());
        assert!(executor.last_move().is_some());
    }

    #[test]
    fn test_dry_run_move_and_undo() {
        let (_temp, source, sorted) = setup(&["a.png"]);
        let mut executor = MoveExecutor::new(sorted.clone());
        executor.set_dry_run(true);

        let record = executor.move_to_category(&source, "a.png", "Good").unwrap();

        // Nothing touched on disk
        assert!(source.join("a.png").exists());
        assert!(!sorted.exists());
        assert_eq!(record.destination_path, sorted.join("Good").join("a.png"));

        assert!(matches!(executor.undo().unwrap(), UndoOutcome::Restored(_)));
        assert!(source.join("a.png").exists());
        assert!(executor.last_move().is_none());
    }

    #[test]
    fn test_relocate_into_missing_dir_fails_cleanly() {
        let (_temp, source, sorted) = setup(&["a.png"]);
        let target = sorted.join("missing").join("a.png");

        let result = relocate(&source.join("a.png"), &target);

        assert!(result.is_err());
        assert!(source.join("a.png").exists());
        assert!(!target.exists());
    }

    fn refuse_rename(_: &Path, _: &Path) -> io::Result<()> {
        Err(io::Error::other("cross-device link"))
    }

    #[test]
    fn test_relocate_copies_when_rename_fails() {
        let (_temp, source, sorted) = setup(&["a.png"]);
        fs::create_dir_all(&sorted).unwrap();
        let target = sorted.join("a.png");

        relocate_with(&source.join("a.png"), &target, refuse_rename, |f| {
            fs::remove_file(f)
        })
        .unwrap();

        assert!(!source.join("a.png").exists());
        assert_eq!(fs::read(&target).unwrap(), b"a.png");
    }

    #[test]
    fn test_relocate_removes_copy_when_source_stays() {
        let (_temp, source, sorted) = setup(&["a.png"]);
        fs::create_dir_all(&sorted).unwrap();
        let target = sorted.join("a.png");

        let err = relocate_with(&source.join("a.png"), &target, refuse_rename, |_| {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        })
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(fs::read(source.join("a.png")).unwrap(), b"a.png");
        assert!(!target.exists());
    }

    #[test]
    fn test_move_and_undo_across_filesystems() {
        // tmpfs mount, usually a different device from the temp dir
        let shm = Path::new("/dev/shm");
        if !shm.is_dir() {
            return;
        }
        let (_temp, source, _) = setup(&["a.png"]);
        let other = TempDir::new_in(shm).unwrap();
        let sorted = other.path().join("sorted");
        let mut executor = MoveExecutor::new(sorted.clone());

        executor.move_to_category(&source, "a.png", "Good").unwrap();
        assert!(!source.join("a.png").exists());
        assert_eq!(
            fs::read(sorted.join("Good").join("a.png")).unwrap(),
            b"a.png"
        );

        assert!(matches!(executor.undo().unwrap(), UndoOutcome::Restored(_)));
        assert_eq!(fs::read(source.join("a.png")).unwrap(), b"a.png");
        assert!(!sorted.join("Good").join("a.png").exists());
    }
}
