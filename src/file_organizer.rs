//! Moving files into category directories.
//!
//! This module resolves where a file should go inside a destination root,
//! picks a name that does not collide with anything already there, and then
//! either moves the file or, in dry-run mode, only reports what would happen.

use serde::Serialize;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// A single planned (or performed) move.
///
/// Decisions are produced per file and handed to the caller for reporting;
/// they are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveDecision {
    /// Where the file was found.
    pub source: PathBuf,
    /// Where the file ends up (or would end up in a dry run).
    pub destination: PathBuf,
    /// Name of the category folder.
    pub category: String,
    /// True when nothing was touched on disk.
    pub simulated: bool,
}

/// Errors that can occur while moving a single file.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source file does not exist, or disappeared before it could be moved.
    #[error("Source file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The source exists but is not a regular file.
    #[error("Not a regular file: {}", path.display())]
    NotAFile { path: PathBuf },

    /// Failed to create a category directory.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to move a file to its destination.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other I/O failure while inspecting the source.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OrganizeError {
    /// Returns true for the "source missing" class of failure.
    ///
    /// Every other variant is an I/O failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Moves files into category subdirectories of a destination root.
///
/// One `Mover` is meant to live for a whole run. In dry-run mode it remembers
/// the destinations it has already handed out, so a preview of several files
/// resolves collisions the same way the real run would.
#[derive(Debug, Default)]
pub struct Mover {
    dry_run: bool,
    claimed: HashSet<PathBuf>,
}

impl Mover {
    /// Creates a mover; `dry_run` disables every filesystem mutation.
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            claimed: HashSet::new(),
        }
    }

    /// Plans the move of `source_path` into `destination_root/category` and
    /// performs it unless this is a dry run.
    ///
    /// The destination keeps the original file name unless that name is
    /// taken, in which case `-1`, `-2`, ... is inserted before the extension.
    ///
    /// # Errors
    ///
    /// * `NotFound` if the source is missing (before or during the move)
    /// * `NotAFile` if the source is a directory or other non-file entry
    /// * `DirectoryCreationFailed` if the category folder cannot be created;
    ///   the source is left untouched
    /// * `FileMoveFailure` if the rename or cross-volume copy fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use organizer::file_organizer::Mover;
    /// use std::path::Path;
    ///
    /// let mut mover = Mover::new(true);
    /// let decision = mover
    ///     .plan_and_execute(Path::new("/tmp/in/a.pdf"), Path::new("/tmp/out"), "Documents")
    ///     .expect("plan failed");
    /// println!("{} -> {}", decision.source.display(), decision.destination.display());
    /// ```
    pub fn plan_and_execute(
        &mut self,
        source_path: &Path,
        destination_root: &Path,
        category: &str,
    ) -> OrganizeResult<MoveDecision> {
        check_source(source_path)?;

        let file_name = source_path
            .file_name()
            .ok_or_else(|| OrganizeError::NotAFile {
                path: source_path.to_path_buf(),
            })?;
        let category_path = destination_root.join(category);

        if !self.dry_run {
            fs::create_dir_all(&category_path).map_err(|e| {
                OrganizeError::DirectoryCreationFailed {
                    path: category_path.clone(),
                    source: e,
                }
            })?;
        }

        let claimed = &self.claimed;
        let destination = unique_path_with(&category_path.join(file_name), |candidate| {
            path_taken(candidate) || claimed.contains(candidate)
        });
        debug!(
            source = %source_path.display(),
            destination = %destination.display(),
            category,
            dry_run = self.dry_run,
            "resolved destination"
        );

        if self.dry_run {
            self.claimed.insert(destination.clone());
        } else {
            relocate(source_path, &destination)
                .map_err(|e| move_error(source_path, &destination, e))?;
            info!(
                source = %source_path.display(),
                destination = %destination.display(),
                "moved file"
            );
        }

        Ok(MoveDecision {
            source: source_path.to_path_buf(),
            destination,
            category: category.to_string(),
            simulated: self.dry_run,
        })
    }
}

/// Plans and performs a single move with a fresh [`Mover`].
///
/// Convenience for one-off moves; a run over many files should reuse one
/// `Mover` so dry-run previews account for each other.
pub fn plan_and_execute(
    source_path: &Path,
    destination_root: &Path,
    category: &str,
    dry_run: bool,
) -> OrganizeResult<MoveDecision> {
    Mover::new(dry_run).plan_and_execute(source_path, destination_root, category)
}

/// Returns `target` if nothing exists there yet, otherwise the first free
/// `stem-N.ext` sibling.
///
/// # Examples
///
/// `file.pdf` → `file.pdf` if free, then `file-1.pdf`, `file-2.pdf`, ...
/// `archive.tar.gz` → `archive.tar-1.gz`, and `.bashrc` → `.bashrc-1`.
pub fn ensure_unique_path(target: &Path) -> PathBuf {
    unique_path_with(target, path_taken)
}

fn unique_path_with(target: &Path, taken: impl Fn(&Path) -> bool) -> PathBuf {
    if !taken(target) {
        return target.to_path_buf();
    }

    let stem = target.file_stem().unwrap_or_default();
    let extension = target.extension();
    let mut counter: u64 = 1;
    loop {
        let mut name = OsString::from(stem);
        name.push(format!("-{}", counter));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }
        let candidate = target.with_file_name(name);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// A dangling symlink still occupies its name, so this does not follow links.
fn path_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn check_source(source_path: &Path) -> OrganizeResult<()> {
    match fs::metadata(source_path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(OrganizeError::NotAFile {
            path: source_path.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(OrganizeError::NotFound {
            path: source_path.to_path_buf(),
        }),
        Err(e) => Err(OrganizeError::Io {
            path: source_path.to_path_buf(),
            source: e,
        }),
    }
}

/// Classifies a failed move. A source that vanished after it was checked is
/// `NotFound`; everything else is a move failure.
fn move_error(source: &Path, destination: &Path, error: io::Error) -> OrganizeError {
    if error.kind() == io::ErrorKind::NotFound && !path_taken(source) {
        OrganizeError::NotFound {
            path: source.to_path_buf(),
        }
    } else {
        OrganizeError::FileMoveFailure {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: error,
        }
    }
}

/// Renames `source` to `destination`, copying across volumes when needed.
fn relocate(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            warn!(
                source = %source.display(),
                destination = %destination.display(),
                "rename crosses volumes, copying instead"
            );
            copy_then_remove(source, destination)
        }
        Err(e) => Err(e),
    }
}

/// Copies `source` next to `destination` under a temporary name, publishes it
/// under the final name without clobbering, then deletes `source`.
///
/// A failed copy leaves no trace at the destination and keeps the source.
pub(crate) fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    let dir = destination.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent")
    })?;

    let mut staged = tempfile::Builder::new()
        .prefix(".organizer-")
        .suffix(".partial")
        .tempfile_in(dir)?;
    let mut reader = fs::File::open(source)?;
    io::copy(&mut reader, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    fs::set_permissions(staged.path(), fs::metadata(source)?.permissions())?;

    staged
        .persist_noclobber(destination)
        .map_err(|e| e.error)?;

    if let Err(e) = fs::remove_file(source) {
        // Keep exactly one copy: the source stays, the new file goes.
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_move_creates_category_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "test content").expect("Failed to write test file");

        let decision = plan_and_execute(&file_path, base_path, "Documents", false)
            .expect("Failed to move file");

        let category_dir = base_path.join("Documents");
        assert!(category_dir.is_dir());
        assert!(!file_path.exists());
        assert_eq!(decision.destination, category_dir.join("test.txt"));
        assert_eq!(decision.category, "Documents");
        assert!(!decision.simulated);
        assert_eq!(
            fs::read_to_string(&decision.destination).unwrap(),
            "test content"
        );
    }

    #[test]
    fn test_move_uses_existing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let category_dir = base_path.join("Images");
        fs::create_dir(&category_dir).expect("Failed to create category directory");
        let file_path = base_path.join("test.png");
        fs::write(&file_path, "test content").expect("Failed to write test file");

        plan_and_execute(&file_path, base_path, "Images", false).expect("Failed to move file");

        assert!(!file_path.exists());
        assert!(category_dir.join("test.png").exists());
    }

    #[test]
    fn test_creates_missing_destination_root() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("song.mp3");
        fs::write(&file_path, "la").unwrap();
        let root = temp_dir.path().join("deep").join("er").join("out");

        let decision = plan_and_execute(&file_path, &root, "Audio", false).unwrap();
        assert_eq!(decision.destination, root.join("Audio").join("song.mp3"));
        assert!(decision.destination.exists());
    }

    #[test]
    fn test_missing_source_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("ghost.txt");

        let err = plan_and_execute(&missing, temp_dir.path(), "Documents", false).unwrap_err();
        assert!(err.is_not_found());
        // Nothing was created for a file that does not exist.
        assert!(!temp_dir.path().join("Documents").exists());
    }

    #[test]
    fn test_directory_source_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("folder.zip");
        fs::create_dir(&dir).unwrap();

        let err = plan_and_execute(&dir, temp_dir.path(), "Archives", false).unwrap_err();
        assert!(matches!(err, OrganizeError::NotAFile { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_directory_creation_failure_leaves_source() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.pdf");
        fs::write(&file_path, "pdf").unwrap();
        // The destination root is a regular file, so no folder can be made under it.
        let blocker = temp_dir.path().join("out");
        fs::write(&blocker, "not a dir").unwrap();

        let err = plan_and_execute(&file_path, &blocker, "Documents", false).unwrap_err();
        assert!(matches!(err, OrganizeError::DirectoryCreationFailed { .. }));
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "pdf");
    }

    #[test]
    fn test_ensure_unique_path_generates_suffixes() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("Documents").join("file.pdf");
        fs::create_dir_all(target.parent().unwrap()).unwrap();

        assert_eq!(ensure_unique_path(&target), target);

        fs::write(&target, "x").unwrap();
        let unique = ensure_unique_path(&target);
        assert_eq!(unique.file_name().unwrap(), "file-1.pdf");

        fs::write(&unique, "y").unwrap();
        let unique2 = ensure_unique_path(&target);
        assert_eq!(unique2.file_name().unwrap(), "file-2.pdf");
    }

    #[test]
    fn test_ensure_unique_path_skips_every_taken_candidate() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["notes.md", "notes-1.md", "notes-2.md", "notes-4.md"] {
            fs::write(temp_dir.path().join(name), name).unwrap();
        }

        let unique = ensure_unique_path(&temp_dir.path().join("notes.md"));
        assert_eq!(unique.file_name().unwrap(), "notes-3.md");
    }

    #[test]
    fn test_unique_path_name_shapes() {
        let taken_all_once = |p: &Path| !p.to_string_lossy().contains("-1");

        let tar = unique_path_with(Path::new("/x/archive.tar.gz"), taken_all_once);
        assert_eq!(tar, PathBuf::from("/x/archive.tar-1.gz"));

        let dotfile = unique_path_with(Path::new("/x/.bashrc"), taken_all_once);
        assert_eq!(dotfile, PathBuf::from("/x/.bashrc-1"));

        let bare = unique_path_with(Path::new("/x/Makefile"), taken_all_once);
        assert_eq!(bare, PathBuf::from("/x/Makefile-1"));
    }

    #[test]
    fn test_collision_keeps_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("out");
        let existing = root.join("Documents").join("report.txt");
        fs::create_dir_all(existing.parent().unwrap()).unwrap();
        fs::write(&existing, "old").unwrap();

        let src = temp_dir.path().join("report.txt");
        fs::write(&src, "new").unwrap();

        let decision = plan_and_execute(&src, &root, "Documents", false).unwrap();
        assert_eq!(decision.destination.file_name().unwrap(), "report-1.txt");
        assert_eq!(fs::read_to_string(&existing).unwrap(), "old");
        assert_eq!(fs::read_to_string(&decision.destination).unwrap(), "new");
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("clip.mp4");
        fs::write(&src, "video").unwrap();
        let root = temp_dir.path().join("out");

        let decision = plan_and_execute(&src, &root, "Videos", true).unwrap();

        assert!(decision.simulated);
        assert_eq!(decision.destination, root.join("Videos").join("clip.mp4"));
        assert!(src.exists());
        assert!(!root.exists());
    }

    #[test]
    fn test_dry_run_mover_remembers_claimed_names() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a").join("report.txt");
        let second = temp_dir.path().join("b").join("report.txt");
        for path in [&first, &second] {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }
        let root = temp_dir.path().join("out");

        let mut mover = Mover::new(true);
        let d1 = mover.plan_and_execute(&first, &root, "Documents").unwrap();
        let d2 = mover.plan_and_execute(&second, &root, "Documents").unwrap();

        assert_eq!(d1.destination.file_name().unwrap(), "report.txt");
        assert_eq!(d2.destination.file_name().unwrap(), "report-1.txt");
        assert!(!root.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_counts_as_taken() {
        let temp_dir = TempDir::new().unwrap();
        let link = temp_dir.path().join("link.txt");
        std::os::unix::fs::symlink(temp_dir.path().join("nowhere"), &link).unwrap();

        let unique = ensure_unique_path(&link);
        assert_eq!(unique.file_name().unwrap(), "link-1.txt");
    }

    #[test]
    fn test_copy_then_remove_moves_content() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("big.zip");
        fs::write(&src, vec![7u8; 64 * 1024]).unwrap();
        let dst_dir = temp_dir.path().join("Archives");
        fs::create_dir(&dst_dir).unwrap();
        let dst = dst_dir.join("big.zip");

        copy_then_remove(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), vec![7u8; 64 * 1024]);
        // No staging files are left behind.
        let leftovers: Vec<_> = fs::read_dir(&dst_dir).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_copy_then_remove_never_clobbers() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a.txt");
        let dst = temp_dir.path().join("b.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();

        assert!(copy_then_remove(&src, &dst).is_err());
        assert_eq!(fs::read_to_string(&src).unwrap(), "new");
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_copy_then_remove_missing_source_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let dst = temp_dir.path().join("out.txt");

        let err = copy_then_remove(&temp_dir.path().join("missing.txt"), &dst).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
    #[test]
    fn test_relocate_missing_source_maps_to_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("vanished.txt");
        let destination = temp_dir.path().join("vanished-moved.txt");

        let err = relocate(&source, &destination).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let mapped = move_error(&source, &destination, err);
        assert!(mapped.is_not_found());
        assert!(matches!(mapped, OrganizeError::NotFound { ref path } if *path == source));
    }

    #[test]
    fn test_move_error_keeps_other_failures_as_move_failures() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("present.txt");
        fs::write(&source, "x").unwrap();
        let destination = temp_dir.path().join("missing_dir").join("present.txt");

        // The source still exists, so a NotFound here concerns the destination.
        let err = relocate(&source, &destination).unwrap_err();
        let mapped = move_error(&source, &destination, err);
        assert!(!mapped.is_not_found());
        assert!(matches!(mapped, OrganizeError::FileMoveFailure { .. }));
        assert_eq!(fs::read_to_string(&source).unwrap(), "x");
    }
}
