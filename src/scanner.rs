use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, trace, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::ScanError;

/// What a directory entry is, judged from its own metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Symlink,
    Directory,
    File,
    /// FIFOs, sockets, device nodes.
    Other,
}

/// Classifies `path` without following it if it is a symbolic link.
///
/// A dangling link is still `Symlink`. An error here means the entry's type is
/// unknown and the caller must skip it rather than guess.
pub fn classify_entry(path: &Path) -> io::Result<EntryKind> {
    let file_type = fs::symlink_metadata(path)?.file_type();
    let kind = if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    };
    Ok(kind)
}

pub fn is_symlink(path: &Path) -> io::Result<bool> {
    classify_entry(path).map(|kind| kind == EntryKind::Symlink)
}

/// Everything the walk found under one root.
#[derive(Debug, Default)]
pub struct Listing {
    pub files: Vec<PathBuf>,
    /// Directories discovered, including ones that then failed to list.
    pub dirs_visited: usize,
    pub errors: Vec<ScanError>,
}

/// Lists every regular, non-symlink file reachable from `root`.
///
/// Symlinks are neither recorded nor descended into. Directories that cannot
/// be listed are logged, kept in [`Listing::errors`] and skipped; the walk
/// carries on with the rest.
pub fn list_files(root: &Path) -> Listing {
    info!("Scanning {}", root.display());
    let walker = WalkDir::new(root).follow_links(false);
    let listing = collect_listing(root, walker);
    info!(
        "Found {} files in {} directories",
        listing.files.len(),
        listing.dirs_visited
    );
    listing
}

fn collect_listing<I>(root: &Path, entries: I) -> Listing
where
    I: IntoIterator<Item = walkdir::Result<DirEntry>>,
{
    let mut listing = Listing::default();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                let message = err.to_string();
                let source = err.into_io_error().unwrap_or_else(|| io::Error::other(message));
                let err = ScanError::ReadDir { path, source };
                warn!("{err}");
                listing.errors.push(err);
                continue;
            }
        };

        // The walker decides descent from the entry's own type, so a
        // symlinked directory is never entered.
        let file_type = entry.file_type();
        if file_type.is_dir() {
            listing.dirs_visited += 1;
            continue;
        }
        if file_type.is_symlink() {
            trace!("Skipping symlink '{}'", entry.path().display());
            continue;
        }

        // Re-check on disk: the entry may have been swapped for a link or
        // removed since its directory was read.
        let path = entry.into_path();
        match classify_entry(&path) {
            Ok(EntryKind::File) => listing.files.push(path),
            Ok(EntryKind::Symlink) => trace!("Skipping symlink '{}'", path.display()),
            Ok(EntryKind::Directory | EntryKind::Other) => {
                debug!("Skipping '{}': not a regular file", path.display())
            }
            Err(source) => {
                let err = ScanError::Metadata { path, source };
                warn!("{err}");
                listing.errors.push(err);
            }
        }
    }

    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    #[test]
    fn lists_nested_files_once() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::write(dir.path().join("top.txt"), "1").unwrap();
        fs::write(dir.path().join("a/mid.txt"), "2").unwrap();
        fs::write(dir.path().join("a/b/c/deep.txt"), "3").unwrap();

        let listing = list_files(dir.path());
        let found: HashSet<_> = listing.files.iter().cloned().collect();

        assert_eq!(listing.files.len(), 3);
        assert_eq!(found.len(), 3);
        assert!(found.contains(&dir.path().join("a/b/c/deep.txt")));
        assert_eq!(listing.dirs_visited, 4);
        assert!(listing.errors.is_empty());
    }

    #[test]
    fn missing_root_is_a_recoverable_error() {
        let dir = tempdir().unwrap();
        let listing = list_files(&dir.path().join("gone"));

        assert!(listing.files.is_empty());
        assert_eq!(listing.errors.len(), 1);
        assert!(matches!(listing.errors[0], ScanError::ReadDir { .. }));
        assert_eq!(listing.errors[0].path(), dir.path().join("gone").as_path());
    }

    #[test]
    fn vanished_subdirectory_is_skipped_and_siblings_kept() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("a/keep.txt"), "hello").unwrap();
        fs::write(root.join("b/lost.txt"), "hello").unwrap();
        fs::write(root.join("c.txt"), "hello").unwrap();

        // `b` is discovered with the root listing, then removed before the
        // walker gets round to opening it.
        let doomed = root.join("b");
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .inspect(|entry| {
                if let Ok(entry) = entry {
                    if entry.file_name() == "a" && doomed.exists() {
                        fs::remove_dir_all(&doomed).unwrap();
                    }
                }
            });
        let listing = collect_listing(root, walker);

        assert_eq!(listing.errors.len(), 1);
        assert!(matches!(&listing.errors[0], ScanError::ReadDir { path, .. } if *path == doomed));
        let found: HashSet<_> = listing.files.into_iter().collect();
        assert_eq!(
            found,
            HashSet::from([root.join("a/keep.txt"), root.join("c.txt")])
        );
        assert_eq!(listing.dirs_visited, 3);
    }

    #[test]
    fn vanished_file_is_a_metadata_error() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.txt"), "hello").unwrap();
        fs::write(root.join("b.txt"), "hello").unwrap();

        // `b.txt` is already in the walker's listing when it is removed.
        let doomed = root.join("b.txt");
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .inspect(|entry| {
                if let Ok(entry) = entry {
                    if entry.file_name() == "a.txt" && doomed.exists() {
                        fs::remove_file(&doomed).unwrap();
                    }
                }
            });
        let listing = collect_listing(root, walker);

        assert_eq!(listing.files, vec![root.join("a.txt")]);
        assert_eq!(listing.errors.len(), 1);
        assert!(matches!(&listing.errors[0], ScanError::Metadata { path, .. } if *path == doomed));
    }

    #[test]
    fn classifies_plain_entries() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "x").unwrap();

        assert_eq!(classify_entry(dir.path()).unwrap(), EntryKind::Directory);
        assert_eq!(classify_entry(&file).unwrap(), EntryKind::File);
        assert!(!is_symlink(&file).unwrap());
        assert!(classify_entry(&dir.path().join("nope")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_still_a_symlink() {
        let dir = tempdir().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("missing"), &link).unwrap();

        assert!(is_symlink(&link).unwrap());
        let listing = list_files(dir.path());
        assert!(listing.files.is_empty());
        assert!(listing.errors.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_not_descended() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        fs::write(real.join("inner.txt"), "x").unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("alias")).unwrap();
        // A loop back to the root must not hang the walk.
        std::os::unix::fs::symlink(dir.path(), real.join("loop")).unwrap();

        let listing = list_files(dir.path());

        assert_eq!(listing.files, vec![real.join("inner.txt")]);
        assert_eq!(listing.dirs_visited, 2);
    }

    #[cfg(unix)]
    #[test]
    fn fifo_is_skipped() {
        let dir = tempdir().unwrap();
        let fifo = dir.path().join("pipe");
        let status = std::process::Command::new("mkfifo").arg(&fifo).status();
        if !matches!(status, Ok(s) if s.success()) {
            eprintln!("Skipping fifo test: mkfifo unavailable");
            return;
        }

        assert_eq!(classify_entry(&fifo).unwrap(), EntryKind::Other);
        assert!(list_files(dir.path()).files.is_empty());
    }
}
