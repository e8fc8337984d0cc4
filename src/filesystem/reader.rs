use std::ffi::OsStr;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use nix::dir::Dir;
use nix::fcntl::{AtFlags, OFlag};
use nix::sys::stat::{FileStat, Mode, SFlag, fstatat};
use nix::unistd::{AccessFlags, access};
use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info};

use crate::ext::PathDisplayExt;
use crate::filesystem::{EntryInfo, EntryKind, SnapshotTree, Timestamp};

/// Number of directory levels, the root included, that the reader and the
/// decoder accept. Each level costs one stack frame and one open descriptor.
pub const MAX_DEPTH: usize = 128;

/// Builds a [`SnapshotTree`] by walking a live directory.
///
/// Every directory is opened relative to its already open parent and every
/// entry is stat-ed relative to that handle without following symlinks, so a
/// path is resolved only once, at the root.
pub struct FilesystemReader {
    root: PathBuf,
}

impl FilesystemReader {
    pub fn build_from_path(path: impl AsRef<Path>) -> Result<SnapshotTree, ReadTreeError> {
        let path = path.as_ref();
        debug!("Reading directory tree from {}", path.display_absolute());

        access(path, AccessFlags::R_OK).context(AccessSnafu { path })?;
        let dir = Dir::open(path, OFlag::O_RDONLY | OFlag::O_DIRECTORY, Mode::empty())
            .context(OpenSnafu { path })?;

        let reader = FilesystemReader {
            root: path.to_path_buf(),
        };
        let mut tree = SnapshotTree::new_root();
        reader.read_dir(dir, &mut tree, 0)?;

        info!(
            "Read {} entries from {}",
            tree.entry_count(),
            path.display_absolute()
        );
        Ok(tree)
    }

    /// Fills `level` from the open directory `dir` and recurses into every
    /// subdirectory before moving on to the next sibling. `dir` is closed when
    /// this call returns, whichever way it returns.
    fn read_dir(
        &self,
        mut dir: Dir,
        level: &mut SnapshotTree,
        depth: usize,
    ) -> Result<(), ReadTreeError> {
        let fd = dir.as_raw_fd();

        for entry in dir.iter() {
            let entry = entry.with_context(|_| ListSnafu {
                path: self.level_path(level),
            })?;
            let name = entry.file_name();
            if matches!(name.to_bytes(), b"." | b"..") {
                continue;
            }
            let os_name = OsStr::from_bytes(name.to_bytes());

            let stat = fstatat(Some(fd), name, AtFlags::AT_SYMLINK_NOFOLLOW).with_context(|_| {
                StatSnafu {
                    path: self.entry_path(level, os_name),
                }
            })?;
            let kind = kind_from_stat(&stat);
            let mtime = Timestamp::from_raw(stat.st_mtime as i64, stat.st_mtime_nsec as i64);
            level.insert(os_name, EntryInfo::new(kind, stat.st_size as u64, mtime));

            if kind.is_directory() {
                self.read_subdir(fd, os_name, level, depth)?;
            }
        }

        Ok(())
    }

    fn read_subdir(
        &self,
        parent_fd: RawFd,
        name: &OsStr,
        level: &mut SnapshotTree,
        depth: usize,
    ) -> Result<(), ReadTreeError> {
        ensure!(
            depth + 1 < MAX_DEPTH,
            TooDeepSnafu {
                path: self.entry_path(level, name),
            }
        );

        let dir = Dir::openat(
            Some(parent_fd),
            name,
            OFlag::O_RDONLY | OFlag::O_DIRECTORY | OFlag::O_NOFOLLOW,
            Mode::empty(),
        )
        .with_context(|_| OpenSnafu {
            path: self.entry_path(level, name),
        })?;

        match level.child_mut(name) {
            Some(child) => self.read_dir(dir, child, depth + 1),
            None => Ok(()),
        }
    }

    fn level_path(&self, level: &SnapshotTree) -> PathBuf {
        self.root.join(level.full_path())
    }

    fn entry_path(&self, level: &SnapshotTree, name: &OsStr) -> PathBuf {
        self.level_path(level).join(name)
    }
}

fn kind_from_stat(stat: &FileStat) -> EntryKind {
    let format = SFlag::from_bits_truncate(stat.st_mode) & SFlag::S_IFMT;
    if format == SFlag::S_IFREG {
        EntryKind::Regular
    } else if format == SFlag::S_IFDIR {
        EntryKind::Directory
    } else if format == SFlag::S_IFLNK {
        EntryKind::Symlink
    } else if format == SFlag::S_IFIFO {
        EntryKind::Fifo
    } else if format == SFlag::S_IFCHR {
        EntryKind::CharDevice
    } else if format == SFlag::S_IFBLK {
        EntryKind::BlockDevice
    } else if format == SFlag::S_IFSOCK {
        EntryKind::Socket
    } else {
        EntryKind::Unknown
    }
}

#[derive(Debug, Snafu)]
pub enum ReadTreeError {
    #[snafu(display("Cannot access {}", path.display()))]
    AccessError { path: PathBuf, source: nix::Error },
    #[snafu(display("Cannot open directory {}", path.display()))]
    OpenError { path: PathBuf, source: nix::Error },
    #[snafu(display("Cannot stat {}", path.display()))]
    StatError { path: PathBuf, source: nix::Error },
    #[snafu(display("Failed to list the entries of {}", path.display()))]
    ListError { path: PathBuf, source: nix::Error },
    #[snafu(display(
        "Directory {} is nested deeper than {} levels",
        path.display(),
        MAX_DEPTH
    ))]
    TooDeep { path: PathBuf },
}
