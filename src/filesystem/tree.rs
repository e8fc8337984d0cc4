use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ffi::{OsStr, OsString};
use std::rc::Rc;

use derive_more::IsVariant;

/// The type of a filesystem object, independent of the platform constants.
///
/// Every variant maps to a fixed wire code (the traditional `dirent` type
/// values) so the text form round-trips the kind exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IsVariant)]
pub enum EntryKind {
    Unknown,
    Fifo,
    CharDevice,
    Directory,
    BlockDevice,
    Regular,
    Symlink,
    Socket,
}

impl EntryKind {
    pub fn code(self) -> u8 {
        match self {
            EntryKind::Unknown => 0,
            EntryKind::Fifo => 1,
            EntryKind::CharDevice => 2,
            EntryKind::Directory => 4,
            EntryKind::BlockDevice => 6,
            EntryKind::Regular => 8,
            EntryKind::Symlink => 10,
            EntryKind::Socket => 12,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        let kind = match code {
            0 => EntryKind::Unknown,
            1 => EntryKind::Fifo,
            2 => EntryKind::CharDevice,
            4 => EntryKind::Directory,
            6 => EntryKind::BlockDevice,
            8 => EntryKind::Regular,
            10 => EntryKind::Symlink,
            12 => EntryKind::Socket,
            _ => return None,
        };
        Some(kind)
    }
}

/// Modification time as seconds since the epoch plus a nanosecond remainder, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    pub const NANOS_PER_SEC: u32 = 1_000_000_000;

    pub fn new(secs: i64, nanos: u32) -> Option<Self> {
        (nanos < Self::NANOS_PER_SEC).then_some(Self { secs, nanos })
    }

    pub(crate) fn from_raw(secs: i64, nanos: i64) -> Self {
        let nanos = nanos.clamp(0, i64::from(Self::NANOS_PER_SEC) - 1) as u32;
        Self { secs, nanos }
    }

    pub fn secs(&self) -> i64 {
        self.secs
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }
}

/// Metadata of one object inside a directory level.
///
/// `child` is present if and only if `kind` is [`EntryKind::Directory`]; the
/// tree methods that create entries maintain this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub(crate) kind: EntryKind,
    pub(crate) size: u64,
    pub(crate) mtime: Timestamp,
    pub(crate) child: Option<Box<SnapshotTree>>,
}

impl EntryInfo {
    /// Creates a childless entry. Directories get their child tree when they
    /// are inserted into a level, and always report a size of zero.
    pub fn new(kind: EntryKind, size: u64, mtime: Timestamp) -> Self {
        let size = if kind.is_directory() { 0 } else { size };
        Self {
            kind,
            size,
            mtime,
            child: None,
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mtime(&self) -> Timestamp {
        self.mtime
    }

    pub fn child(&self) -> Option<&SnapshotTree> {
        self.child.as_deref()
    }

    pub fn same_metadata(&self, other: &EntryInfo) -> bool {
        self.kind == other.kind && self.size == other.size && self.mtime == other.mtime
    }
}

/// Non-owning link from a directory level back to where it hangs in the tree.
///
/// It only records names, so it can never keep a tree alive or form a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ancestry {
    parent: Option<Rc<Ancestry>>,
    name: OsString,
}

/// One directory level of a snapshot.
///
/// Entries are kept sorted byte-wise by name; the canonical text form and the
/// diff both rely on that order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotTree {
    entries: BTreeMap<OsString, EntryInfo>,
    ancestry: Option<Rc<Ancestry>>,
}

impl SnapshotTree {
    pub fn new_root() -> Self {
        Self::default()
    }

    fn nested(parent: Option<Rc<Ancestry>>, name: &OsStr) -> Self {
        Self {
            entries: BTreeMap::new(),
            ancestry: Some(Rc::new(Ancestry {
                parent,
                name: name.to_os_string(),
            })),
        }
    }

    pub fn is_root(&self) -> bool {
        self.ancestry.is_none()
    }

    /// Path of this level relative to the snapshot root, with a trailing `/`
    /// after every component. The root yields an empty path.
    pub fn full_path(&self) -> OsString {
        let mut names = Vec::new();
        let mut cursor = self.ancestry.as_deref();
        while let Some(ancestry) = cursor {
            names.push(ancestry.name.as_os_str());
            cursor = ancestry.parent.as_deref();
        }

        let mut path = OsString::new();
        for name in names.into_iter().rev() {
            path.push(name);
            path.push("/");
        }
        path
    }

    /// Inserts `info` under `name` unless the name is already present, in
    /// which case the existing entry is returned untouched.
    pub fn insert(&mut self, name: &OsStr, info: EntryInfo) -> &mut EntryInfo {
        match self.entries.entry(name.to_os_string()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                let mut info = info;
                if info.kind.is_directory() && info.child.is_none() {
                    info.child = Some(Box::new(Self::nested(self.ancestry.clone(), name)));
                }
                vacant.insert(info)
            }
        }
    }

    /// A directory keeps any children it already has; an entry that stops
    /// being a directory loses its child tree.
    pub fn upsert(
        &mut self,
        name: &OsStr,
        kind: EntryKind,
        size: u64,
        mtime: Timestamp,
    ) -> &mut EntryInfo {
        let ancestry = self.ancestry.clone();
        let info = self.insert(name, EntryInfo::new(kind, size, mtime));
        info.kind = kind;
        info.size = if kind.is_directory() { 0 } else { size };
        info.mtime = mtime;
        if !kind.is_directory() {
            info.child = None;
        } else if info.child.is_none() {
            info.child = Some(Box::new(Self::nested(ancestry, name)));
        }
        info
    }

    pub fn lookup(&self, name: &OsStr) -> Option<&EntryInfo> {
        self.entries.get(name)
    }

    pub(crate) fn lookup_mut(&mut self, name: &OsStr) -> Option<&mut EntryInfo> {
        self.entries.get_mut(name)
    }

    pub fn child_mut(&mut self, name: &OsStr) -> Option<&mut SnapshotTree> {
        self.entries
            .get_mut(name)
            .and_then(|info| info.child.as_deref_mut())
    }

    pub fn remove(&mut self, name: &OsStr) -> Option<EntryInfo> {
        self.entries.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &EntryInfo)> {
        self.entries.iter().map(|(name, info)| (name.as_os_str(), info))
    }

    pub fn names(&self) -> impl Iterator<Item = &OsStr> {
        self.entries.keys().map(OsString::as_os_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of entries at this level and every level below it.
    pub fn entry_count(&self) -> usize {
        self.entries
            .values()
            .map(|info| 1 + info.child().map_or(0, SnapshotTree::entry_count))
            .sum()
    }
}
