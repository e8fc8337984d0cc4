//! In-memory snapshot of a filesystem subtree.
//!
//! A snapshot is a tree of directory levels, each holding the entries of one
//! directory keyed by name. Trees are built either from a live directory
//! ([`FilesystemReader`]) or from the text form in [`crate::codec`].

mod reader;
mod tree;

pub use reader::{FilesystemReader, MAX_DEPTH, ReadTreeError};
pub use tree::{EntryInfo, EntryKind, SnapshotTree, Timestamp};
