use std::ffi::OsStr;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;

use snafu::{OptionExt, ResultExt, Snafu};

use crate::codec::timestamp::CivilTime;
use crate::filesystem::{EntryInfo, SnapshotTree};

/// Writes `tree` in canonical text form, one line per entry.
///
/// Entries are written depth first in ascending name order, each directory's
/// line before the lines of its contents:
///
/// ```text
/// <path><name> <kind_code> <size> <YYYY>-<MM>-<DD> <HH>:<MM>:<SS>.<nsec9>
/// ```
pub fn encode<W: Write>(tree: &SnapshotTree, out: &mut W) -> Result<(), EncodeError> {
    let mut prefix = Vec::new();
    traverse(tree, &mut prefix, out)
}

pub fn encode_to_vec(tree: &SnapshotTree) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    encode(tree, &mut buffer)?;
    Ok(buffer)
}

fn traverse<W: Write>(
    level: &SnapshotTree,
    prefix: &mut Vec<u8>,
    out: &mut W,
) -> Result<(), EncodeError> {
    for (name, info) in level.iter() {
        let civil = CivilTime::from_timestamp(info.mtime()).with_context(|| {
            InvalidTimestampSnafu {
                path: lossy_path(prefix.as_slice(), name),
                secs: info.mtime().secs(),
            }
        })?;
        write_line(out, prefix, name, info, &civil).context(WriteSnafu)?;

        if let Some(child) = info.child() {
            let restore_len = prefix.len();
            prefix.extend_from_slice(name.as_bytes());
            prefix.push(b'/');
            let result = traverse(child, prefix, out);
            prefix.truncate(restore_len);
            result?;
        }
    }

    Ok(())
}

fn write_line<W: Write>(
    out: &mut W,
    prefix: &[u8],
    name: &OsStr,
    info: &EntryInfo,
    civil: &CivilTime,
) -> io::Result<()> {
    out.write_all(prefix)?;
    out.write_all(name.as_bytes())?;
    writeln!(out, " {} {} {}", info.kind().code(), info.size(), civil)
}

fn lossy_path(prefix: &[u8], name: &OsStr) -> String {
    let mut path = prefix.to_vec();
    path.extend_from_slice(name.as_bytes());
    String::from_utf8_lossy(&path).into_owned()
}

#[derive(Debug, Snafu)]
pub enum EncodeError {
    #[snafu(display("Modification time of {} ({}s) cannot be written as a UTC date", path, secs))]
    InvalidTimestamp { path: String, secs: i64 },
    #[snafu(display("Failed to write snapshot line"))]
    WriteError { source: io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{EntryKind, Timestamp};

    fn stamp(secs: i64, nanos: u32) -> Timestamp {
        Timestamp::new(secs, nanos).unwrap()
    }

    fn encode_to_string(tree: &SnapshotTree) -> String {
        String::from_utf8(encode_to_vec(tree).unwrap()).unwrap()
    }

    fn sample_tree() -> SnapshotTree {
        let mut root = SnapshotTree::new_root();
        root.insert(
            OsStr::new("zeta"),
            EntryInfo::new(EntryKind::Regular, 3, stamp(0, 0)),
        );
        root.insert(
            OsStr::new("dir"),
            EntryInfo::new(EntryKind::Directory, 0, stamp(1_704_067_200, 42)),
        );
        root.insert(
            OsStr::new("alpha"),
            EntryInfo::new(EntryKind::Symlink, 7, stamp(1_704_067_200, 0)),
        );
        let dir = root.child_mut(OsStr::new("dir")).unwrap();
        dir.insert(
            OsStr::new("nested"),
            EntryInfo::new(EntryKind::Directory, 0, stamp(0, 0)),
        );
        dir.insert(
            OsStr::new("b file"),
            EntryInfo::new(EntryKind::Regular, 10, stamp(951_827_696, 999_999_999)),
        );
        dir.child_mut(OsStr::new("nested")).unwrap().insert(
            OsStr::new("leaf"),
            EntryInfo::new(EntryKind::Regular, 1, stamp(0, 1)),
        );
        root
    }

    #[test]
    fn empty_tree_encodes_to_nothing() {
        assert_eq!(encode_to_string(&SnapshotTree::new_root()), "");
    }

    #[test]
    fn encodes_depth_first_in_name_order() {
        let expected = "\
alpha 10 7 2024-01-01 00:00:00.000000000
dir 4 0 2024-01-01 00:00:00.000000042
dir/b file 8 10 2000-02-29 12:34:56.999999999
dir/nested 4 0 1970-01-01 00:00:00.000000000
dir/nested/leaf 8 1 1970-01-01 00:00:00.000000001
zeta 8 3 1970-01-01 00:00:00.000000000
";
        assert_eq!(encode_to_string(&sample_tree()), expected);
    }

    #[test]
    fn sibling_after_directory_sees_no_leaked_prefix() {
        let text = encode_to_string(&sample_tree());
        let last = text.lines().last().unwrap();
        assert!(last.starts_with("zeta "));
    }

    #[test]
    fn unrenderable_timestamp_is_an_error() {
        let mut root = SnapshotTree::new_root();
        root.insert(
            OsStr::new("ancient"),
            EntryInfo::new(EntryKind::Regular, 0, stamp(-62_198_755_200, 0)),
        );

        let result = encode_to_vec(&root);

        match result {
            Err(EncodeError::InvalidTimestamp { path, .. }) => assert_eq!(path, "ancient"),
            other => panic!("Expected InvalidTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn years_past_9999_widen_the_year_field() {
        let mut root = SnapshotTree::new_root();
        root.insert(
            OsStr::new("future"),
            EntryInfo::new(EntryKind::Regular, 1, stamp(253_402_300_800, 0)),
        );

        assert_eq!(
            encode_to_string(&root),
            "future 8 1 10000-01-01 00:00:00.000000000\n"
        );
        assert_eq!(SnapshotTree::try_from("future 8 1 10000-01-01 00:00:00.000000000").unwrap(), root);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_reported() {
        let result = encode(&sample_tree(), &mut FailingWriter);
        assert!(matches!(result, Err(EncodeError::WriteError { .. })));
    }
}
