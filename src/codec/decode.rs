use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::debug;

use crate::codec::timestamp::CivilTime;
use crate::ext::PathDisplayExt;
use crate::filesystem::{EntryInfo, EntryKind, MAX_DEPTH, SnapshotTree, Timestamp};

const TRAILING_FIELDS: usize = 4;

/// Separators between the nine numbers of the trailing fields, in order:
/// `kind size year-month-day hour:minute:second.nanos`.
const NUMBER_SEPARATORS: [u8; 8] = [b' ', b' ', b'-', b'-', b' ', b':', b':', b'.'];

/// What to do when a line names a directory that no earlier line declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Reject the line. Canonical text always declares a directory before its
    /// contents, so this catches truncated or reordered input.
    #[default]
    Strict,
    /// Create the missing directory with size 0 and an epoch mtime.
    Permissive,
}

/// Line numbers in errors start at 1.
pub fn decode_lines<I, L>(lines: I, mode: DecodeMode) -> Result<SnapshotTree, DecodeError>
where
    I: IntoIterator<Item = L>,
    L: AsRef<[u8]>,
{
    let mut root = SnapshotTree::new_root();
    let mut line_count = 0;

    for (index, line) in lines.into_iter().enumerate() {
        line_count = index + 1;
        parse_line(&mut root, line.as_ref(), mode).context(ParseSnafu { line: line_count })?;
    }

    debug!(
        "Decoded {} lines into {} entries ({:?} mode)",
        line_count,
        root.entry_count(),
        mode
    );
    Ok(root)
}

pub fn decode_file(path: impl AsRef<Path>, mode: DecodeMode) -> Result<SnapshotTree, DecodeError> {
    let path = path.as_ref();
    debug!("Reading snapshot file {}", path.display_absolute());
    let contents = fs::read(path).context(ReadFileSnafu { path })?;
    decode_lines(split_lines(&contents), mode)
}

fn split_lines(contents: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = contents.strip_suffix(b"\n").unwrap_or(contents);
    (!contents.is_empty())
        .then(|| body.split(|byte| *byte == b'\n'))
        .into_iter()
        .flatten()
}

fn parse_line(root: &mut SnapshotTree, line: &[u8], mode: DecodeMode) -> Result<(), ParseFailure> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    // Paths may contain spaces, so the fields are found from the end.
    let boundary = line
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, byte)| **byte == b' ')
        .nth(TRAILING_FIELDS - 1)
        .map(|(index, _)| index)
        .context(MissingFieldsSnafu)?;
    let (path, fields) = (&line[..boundary], &line[boundary + 1..]);

    let [code, size, year, month, day, hour, minute, second, nanos] = scan_numbers(fields)?;
    let kind = EntryKind::from_code(code).context(UnknownKindSnafu { code })?;
    let mtime = CivilTime {
        year,
        month,
        day,
        hour,
        minute,
        second,
        nanos,
    }
    .to_timestamp()
    .context(InvalidTimestampSnafu)?;

    let (prefix, leaf) = match path.iter().rposition(|byte| *byte == b'/') {
        Some(slash) => (&path[..slash], &path[slash + 1..]),
        None => (&path[..0], path),
    };
    ensure!(!leaf.is_empty(), EmptyNameSnafu);

    let (level, depth) = resolve_prefix(root, prefix, mode)?;
    // A directory here would open a level one past the deepest allowed.
    ensure!(
        !kind.is_directory() || depth + 1 < MAX_DEPTH,
        TooDeepSnafu { path: lossy(path) }
    );
    level.upsert(OsStr::from_bytes(leaf), kind, size, mtime);
    Ok(())
}

fn scan_numbers(fields: &[u8]) -> Result<[u64; 9], ParseFailure> {
    let mut numbers = [0; 9];
    let mut rest = fields;

    for (index, number) in numbers.iter_mut().enumerate() {
        let token = match NUMBER_SEPARATORS
            .get(index)
            .and_then(|separator| rest.iter().position(|byte| byte == separator))
        {
            Some(at) => {
                let token = &rest[..at];
                rest = &rest[at + 1..];
                token
            }
            None => std::mem::take(&mut rest),
        };
        *number = parse_number(token).context(MissingNumbersSnafu { got: index })?;
    }

    Ok(numbers)
}

fn parse_number(token: &[u8]) -> Option<u64> {
    if token.is_empty() || !token.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(token).ok()?.parse().ok()
}

/// Returns the level `prefix` names together with its depth below the root.
fn resolve_prefix<'a>(
    root: &'a mut SnapshotTree,
    prefix: &[u8],
    mode: DecodeMode,
) -> Result<(&'a mut SnapshotTree, usize), ParseFailure> {
    let mut level = root;
    let mut depth = 0;
    let mut walked = 0;

    for component in prefix.split(|byte| *byte == b'/') {
        let walked_path = &prefix[..walked + component.len()];
        walked += component.len() + 1;
        if component.is_empty() {
            continue;
        }

        depth += 1;
        ensure!(
            depth < MAX_DEPTH,
            TooDeepSnafu {
                path: lossy(walked_path)
            }
        );

        let name = OsStr::from_bytes(component);
        match level.lookup(name).map(EntryInfo::kind) {
            Some(EntryKind::Directory) => {}
            Some(_) => {
                return NotADirectorySnafu {
                    path: lossy(walked_path),
                }
                .fail();
            }
            None if mode == DecodeMode::Strict => {
                return MissingDirectorySnafu {
                    path: lossy(walked_path),
                }
                .fail();
            }
            None => {
                level.insert(
                    name,
                    EntryInfo::new(EntryKind::Directory, 0, Timestamp::default()),
                );
            }
        }

        level = match level.child_mut(name) {
            Some(child) => child,
            None => {
                return MissingDirectorySnafu {
                    path: lossy(walked_path),
                }
                .fail();
            }
        };
    }

    Ok((level, depth))
}

fn lossy(path: &[u8]) -> String {
    String::from_utf8_lossy(path).into_owned()
}

impl TryFrom<&str> for SnapshotTree {
    type Error = DecodeError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        decode_lines(contents.lines(), DecodeMode::Strict)
    }
}

#[derive(Debug, Snafu)]
pub enum DecodeError {
    #[snafu(display("Failed to read snapshot file {}", path.display()))]
    ReadFileError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Parse error at line {}: {}", line, reason))]
    ParseError {
        line: usize,
        #[snafu(source)]
        reason: ParseFailure,
    },
}

/// Why a single snapshot line was rejected.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ParseFailure {
    #[snafu(display("expected {} space separated fields after the path", TRAILING_FIELDS))]
    MissingFields,
    #[snafu(display("expected 9 numeric fields, got {}", got))]
    MissingNumbers { got: usize },
    #[snafu(display("unknown entry kind code {}", code))]
    UnknownKind { code: u64 },
    #[snafu(display("modification time is not a valid UTC instant"))]
    InvalidTimestamp,
    #[snafu(display("entry has an empty name"))]
    EmptyName,
    #[snafu(display("directory {} not found", path))]
    MissingDirectory { path: String },
    #[snafu(display("{} is not a directory", path))]
    NotADirectory { path: String },
    #[snafu(display("path {} is nested deeper than {} levels", path, MAX_DEPTH))]
    TooDeep { path: String },
}
