use std::ffi::OsString;

use snafu::Snafu;

use crate::filesystem::{EntryInfo, SnapshotTree};

enum Verdict {
    Keep,
    RemoveBoth,
    Prune { left: bool, right: bool },
    Corrupt,
}

/// Removes from both trees every entry that is identical on both sides, and
/// every directory that became empty because of it. Only names in `left`
/// drive the walk; entries found only in `right` are never visited.
pub fn remove_common(left: &mut SnapshotTree, right: &mut SnapshotTree) -> Result<(), DiffError> {
    let names: Vec<OsString> = left.names().map(ToOwned::to_owned).collect();

    for name in names {
        let verdict = match (left.lookup_mut(&name), right.lookup_mut(&name)) {
            (Some(left_info), Some(right_info)) => compare(left_info, right_info)?,
            _ => continue,
        };

        match verdict {
            Verdict::Keep => {}
            Verdict::RemoveBoth => {
                left.remove(&name);
                right.remove(&name);
            }
            Verdict::Prune {
                left: prune_left,
                right: prune_right,
            } => {
                if prune_left {
                    left.remove(&name);
                }
                if prune_right {
                    right.remove(&name);
                }
            }
            Verdict::Corrupt => {
                let mut path = left.full_path();
                path.push(&name);
                return StructuralCorruptionSnafu {
                    path: path.to_string_lossy().into_owned(),
                }
                .fail();
            }
        }
    }

    Ok(())
}

fn compare(left: &mut EntryInfo, right: &mut EntryInfo) -> Result<Verdict, DiffError> {
    if left.kind.is_directory() && right.kind.is_directory() {
        let (Some(left_child), Some(right_child)) =
            (left.child.as_deref_mut(), right.child.as_deref_mut())
        else {
            return Ok(Verdict::Corrupt);
        };
        remove_common(left_child, right_child)?;
        return Ok(Verdict::Prune {
            left: left_child.is_empty(),
            right: right_child.is_empty(),
        });
    }

    if left.same_metadata(right) {
        Ok(Verdict::RemoveBoth)
    } else {
        Ok(Verdict::Keep)
    }
}

#[derive(Debug, Snafu)]
pub enum DiffError {
    #[snafu(display("Directory entry {} has no directory tree attached", path))]
    StructuralCorruption { path: String },
}
