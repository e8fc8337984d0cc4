//! Canonical text form of a snapshot.
//!
//! One line per entry, written depth first in ascending name order:
//!
//! ```text
//! bar 4 0 2024-01-01 00:00:00.000000000
//! bar/baz.txt 8 20 2024-01-01 00:00:00.000000000
//! foo.txt 8 10 2024-01-01 00:00:00.000000000
//! ```
//!
//! The fields after the path are the kind code, the size in bytes and the UTC
//! modification time with nanoseconds. Decoding the output of [`encode`]
//! yields a tree equal to the one encoded.

mod decode;
mod encode;
mod timestamp;

pub use decode::{DecodeError, DecodeMode, ParseFailure, decode_file, decode_lines};
pub use encode::{EncodeError, encode, encode_to_vec};
