//! Snapshots of directory trees and the drift between them.
//!
//! A snapshot is built either by walking a live directory
//! ([`filesystem::FilesystemReader`]) or by decoding its canonical text form
//! ([`codec::decode_lines`]). [`diff::remove_common`] prunes everything two
//! snapshots agree on, so what remains is the drift between them.
//!
//! ```no_run
//! use dirsnap::{codec, diff, filesystem::FilesystemReader};
//!
//! let mut live = FilesystemReader::build_from_path("/srv/data")?;
//! let mut baseline = codec::decode_file("baseline.txt", codec::DecodeMode::Strict)?;
//! diff::remove_common(&mut live, &mut baseline)?;
//! codec::encode(&live, &mut std::io::stdout())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![allow(clippy::enum_variant_names)]

pub mod application;
pub mod cli;
pub mod codec;
pub mod diff;
pub mod filesystem;

mod ext;
