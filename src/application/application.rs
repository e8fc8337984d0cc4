use std::io::Write;

use colored::Colorize;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::application::{ComparerConfig, ListerConfig};
use crate::codec::{self, DecodeError, EncodeError};
use crate::diff::{self, DiffError};
use crate::filesystem::{FilesystemReader, ReadTreeError};

const SECTION_RULE: &str = "----------------------------------------";

pub struct Application;

impl Application {
    /// Writes the snapshot of the configured directory to `out`. Nothing is
    /// written unless the whole tree encodes.
    pub fn list(
        config: impl Into<ListerConfig>,
        out: &mut impl Write,
    ) -> Result<(), ApplicationError> {
        let config: ListerConfig = config.into();
        debug!("Lister config: {:?}", config);

        let tree = FilesystemReader::build_from_path(&config.path).context(BuildSnafu)?;
        let text = codec::encode_to_vec(&tree).context(OutputSnafu)?;
        out.write_all(&text).context(WriteSnafu)?;
        out.flush().context(WriteSnafu)?;

        Ok(())
    }

    /// Prunes everything the directory and the snapshot file agree on and
    /// writes what is left of each side to `out`.
    pub fn compare(
        config: impl Into<ComparerConfig>,
        out: &mut impl Write,
    ) -> Result<(), ApplicationError> {
        let config: ComparerConfig = config.into();
        debug!("Comparer config: {:?}", config);

        let mut from_path = FilesystemReader::build_from_path(&config.path).context(BuildSnafu)?;
        let mut from_file =
            codec::decode_file(&config.snapshot, config.decode_mode).context(LoadSnapshotSnafu)?;

        diff::remove_common(&mut from_path, &mut from_file).context(RemoveCommonSnafu)?;
        info!(
            "{} entries remain from the path, {} from the file",
            from_path.entry_count(),
            from_file.entry_count()
        );

        writeln!(out, "{} {}", "From Path:".bold(), SECTION_RULE).context(WriteSnafu)?;
        codec::encode(&from_path, out).context(OutputSnafu)?;
        writeln!(out, "{} {}", "From File:".bold(), SECTION_RULE).context(WriteSnafu)?;
        codec::encode(&from_file, out).context(OutputSnafu)?;
        out.flush().context(WriteSnafu)?;

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while reading the directory tree"))]
    BuildError { source: ReadTreeError },
    #[snafu(display("Critical failure encountered while loading the snapshot file"))]
    LoadSnapshotError { source: DecodeError },
    #[snafu(display("Critical failure encountered while removing common entries"))]
    RemoveCommonError { source: DiffError },
    #[snafu(display("Failed to encode the snapshot"))]
    OutputError { source: EncodeError },
    #[snafu(display("Failed to write to the output stream"))]
    WriteError { source: std::io::Error },
}
