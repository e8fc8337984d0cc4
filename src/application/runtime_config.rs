use std::path::PathBuf;

use crate::cli::{ComparerCli, ListerCli};
use crate::codec::DecodeMode;

#[derive(Debug, Clone)]
pub struct ListerConfig {
    pub path: PathBuf,
}

impl From<ListerCli> for ListerConfig {
    fn from(cli: ListerCli) -> Self {
        Self { path: cli.path }
    }
}

#[derive(Debug, Clone)]
pub struct ComparerConfig {
    pub path: PathBuf,
    pub snapshot: PathBuf,
    pub decode_mode: DecodeMode,
}

impl From<ComparerCli> for ComparerConfig {
    fn from(cli: ComparerCli) -> Self {
        let decode_mode = if cli.permissive {
            DecodeMode::Permissive
        } else {
            DecodeMode::Strict
        };
        Self {
            path: cli.path,
            snapshot: cli.snapshot,
            decode_mode,
        }
    }
}
