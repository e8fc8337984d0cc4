use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Prints a snapshot of a directory tree, one line per entry.
#[derive(Parser, Debug, Clone)]
#[command(name = "file-lister", version)]
pub struct ListerCli {
    /// Directory to list
    #[clap(default_value = ".")]
    pub path: PathBuf,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}

/// Compares a directory tree against a snapshot file and prints what differs.
#[derive(Parser, Debug, Clone)]
#[command(name = "file-comparer", version)]
pub struct ComparerCli {
    /// Directory to read
    pub path: PathBuf,
    /// Snapshot file previously written by file-lister
    pub snapshot: PathBuf,
    /// Create directories the snapshot uses before declaring them, instead of failing
    #[clap(long)]
    pub permissive: bool,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lister_defaults_to_current_directory() {
        let cli = ListerCli::try_parse_from(["file-lister"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn comparer_requires_both_paths() {
        assert!(ComparerCli::try_parse_from(["file-comparer", "dir"]).is_err());

        let cli = ComparerCli::try_parse_from([
            "file-comparer",
            "dir",
            "snapshot.txt",
            "--permissive",
            "-l",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.path, PathBuf::from("dir"));
        assert_eq!(cli.snapshot, PathBuf::from("snapshot.txt"));
        assert!(cli.permissive);
        assert_eq!(cli.log_level, LogLevel::Debug);
    }
}
