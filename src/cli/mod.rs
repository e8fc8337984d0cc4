mod cli;

pub use cli::{ComparerCli, ListerCli};
