use std::io::{self, BufWriter};

use clap::Parser as _;
use tracing::debug;

use dirsnap::application::{Application, ApplicationError, setup_colors, setup_tracing};
use dirsnap::cli::ComparerCli;

#[snafu::report]
fn main() -> Result<(), ApplicationError> {
    let cli_args = ComparerCli::parse();
    setup_tracing(cli_args.log_level);
    setup_colors();
    debug!("Parsed CLI arguments: {cli_args:?}");

    let mut out = BufWriter::new(io::stdout().lock());
    Application::compare(cli_args, &mut out)
}
