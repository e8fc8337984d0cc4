use std::io::{self, BufWriter};

use clap::Parser as _;
use tracing::debug;

use dirsnap::application::{Application, ApplicationError, setup_tracing};
use dirsnap::cli::ListerCli;

#[snafu::report]
fn main() -> Result<(), ApplicationError> {
    let cli_args = ListerCli::parse();
    setup_tracing(cli_args.log_level);
    debug!("Parsed CLI arguments: {cli_args:?}");

    let mut out = BufWriter::new(io::stdout().lock());
    Application::list(cli_args, &mut out)
}
