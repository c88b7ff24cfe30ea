//! STREAM triad executable.
//!
//! ```bash
//! nstream <# iterations> <vector length> [<offset>]
//! ```

use std::process::ExitCode;

use tracing::error;

use prk_kernels::cli::{self, NstreamArgs};
use prk_kernels::config::NSTREAM_USAGE;
use prk_kernels::{report, Session};

#[tokio::main]
async fn main() -> ExitCode {
    let args: NstreamArgs = match cli::parse(std::env::args_os(), NSTREAM_USAGE) {
        Ok(args) => args,
        Err(exit) => return exit.code(),
    };

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            println!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    cli::setup_logging(args.common.verbose, args.common.quiet);
    print!("{}", report::triad_banner(&config));

    let session = Session::new(args.common.backends.iter().copied());
    match session.run(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Backend setup failed: {}", e);
            println!("{}", e);
            ExitCode::FAILURE
        }
    }
}
