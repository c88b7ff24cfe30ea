//! Stencil benchmark executable.
//!
//! ```bash
//! stencil <# iterations> <array dimension> [<tile size> <star/grid> <stencil radius>]
//! stencil 10 1000 32 star 2 --backends cpu,gpu
//! ```

use std::process::ExitCode;

use tracing::error;

use prk_kernels::cli::{self, StencilArgs};
use prk_kernels::config::STENCIL_USAGE;
use prk_kernels::{report, Session};

#[tokio::main]
async fn main() -> ExitCode {
    let args: StencilArgs = match cli::parse(std::env::args_os(), STENCIL_USAGE) {
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
    print!("{}", report::stencil_banner(&config));

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
