//! Command-line surface shared by the executables.

use std::ffi::OsString;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Args, Parser};
use tracing_subscriber::EnvFilter;

use prk_core::{BackendKind, Result};

use crate::config::{RunConfig, TriadConfig, DEFAULT_RADIUS, DEFAULT_TILE_SIZE};
use crate::stencil::parse_pattern;

/// Flags accepted by every executable.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log only errors (results and banners still print)
    #[arg(short, long)]
    pub quiet: bool,

    /// Backends to attempt (comma-separated: reference,cpu,gpu)
    #[arg(long, value_delimiter = ',', default_values_t = BackendKind::ALL.to_vec())]
    pub backends: Vec<BackendKind>,
}

/// Stencil benchmark over a 2-D grid
#[derive(Parser, Debug)]
#[command(name = "stencil", version, about, long_about = None)]
#[command(allow_negative_numbers = true)]
pub struct StencilArgs {
    /// Number of timed iterations
    pub iterations: i64,

    /// Linear grid dimension
    pub dimension: i64,

    /// Loop tile size (non-positive or larger than the grid means the grid size)
    pub tile_size: Option<i64>,

    /// Stencil pattern (star or grid)
    pub pattern: Option<String>,

    /// Stencil radius
    pub radius: Option<i64>,

    /// Shared flags.
    #[command(flatten)]
    pub common: CommonArgs,
}

impl StencilArgs {
    /// Validate into a run configuration.
    pub fn config(&self) -> Result<RunConfig> {
        RunConfig::new(
            self.iterations,
            self.dimension,
            self.tile_size.unwrap_or(DEFAULT_TILE_SIZE),
            parse_pattern(self.pattern.as_deref().unwrap_or("star")),
            self.radius.unwrap_or(DEFAULT_RADIUS),
        )
    }
}

/// STREAM triad benchmark
#[derive(Parser, Debug)]
#[command(name = "nstream", version, about, long_about = None)]
#[command(allow_negative_numbers = true)]
pub struct NstreamArgs {
    /// Number of timed iterations
    pub iterations: i64,

    /// Elements per vector
    pub length: i64,

    /// Offset between vectors
    pub offset: Option<i64>,

    /// Shared flags.
    #[command(flatten)]
    pub common: CommonArgs,
}

impl NstreamArgs {
    /// Validate into a triad configuration.
    pub fn config(&self) -> Result<TriadConfig> {
        TriadConfig::new(self.iterations, self.length, self.offset.unwrap_or(0))
    }
}

/// Why parsing ended the process early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyExit {
    /// Help or version text was printed.
    Info,
    /// The arguments were malformed and the usage line was printed.
    Usage,
}

impl EarlyExit {
    /// Process exit code.
    pub fn code(self) -> ExitCode {
        match self {
            EarlyExit::Info => ExitCode::SUCCESS,
            EarlyExit::Usage => ExitCode::FAILURE,
        }
    }
}

/// Parse `args`.
///
/// Help and version requests print through clap. Any other parse failure
/// prints `usage` on stdout.
pub fn parse<P, I, T>(args: I, usage: &str) -> std::result::Result<P, EarlyExit>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    P::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            EarlyExit::Info
        }
        _ => {
            println!("{}", usage);
            EarlyExit::Usage
        }
    })
}

/// Install the stderr log subscriber.
pub fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
