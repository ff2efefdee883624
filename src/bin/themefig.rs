//! `themefig`: inspect, override, and reset a theme's theme.json settings
//! from the command line.
//!
//! ```sh
//! themefig --theme ./theme.json fields
//! themefig --theme ./theme.json save 'color[custom]=false' 'typography[fontSizes]=[]'
//! themefig --theme ./theme.json effective
//! themefig --store-dir ./state reset
//! ```
//!
//! Options come from `--config FILE` and `THEMEFIG__*` environment variables;
//! log verbosity from `RUST_LOG`.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use themefig::cli::{self, Cli};
use themefig::{ThemefigError, options};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Cli) -> Result<(), ThemefigError> {
    let opts = options::load(args.global.config.as_deref())?;
    println!("{}", cli::run(args, opts)?);
    Ok(())
}
