//! CLI entry point for dimcheck.

mod cli;
mod cmd;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Windows defaults to a 1MB main-thread stack; match the 8MB Linux default.
    const STACK_SIZE: usize = 8 * 1024 * 1024;

    let thread = std::thread::Builder::new()
        .stack_size(STACK_SIZE)
        .spawn(run)
        .expect("failed to spawn main thread");

    match thread.join() {
        Ok(result) => result,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.debug);
    if cli.quiet {
        std::env::set_var("DIMCHECK_QUIET", "1");
    }

    match cli.command {
        Commands::Init { name, force } => cmd::init::cmd_init(name, force),
        Commands::Check {
            file,
            input_format,
            json,
            strict,
        } => cmd::check::cmd_check(&file, input_format.as_deref(), json, strict),
        Commands::Report {
            file,
            input_format,
            format,
            operator,
            part,
            order,
            comment,
            drawing,
            output_dir,
        } => cmd::report::cmd_report(cmd::report::ReportArgs {
            file,
            input_format,
            formats: format,
            operator,
            part_reference: part,
            order_reference: order,
            comment,
            drawing,
            output_dir,
        }),
        Commands::Template { output, force } => {
            cmd::template::cmd_template(output.as_deref(), force)
        }
        Commands::Entry { output } => cmd::entry::cmd_entry(output.as_deref()),
        Commands::Config => cmd::config::cmd_config(),
        Commands::Version => cmd::util::cmd_version(cli.verbose),
        Commands::Completion { shell } => cmd::util::cmd_completion(shell),
    }
}

/// Diagnostics go to stderr: `warn` by default, `info` with --verbose,
/// `debug` with --debug. `RUST_LOG` takes precedence.
fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();

    tracing::debug!("logging initialized at level: {}", level);
}
