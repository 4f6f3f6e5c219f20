// video-helper-cli/src/main.rs
//
// Entry point of the `video-helper` binary.
//
// Responsibilities:
// - Parsing command-line arguments (`Cli`, `Commands`).
// - Setting up logging from -v/-q (or RUST_LOG).
// - Building and validating the `CoreConfig` shared by every command.
// - Dispatching to the command implementations.
// - Mapping failures to a non-zero exit code with the message on stderr.

use clap::Parser;
use std::process::ExitCode;

use video_helper_cli::{Cli, Commands, logging, run_convert, run_extract, run_probe, run_srt2vtt, run_validate};
use video_helper_core::CoreResult;

fn run(cli: &Cli) -> CoreResult<ExitCode> {
    let config = cli.core_config();
    config.validate()?;
    log::debug!("Configuration: {config:?}");

    match &cli.command {
        Commands::Probe(args) => run_probe(args, &config)?,
        Commands::Validate(args) => {
            if !run_validate(args, &config) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Convert(args) => run_convert(args, &config)?,
        Commands::Extract(args) => run_extract(args, &config)?,
        Commands::Srt2vtt(args) => run_srt2vtt(args)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            log::debug!("Command failed: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
