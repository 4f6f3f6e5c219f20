// video-helper-cli/src/commands/convert.rs

use std::time::Instant;

use video_helper_core::external::{CrateFfprobeExecutor, SidecarSpawner};
use video_helper_core::{CoreConfig, convert};

use crate::cli::ConvertArgs;
use crate::error::CliResult;
use crate::output::{print_info, print_success};

pub fn run_convert(args: &ConvertArgs, config: &CoreConfig) -> CliResult<()> {
    let start = Instant::now();
    let request = args.request();

    let output = convert(
        &CrateFfprobeExecutor::new(),
        &SidecarSpawner,
        &args.input,
        args.output.as_deref(),
        &request,
        config,
    )?;

    print_success("Video converted");
    print_info("Output", output.display());
    print_info("Elapsed", format!("{:.1}s", start.elapsed().as_secs_f64()));
    Ok(())
}
