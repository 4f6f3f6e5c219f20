// video-helper-cli/src/commands/probe.rs

use video_helper_core::external::CrateFfprobeExecutor;
use video_helper_core::{CoreConfig, CoreError, format_timecode, probe_video};

use crate::cli::ProbeArgs;
use crate::error::CliResult;
use crate::output::{print_heading, print_info};

pub fn run_probe(args: &ProbeArgs, config: &CoreConfig) -> CliResult<()> {
    let descriptor = probe_video(&CrateFfprobeExecutor::new(), &args.input, config)?;

    if args.json {
        let json = serde_json::to_string_pretty(&descriptor)
            .map_err(|e| CoreError::JsonParse(format!("descriptor serialization: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    print_heading(&args.input.display().to_string());
    print_info("Resolution", format!("{}x{}", descriptor.width, descriptor.height));
    print_info(
        "Duration",
        format!("{} ({:.3}s)", format_timecode(descriptor.duration), descriptor.duration),
    );
    print_info("Frame rate", format!("{:.3} fps", descriptor.frame_rate));
    print_info("Frames", descriptor.total_frames());
    print_info("Audio", if descriptor.has_sound { "yes" } else { "no" });
    Ok(())
}
