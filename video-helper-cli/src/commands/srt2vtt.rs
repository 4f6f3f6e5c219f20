// video-helper-cli/src/commands/srt2vtt.rs

use video_helper_core::srt_to_vtt;

use crate::cli::Srt2VttArgs;
use crate::error::CliResult;
use crate::output::{print_info, print_success};

pub fn run_srt2vtt(args: &Srt2VttArgs) -> CliResult<()> {
    let outputs = srt_to_vtt(&args.srt, args.vtt.as_deref(), args.css.as_deref())?;

    print_success("Conversion complete");
    print_info("WebVTT", outputs.vtt.display());
    print_info("Stylesheet", outputs.css.display());
    print_info("Colors", outputs.colors.len());
    Ok(())
}
