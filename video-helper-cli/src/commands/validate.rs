// video-helper-cli/src/commands/validate.rs

use video_helper_core::external::CrateFfprobeExecutor;
use video_helper_core::{CoreConfig, is_valid_video_file};

use crate::cli::ValidateArgs;
use crate::output::{print_failure, print_success};

/// Returns whether the input is a valid video.
pub fn run_validate(args: &ValidateArgs, config: &CoreConfig) -> bool {
    let valid = is_valid_video_file(&CrateFfprobeExecutor::new(), &args.input, config);
    if valid {
        print_success(&format!("{} is a valid video", args.input.display()));
    } else {
        print_failure(&format!("{} is not a valid video", args.input.display()));
    }
    valid
}
