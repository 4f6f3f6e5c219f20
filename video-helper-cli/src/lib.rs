// video-helper-cli/src/lib.rs
//
// Library portion of the video-helper CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands};
pub use commands::convert::run_convert;
pub use commands::extract::run_extract;
pub use commands::probe::run_probe;
pub use commands::srt2vtt::run_srt2vtt;
pub use commands::validate::run_validate;
pub use error::{CliErrorContext, CliResult};
