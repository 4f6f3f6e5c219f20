// ============================================================================
// video-helper-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger configuration for the CLI
//
// The library only uses the `log` facade; the binary decides where records go.
// The level comes from the -v/-q flags unless RUST_LOG is set, in which case
// RUST_LOG wins:
// - default: info
// - -v: debug (every ffmpeg/ffprobe command line)
// - -vv: trace
// - -q: errors only

use log::LevelFilter;
use owo_colors::OwoColorize;
use std::io::Write;

/// Log level selected by the command-line flags.
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger. Records go to stderr so command output on
/// stdout stays machine readable.
pub fn init(verbose: u8, quiet: bool) {
    let level = level_for(verbose, quiet);
    let use_color = crate::output::should_use_color();

    let mut builder = env_logger::Builder::new();
    builder
        .format(move |buf, record| {
            let level_str = match record.level() {
                log::Level::Error => "ERROR",
                log::Level::Warn => "WARN ",
                log::Level::Info => "INFO ",
                log::Level::Debug => "DEBUG",
                log::Level::Trace => "TRACE",
            };
            if !use_color {
                return writeln!(buf, "{level_str} {}", record.args());
            }
            match record.level() {
                log::Level::Error => writeln!(buf, "{} {}", level_str.bright_red(), record.args()),
                log::Level::Warn => writeln!(buf, "{} {}", level_str.yellow(), record.args()),
                log::Level::Info => writeln!(buf, "{} {}", level_str.green(), record.args()),
                log::Level::Debug => writeln!(buf, "{} {}", level_str.blue(), record.args()),
                log::Level::Trace => writeln!(buf, "{} {}", level_str.magenta(), record.args()),
            }
        })
        .filter_level(level)
        .parse_default_env();

    // A second init (e.g. in tests) keeps the first logger
    let _ = builder.try_init();
    log::debug!("Logger initialized with level: {level}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(0, false), LevelFilter::Info);
        assert_eq!(level_for(1, false), LevelFilter::Debug);
        assert_eq!(level_for(3, false), LevelFilter::Trace);
        assert_eq!(level_for(2, true), LevelFilter::Error);
    }
}
