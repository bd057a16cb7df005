use std::io::Write;

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};

/// Map `-v` occurrences to a log level for this crate.
fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error, // default: only errors
        1 => LevelFilter::Info,  // -v: model calls, file counts
        2 => LevelFilter::Debug, // -vv: raw responses, repairs
        _ => LevelFilter::Trace, // -vvv: full prompts and request bodies
    }
}

/// Logs go to stderr so stdout stays clean for the review or commit message.
pub fn init_logger(verbosity: u8) {
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Warn);
    builder.filter_module("codekoala", level_for(verbosity));

    builder.format(|buf, record| {
        let level_label = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".white().bold(),
            Level::Debug => "DEBUG".bright_black(),
            Level::Trace => "TRACE".bright_black(),
        };

        writeln!(buf, "{} {}", level_label, record.args())
    });

    builder.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), LevelFilter::Error);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(2), LevelFilter::Debug);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }
}
