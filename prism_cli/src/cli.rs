use clap::ValueEnum;
use log::LevelFilter;

/// Value of every binary's `--log-level` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Args {
        #[arg(long, default_value = "info")]
        log_level: LogLevel,
    }

    #[test]
    fn levels_parse_from_the_command_line() {
        let args = Args::parse_from(["bin"]);
        assert_eq!(args.log_level, LogLevel::default());
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Info);

        let args = Args::parse_from(["bin", "--log-level", "trace"]);
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Trace);

        assert!(Args::try_parse_from(["bin", "--log-level", "loud"]).is_err());
    }
}
