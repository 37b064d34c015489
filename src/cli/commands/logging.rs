use clap::{Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names accepted by `MENU_LOGIN_LOG_LEVEL`, indexed by verbosity count.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept either a verbosity count or a level name.
fn parse_level(value: &str) -> Result<u8, String> {
    if let Ok(count) = value.parse::<u8>() {
        return if count <= 5 {
            Ok(count)
        } else {
            Err(format!("verbosity {count} is above 5"))
        };
    }
    LEVEL_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(value))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("unknown log level: {value}"))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Repeat for more output, or set a level name (error..trace)")
            .env("MENU_LOGIN_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(parse_level),
    )
}
