//! Tracing setup for the binary: one fmt layer on stderr behind an `EnvFilter`.
//!
//! Levels reach here from three places (CLI `-v` flags, `STELLAR_LOG_LEVEL`,
//! `[app] log_level`); config validates them up front with [`validate`] so a
//! typo fails at load time instead of silently filtering everything out.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Check a level setting.
///
/// A bare word must be a real level (`warn`, `debug`, ...). Anything with a
/// `=` or `,` is treated as an `EnvFilter` directive list such as
/// `"stellar_tales=debug,reqwest=warn"`.
pub fn validate(level: &str) -> Result<(), AppError> {
    let level = level.trim();
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    if level.contains(['=', ',']) {
        EnvFilter::try_new(level)
            .map(|_| ())
            .map_err(|e| AppError::Logger(format!("invalid filter directives '{level}': {e}")))
    } else {
        level
            .parse::<LevelFilter>()
            .map(|_| ())
            .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
    }
}

/// Pick the filter to install.
///
/// With `cli_forced`, `level` wins and `RUST_LOG` is only consulted if `level`
/// is unusable. Otherwise a valid `RUST_LOG` wins over `level`.
pub fn filter_for(level: &str, cli_forced: bool) -> Result<EnvFilter, AppError> {
    let from_level = || validate(level).and_then(|()| {
        EnvFilter::try_new(level.trim()).map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
    });
    let from_env = || EnvFilter::try_from_default_env().ok();

    if cli_forced {
        from_level().or_else(|e| from_env().ok_or(e))
    } else {
        from_env().map_or_else(from_level, Ok)
    }
}

/// Install the global subscriber. Fails if one is already set.
pub fn init(level: &str, cli_forced: bool) -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(level, cli_forced)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}
