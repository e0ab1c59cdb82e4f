pub mod formats;

use flexi_logger::Logger;

use crate::Error;

/// Environment variable holding a log spec that overrides `--verbose`.
pub const LOG_ENV: &str = "WASTEWISE_LOG";

/// Start logging to stderr so command output on stdout stays clean.
pub fn init(verbose: bool) -> Result<(), Error> {
    let spec = std::env::var(LOG_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default_spec(verbose).to_string());

    Logger::try_with_str(spec)?
        .format(formats::cli_format)
        .log_to_stderr()
        .start()?;
    Ok(())
}

fn default_spec(verbose: bool) -> &'static str {
    if verbose {
        "debug, sqlx=warn"
    } else {
        "info, sqlx=warn"
    }
}
