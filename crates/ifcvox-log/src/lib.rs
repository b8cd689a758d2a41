//! Structured logging for the ifcvox binaries.
//!
//! Console output carries uptime timestamps and module paths; when enabled in
//! the config, a JSON copy of every event is written to the log directory.
//! `RUST_LOG` takes precedence over the configured level.

use std::path::Path;

use ifcvox_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name of the JSON log inside the log directory.
pub const LOG_FILE: &str = "ifcvox.log";

/// Quiets the HTTP and PNG plumbing underneath the configured level.
const QUIET_DEPENDENCIES: &str = "tiny_http=warn,png=warn";

/// Filter directives for the given config: its `log_level` (or `info`)
/// followed by the dependency overrides.
pub fn filter_directives(config: Option<&Config>) -> String {
    let level = config
        .map(|c| c.debug.log_level.as_str())
        .filter(|l| !l.is_empty())
        .unwrap_or("info");
    format!("{level},{QUIET_DEPENDENCIES}")
}

/// Create an `EnvFilter` with the default directives.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(filter_directives(None))
}

/// Installs the global tracing subscriber.
///
/// File logging happens only when `log_dir` is given and the config enables
/// `debug.file_logging`; failure to create the file silently falls back to
/// console-only output.
///
/// # Examples
///
/// ```no_run
/// use ifcvox_config::Config;
/// use ifcvox_log::init_logging;
///
/// let mut config = Config::default();
/// config.debug.file_logging = true;
/// init_logging(Some(std::path::Path::new("./logs")), Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, config: Option<&Config>) {
    let filter_str = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let file_logging = config.is_some_and(|c| c.debug.file_logging);
    if file_logging
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}
