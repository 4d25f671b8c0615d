//! tracing setup
//!
//! Output goes to stderr so command results on stdout stay pipeable. With a
//! log directory, output goes to a daily file `variant-engine.YYYY-MM-DD`
//! instead.

use std::path::Path;

use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "variant-engine";

/// stderr logging at `info`
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// `log_level` is either a level (`debug`) or a filter directive such as
/// `variant_engine=debug,cloud_client=warn`; an unparsable value falls back
/// to `info`. A `log_dir` that does not exist is ignored.
///
/// Calling this twice keeps the first subscriber.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = log_level
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = match log_dir.map(Path::new).filter(|dir| dir.is_dir()) {
        Some(dir) => builder
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
            .try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    if installed.is_err() {
        tracing::debug!("Logger already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_creates_daily_file() {
        let dir = tempfile::TempDir::new().unwrap();
        init_logger_with_file(Some("variant_engine=debug"), dir.path().to_str());
        tracing::info!("hello");
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        // another test may have installed the subscriber first
        assert!(names.is_empty() || names[0].starts_with(LOG_FILE_PREFIX));
    }
}
