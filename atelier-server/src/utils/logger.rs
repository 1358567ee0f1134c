//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.

use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing_subscriber::EnvFilter;

/// Initialize the logger with optional JSON format and file output.
///
/// `RUST_LOG` wins over `log_level` when set. File output is only used when
/// `log_dir` already exists.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},sqlx=warn,tower_http=info")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    let file_writer = log_dir.map(Path::new).filter(|p| p.exists()).map(|p| {
        tracing_appender::rolling::daily(p, "atelier-server")
    });

    // try_init: tests may initialize more than once
    let result = match (json, file_writer) {
        (true, Some(writer)) => builder.json().with_writer(writer).try_init(),
        (true, None) => builder.json().try_init(),
        (false, Some(writer)) => builder.with_ansi(false).with_writer(writer).try_init(),
        (false, None) => builder.try_init(),
    };
    if let Err(e) = result {
        eprintln!("Logger already initialized: {e}");
    }
}

/// Remove rolled log files older than `days`
pub fn cleanup_old_logs(log_dir: &str, days: u64) -> std::io::Result<usize> {
    let dir = Path::new(log_dir);
    if !dir.exists() {
        return Ok(0);
    }
    let max_age = Duration::from_secs(days * 24 * 60 * 60);
    let now = SystemTime::now();
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("atelier-server"));
        if !is_log || !path.is_file() {
            continue;
        }
        let age = entry
            .metadata()?
            .modified()
            .ok()
            .and_then(|m| now.duration_since(m).ok())
            .unwrap_or_default();
        if age > max_age {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_skips_missing_dir_and_fresh_files() {
        assert_eq!(cleanup_old_logs("/definitely/not/here", 7).unwrap(), 0);

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("atelier-server.2026-01-01"), "x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let removed = cleanup_old_logs(dir.path().to_str().unwrap(), 7).unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("atelier-server.2026-01-01").exists());
    }
}
