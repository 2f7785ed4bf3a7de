use log::{debug, info, log_enabled, warn, Level};

use crate::util::hex::format_hex_compact;

/// Longest frame prefix written by [`log_frame_hex`]
const MAX_LOG_BYTES: usize = 64;

/// Initializes the logger with the `env_logger` crate.
///
/// Verbosity follows `RUST_LOG`; without it only warnings and errors are shown.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}

/// Initializes the logger at a fixed level, ignoring `RUST_LOG`.
pub fn init_logger_with_level(level: log::LevelFilter) {
    let _ = env_logger::Builder::new().filter_level(level).try_init();
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Hex-dump a frame at debug level, truncated to keep log lines short
pub fn log_frame_hex(prefix: &str, data: &[u8]) {
    if !log_enabled!(Level::Debug) {
        return;
    }
    let shown = &data[..data.len().min(MAX_LOG_BYTES)];
    let suffix = if data.len() > MAX_LOG_BYTES {
        format!(" ... ({} bytes total)", data.len())
    } else {
        String::new()
    };
    debug!("{prefix}: {}{suffix}", format_hex_compact(shown));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_helpers_do_not_panic() {
        init_logger_with_level(log::LevelFilter::Debug);
        init_logger();
        log_warn("warn");
        log_info("info");
        log_frame_hex("frame", &[0u8; 100]);
        log_frame_hex("empty", &[]);
    }
}
