use std::io::Write;

use chrono::{Local, Utc};
use env_logger::{Builder, Target};
use log::LevelFilter;

use crate::config::Config;

/// Install the global logger.
///
/// Production emits one JSON object per line at `info` and above.
/// Development prints colored, human-readable lines at the configured level.
pub fn setup_logger(config: &Config) {
    let mut builder = build_logger(config);
    // A second call (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
}

fn build_logger(config: &Config) -> Builder {
    let mut builder = Builder::new();
    builder.target(Target::Stdout);

    if config.is_production() {
        builder.filter_level(LevelFilter::Info).format(|buf, record| {
            let line = serde_json::json!({
                "level": record.level().to_string(),
                "time": Utc::now().to_rfc3339(),
                "target": record.target(),
                "msg": record.args().to_string(),
            });
            writeln!(buf, "{}", line)
        });
    } else {
        builder
            .filter_level(level_filter(&config.log_level))
            .format(|buf, record| {
                let level = buf.default_styled_level(record.level());
                writeln!(
                    buf,
                    "{} [{}] {} {}",
                    level,
                    Local::now().format("%H:%M:%S"),
                    record.target(),
                    record.args()
                )
            });
    }

    builder
}

/// Map a `LOG_LEVEL` value onto a filter; unknown values mean `debug`.
pub fn level_filter(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_map_to_filters() {
        assert_eq!(level_filter("INFO"), LevelFilter::Info);
        assert_eq!(level_filter("warn"), LevelFilter::Warn);
        assert_eq!(level_filter("error"), LevelFilter::Error);
        assert_eq!(level_filter("chatty"), LevelFilter::Debug);
    }
}
