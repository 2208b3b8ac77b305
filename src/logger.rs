//! Process-wide logger setup on top of `env_logger`.
//!
//! `RUST_LOG` always wins. Without it, development logs at `debug` in the usual
//! human-readable format and production logs at `info`, one JSON object per line.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use env_logger::{Builder, Env};
use log::{Record, SetLoggerError};
use serde_json::{json, Value};

use crate::config::Environment;

pub fn init(environment: Environment) -> Result<(), SetLoggerError> {
    let default_level = match environment {
        Environment::Development => "debug",
        Environment::Production => "info",
    };

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    if environment == Environment::Production {
        builder.format(|buf, record| writeln!(buf, "{}", json_line(record, Utc::now())));
    }
    builder.try_init()
}

/// Structured form of a log record, as written in production.
pub fn json_line(record: &Record, at: DateTime<Utc>) -> Value {
    json!({
        "time": at.to_rfc3339_opts(SecondsFormat::Millis, true),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use log::Level;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_line() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let line = json_line(
            &Record::builder()
                .args(format_args!("failed to create task: {}", "pool timed out"))
                .level(Level::Error)
                .target("taskmaster::routes::tasks")
                .build(),
            at,
        );

        assert_eq!(
            line,
            json!({
                "time": "2024-01-02T03:04:05.000Z",
                "level": "ERROR",
                "target": "taskmaster::routes::tasks",
                "msg": "failed to create task: pool timed out",
            })
        );
    }
}
