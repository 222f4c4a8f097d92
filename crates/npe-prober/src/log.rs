use std::fmt::Write as _;
use std::sync::Mutex;

use tracing::Level;

/// A probe-scoped log: every record is buffered for the debug dump, and
/// forwarded to the global subscriber when `forward` admits its level
/// (`--log.prober`; off by default).
pub struct ProbeLog {
    module: String,
    forward: Option<Level>,
    buffer: Mutex<Vec<String>>,
}

impl ProbeLog {
    pub fn new(module: impl Into<String>, forward: Option<Level>) -> Self {
        Self {
            module: module.into(),
            forward,
            buffer: Mutex::new(Vec::new()),
        }
    }

    pub fn info(&self, msg: &str, fields: &[(&str, String)]) {
        self.record(Level::INFO, msg, fields);
    }

    pub fn warn(&self, msg: &str, fields: &[(&str, String)]) {
        self.record(Level::WARN, msg, fields);
    }

    pub fn error(&self, msg: &str, fields: &[(&str, String)]) {
        self.record(Level::ERROR, msg, fields);
    }

    fn record(&self, level: Level, msg: &str, fields: &[(&str, String)]) {
        let mut line = format!(
            "ts={} level={} module={} msg={:?}",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            level.to_string().to_lowercase(),
            self.module,
            msg,
        );
        for (key, value) in fields {
            let _ = write!(line, " {key}={value:?}");
        }

        self.buffer.lock().unwrap().push(line);

        if self.forward.is_some_and(|max| level <= max) {
            let fields = fields
                .iter()
                .map(|(k, v)| format!("{k}={v:?}"))
                .collect::<Vec<_>>()
                .join(" ");
            if level == Level::ERROR {
                tracing::error!(module = %self.module, %fields, "{msg}");
            } else if level == Level::WARN {
                tracing::warn!(module = %self.module, %fields, "{msg}");
            } else {
                tracing::info!(module = %self.module, %fields, "{msg}");
            }
        }
    }

    /// The buffered records, in order.
    pub fn lines(&self) -> Vec<String> {
        self.buffer.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_buffered_in_order() {
        let log = ProbeLog::new("ping", None);
        log.info("Beginning probe", &[("timeout_seconds", "9.5".to_string())]);
        log.error("Probe failed", &[]);

        let lines = log.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("level=info"));
        assert!(lines[0].contains("module=ping"));
        assert!(lines[0].contains("timeout_seconds=\"9.5\""));
        assert!(lines[1].contains("level=error"));
        assert!(lines[1].contains("\"Probe failed\""));
    }
}
