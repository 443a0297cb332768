//! Pluggable logging for migration runs.

/// Syslog-style severity accepted by a [`MigrationLogger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Step-level detail.
    Debug,
    /// Normal progress.
    Info,
    /// Normal but significant condition.
    Notice,
    /// Something unexpected that did not stop the run.
    Warning,
    /// A run failed.
    Error,
    /// Critical condition.
    Crit,
    /// Immediate operator action needed.
    Alert,
}

impl Severity {
    /// The syslog name of this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Crit => "crit",
            Severity::Alert => "alert",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives the engine's log lines.
pub trait MigrationLogger: Send + Sync {
    /// Record one message.
    fn log(&self, severity: Severity, message: &str);
}

impl<F> MigrationLogger for F
where
    F: Fn(Severity, &str) + Send + Sync,
{
    fn log(&self, severity: Severity, message: &str) {
        self(severity, message)
    }
}

/// Default logger forwarding to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl MigrationLogger for TracingLogger {
    fn log(&self, severity: Severity, message: &str) {
        let syslog = severity.as_str();
        match severity {
            Severity::Debug => tracing::debug!(target: "stepwise", syslog, "{message}"),
            Severity::Info | Severity::Notice => {
                tracing::info!(target: "stepwise", syslog, "{message}")
            }
            Severity::Warning => tracing::warn!(target: "stepwise", syslog, "{message}"),
            Severity::Error | Severity::Crit | Severity::Alert => {
                tracing::error!(target: "stepwise", syslog, "{message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_severity_ordering_and_names() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Crit < Severity::Alert);
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Crit.as_str(), "crit");
    }

    #[test]
    fn test_closure_logger() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let logger = move |severity: Severity, message: &str| {
            sink.lock().push(format!("{severity}: {message}"));
        };

        logger.log(Severity::Info, "hello");
        assert_eq!(lines.lock().as_slice(), ["info: hello".to_string()]);
    }
}
