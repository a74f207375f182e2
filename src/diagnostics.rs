//! Injected diagnostics sink.
//!
//! Components never reach for a global logger directly; they hold an
//! `Arc<dyn Diagnostics>` handed to them at construction. The default sink
//! forwards to `tracing`, tests use [`MemoryDiagnostics`] to inspect what was
//! reported.

use std::sync::{Arc, Mutex};
use strum_macros::{Display, EnumString};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

pub trait Diagnostics: Send + Sync {
    fn report(&self, severity: Severity, message: &str);
}

/// Forwards every report to `tracing`, tagged with the owning component.
#[derive(Debug, Clone)]
pub struct TracingDiagnostics {
    component: &'static str,
}

impl TracingDiagnostics {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn shared(component: &'static str) -> Arc<dyn Diagnostics> {
        Arc::new(Self::new(component))
    }
}

impl Default for TracingDiagnostics {
    fn default() -> Self {
        Self::new("reach_study")
    }
}

impl Diagnostics for TracingDiagnostics {
    fn report(&self, severity: Severity, message: &str) {
        let component = self.component;
        match severity {
            Severity::Debug => debug!(component, "{}", message),
            Severity::Info => info!(component, "{}", message),
            Severity::Warn => warn!(component, "{}", message),
            Severity::Error => error!(component, "{}", message),
            Severity::Fatal => error!(component, fatal = true, "{}", message),
        }
    }
}

/// Collects reports in memory.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries().iter().filter(|(s, _)| *s == severity).count()
    }

    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(s, msg)| *s == severity && msg.contains(needle))
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn report(&self, severity: Severity, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((severity, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_severity_names() {
        assert_eq!(Severity::Fatal.to_string(), "FATAL");
        assert_eq!(Severity::from_str("WARN").unwrap(), Severity::Warn);
        assert!(Severity::Fatal > Severity::Error);
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemoryDiagnostics::new();
        sink.report(Severity::Info, "first");
        sink.report(Severity::Error, "second");

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (Severity::Info, "first".to_string()));
        assert!(sink.contains(Severity::Error, "sec"));
        assert_eq!(sink.count(Severity::Warn), 0);
    }
}
