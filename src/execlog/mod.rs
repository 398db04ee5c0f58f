use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::RwLock;
use uuid::Uuid;

/// Classification of an execution log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogClass {
    Success,
    Error,
    Rollback,
}

impl LogClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogClass::Success => "Success",
            LogClass::Error => "Error",
            LogClass::Rollback => "Rollback",
        }
    }
}

/// One immutable line of the execution transcript
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub class: LogClass,
    pub message: String,
    pub line: String,
}

impl LogEntry {
    fn new(class: LogClass, message: &str) -> Self {
        let timestamp = Utc::now();
        let line = format!(
            "[{}] {}: {}",
            class.as_str(),
            timestamp.format("%H:%M:%S"),
            message
        );
        Self {
            id: Uuid::new_v4(),
            timestamp,
            class,
            message: message.to_string(),
            line,
        }
    }
}

/// Ordered, newest-first transcript of dispatch outcomes and manual markers.
/// Entries are never mutated or removed individually; only a whole-log clear
/// is permitted. Not device-scoped: outcomes of in-flight deploys land here
/// even if the selection has changed.
pub struct ExecutionLog {
    entries: RwLock<Vec<LogEntry>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Prepend a classified entry
    pub fn append(&self, class: LogClass, message: &str) -> LogEntry {
        let entry = LogEntry::new(class, message);
        let mut entries = self.entries.write().expect("execution log poisoned");
        entries.insert(0, entry.clone());
        entry
    }

    /// Operator-asserted rollback note; no dispatch occurs
    pub fn mark_rollback(&self, note: Option<&str>) -> LogEntry {
        self.append(
            LogClass::Rollback,
            note.unwrap_or("Manual rollback initiated"),
        )
    }

    pub fn clear(&self) {
        self.entries.write().expect("execution log poisoned").clear();
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().expect("execution log poisoned").clone()
    }
}

impl Default for ExecutionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_prepends() {
        let log = ExecutionLog::new();
        log.append(LogClass::Success, "first");
        log.append(LogClass::Error, "second");
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[1].message, "first");
    }

    #[test]
    fn test_clear_then_append() {
        let log = ExecutionLog::new();
        log.append(LogClass::Success, "old");
        log.append(LogClass::Error, "older");
        log.clear();
        assert!(log.entries().is_empty());
        log.append(LogClass::Success, "fresh");
        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "fresh");
    }

    #[test]
    fn test_line_format() {
        let log = ExecutionLog::new();
        let entry = log.append(LogClass::Success, "Applied bridge_add");
        assert!(entry.line.starts_with("[Success] "));
        assert!(entry.line.ends_with(": Applied bridge_add"));
    }

    #[test]
    fn test_rollback_marker() {
        let log = ExecutionLog::new();
        let entry = log.mark_rollback(None);
        assert_eq!(entry.class, LogClass::Rollback);
        assert_eq!(entry.message, "Manual rollback initiated");
        let entry = log.mark_rollback(Some("reverted lan change"));
        assert_eq!(entry.message, "reverted lan change");
    }
}
