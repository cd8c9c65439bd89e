//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, and DefaultLogger filtering.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

fn entry(severity: LogSeverity, message: &str) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::transient::HeapAllocator".to_string(),
        message: message.to_string(),
        file: None,
        line: None,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_are_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Warn.label().trim(), "WARN");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_with_file_line() {
    let mut e = entry(LogSeverity::Error, "free list corrupted");
    e.file = Some("heap_allocator.rs");
    e.line = Some(42);

    let cloned = e.clone();
    assert_eq!(cloned.severity, LogSeverity::Error);
    assert_eq!(cloned.file, Some("heap_allocator.rs"));
    assert_eq!(cloned.line, Some(42));
    assert!(format!("{:?}", cloned).contains("free list corrupted"));
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_filter() {
    let logger = DefaultLogger::new(LogSeverity::Warn);
    assert_eq!(logger.min_severity(), LogSeverity::Warn);
    assert!(!logger.accepts(LogSeverity::Info));
    assert!(logger.accepts(LogSeverity::Warn));
    assert!(logger.accepts(LogSeverity::Error));
}

#[test]
fn test_default_logger_default_severity() {
    let logger = DefaultLogger::default();
    if cfg!(debug_assertions) {
        assert_eq!(logger.min_severity(), LogSeverity::Debug);
    } else {
        assert_eq!(logger.min_severity(), LogSeverity::Info);
    }
}

#[test]
fn test_default_logger_prints_every_severity() {
    // Just verify it doesn't panic on any branch
    let logger = DefaultLogger::new(LogSeverity::Trace);
    logger.log(&entry(LogSeverity::Trace, "cache hit"));
    logger.log(&entry(LogSeverity::Debug, "gc sweep"));
    logger.log(&entry(LogSeverity::Info, "heap created"));
    logger.log(&entry(LogSeverity::Warn, "oversized request"));

    let mut e = entry(LogSeverity::Error, "invariant violated");
    e.file = Some("heap.rs");
    e.line = Some(7);
    logger.log(&e);
}

// ============================================================================
// CUSTOM LOGGER TESTS
// ============================================================================

struct CaptureLogger {
    messages: Arc<Mutex<Vec<String>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.messages.lock().unwrap().push(entry.message.clone());
    }
}

#[test]
fn test_custom_logger_receives_entries() {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let logger = CaptureLogger { messages: messages.clone() };

    logger.log(&entry(LogSeverity::Info, "first"));
    logger.log(&entry(LogSeverity::Debug, "second"));

    assert_eq!(*messages.lock().unwrap(), vec!["first".to_string(), "second".to_string()]);
}

#[test]
fn test_logger_is_object_safe() {
    let logger: Box<dyn Logger> = Box::new(DefaultLogger::new(LogSeverity::Error));
    logger.log(&entry(LogSeverity::Info, "filtered out"));
}

// ============================================================================
// ERROR MACRO TESTS
// ============================================================================

fn bail_when(fail: bool) -> crate::error::Result<u32> {
    if fail {
        crate::engine_bail!("galaxy3d::test", "pool {} unavailable", 3);
    }
    Ok(7)
}

#[test]
fn test_engine_err_builds_backend_error() {
    let error = crate::engine_err!("galaxy3d::test", "lock {} poisoned", "pool");
    assert!(matches!(error, crate::error::Error::BackendError(ref message) if message == "lock pool poisoned"));
}

#[test]
fn test_engine_bail_returns_early() {
    assert_eq!(bail_when(false).unwrap(), 7);
    assert!(matches!(
        bail_when(true),
        Err(crate::error::Error::BackendError(ref message)) if message == "pool 3 unavailable"
    ));
}
