//! Logging into the toolkit's log file.
//!
//! Two ways in:
//! - [`Logger`], a stateless facade handed to hooks explicitly, which writes
//!   straight to a [`LogSink`];
//! - [`ToolkitLayer`], a `tracing` layer that forwards the binding's own
//!   `tracing` events to the same sink.

use std::ffi::CString;
use std::fmt::{self, Write as _};
use std::panic::Location;

use tracing::field::{Field, Visit};
use tracing::{Event as TracingEvent, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use xante_plugin_interface::LogLevel;

use crate::toolkit::Toolkit;

/// Environment variable holding the filter for [`init`].
pub const LOG_ENV: &str = "XANTE_LOG";

/// Destination of log lines.
pub trait LogSink {
    fn write(&self, level: LogLevel, function: &str, line: u32, content: &str);
}

impl<T: Toolkit + ?Sized> LogSink for T {
    fn write(&self, level: LogLevel, function: &str, line: u32, content: &str) {
        let function = sanitize(function);
        let content = sanitize(content);
        self.log(level, &function, i32::try_from(line).unwrap_or(i32::MAX), &content);
    }
}

/// NUL bytes cannot cross the boundary; a log line is not worth failing over.
fn sanitize(s: &str) -> CString {
    CString::new(s.replace('\0', " ")).unwrap_or_default()
}

/// Log facade passed to every hook.
#[derive(Clone, Copy)]
pub struct Logger<'a> {
    sink: &'a dyn LogSink,
}

impl<'a> Logger<'a> {
    pub fn new(sink: &'a dyn LogSink) -> Self {
        Logger { sink }
    }

    #[track_caller]
    pub fn info(&self, content: &str) {
        self.at_caller(LogLevel::Info, content);
    }

    /// Debug line attributed to `function`.
    #[track_caller]
    pub fn debug(&self, function: &str, content: &str) {
        let line = Location::caller().line();
        self.sink.write(LogLevel::Debug, function, line, content);
    }

    #[track_caller]
    pub fn warn(&self, content: &str) {
        self.at_caller(LogLevel::Warng, content);
    }

    #[track_caller]
    pub fn error(&self, content: &str) {
        self.at_caller(LogLevel::Error, content);
    }

    pub fn write(&self, level: LogLevel, function: &str, line: u32, content: &str) {
        self.sink.write(level, function, line, content);
    }

    #[track_caller]
    fn at_caller(&self, level: LogLevel, content: &str) {
        let location = Location::caller();
        self.sink.write(level, location.file(), location.line(), content);
    }
}

impl fmt::Debug for Logger<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Logger")
    }
}

// ============================================================================
// tracing bridge
// ============================================================================

pub fn level_for(level: &Level) -> LogLevel {
    match *level {
        Level::ERROR => LogLevel::Error,
        Level::WARN => LogLevel::Warng,
        Level::INFO => LogLevel::Info,
        Level::DEBUG | Level::TRACE => LogLevel::Debug,
    }
}

/// Forwards `tracing` events to a [`LogSink`].
///
/// The event's target is used as the function name; its fields are appended
/// to the message as `key=value`.
pub struct ToolkitLayer<S> {
    sink: S,
}

impl<S> ToolkitLayer<S> {
    pub fn new(sink: S) -> Self {
        ToolkitLayer { sink }
    }
}

impl<S, R> Layer<R> for ToolkitLayer<S>
where
    S: LogSink + Send + Sync + 'static,
    R: Subscriber,
{
    fn on_event(&self, event: &TracingEvent<'_>, _ctx: Context<'_, R>) {
        let metadata = event.metadata();
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.sink.write(
            level_for(metadata.level()),
            metadata.target(),
            metadata.line().unwrap_or(0),
            &visitor.finish(),
        );
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
            return;
        }
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={:?}", field.name(), value);
    }
}

/// Route this plugin's `tracing` events to the toolkit log.
///
/// The filter comes from `XANTE_LOG` and defaults to `info`. Returns
/// `false` when a global subscriber was already installed.
#[cfg(feature = "native")]
pub fn init() -> bool {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(ToolkitLayer::new(crate::toolkit::NativeToolkit))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeToolkit, LogRecord, RecordingSink};
    use pretty_assertions::assert_eq;
    use tracing_subscriber::prelude::*;

    #[test]
    fn test_logger_writes_to_toolkit() {
        let toolkit = FakeToolkit::new();
        let logger = Logger::new(&toolkit);

        logger.info("hello");
        logger.debug("foo_custom", "value=1");
        logger.warn("careful");
        logger.error("broken");

        let logs = toolkit.logs();
        let levels: Vec<_> = logs.iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![LogLevel::Info, LogLevel::Debug, LogLevel::Warng, LogLevel::Error]
        );
        assert_eq!(logs[1].function, "foo_custom");
        assert_eq!(logs[1].content, "value=1");
        assert!(logs[0].function.ends_with("log.rs"));
        assert!(logs[0].line > 0);
    }

    #[test]
    fn test_nul_bytes_are_replaced() {
        let toolkit = FakeToolkit::new();
        Logger::new(&toolkit).info("a\0b");
        assert_eq!(toolkit.logs()[0].content, "a b");
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_for(&Level::ERROR), LogLevel::Error);
        assert_eq!(level_for(&Level::WARN), LogLevel::Warng);
        assert_eq!(level_for(&Level::INFO), LogLevel::Info);
        assert_eq!(level_for(&Level::TRACE), LogLevel::Debug);
    }

    #[test]
    fn test_layer_forwards_events() {
        let sink = RecordingSink::default();
        let subscriber = tracing_subscriber::registry().with(ToolkitLayer::new(sink.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(hook = "xapl_init", "hook failed");
            tracing::info!("plain");
        });

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            LogRecord {
                level: LogLevel::Warng,
                function: module_path!().to_string(),
                line: records[0].line,
                content: "hook failed hook=\"xapl_init\"".to_string(),
            }
        );
        assert_eq!(records[1].content, "plain");
    }
}
