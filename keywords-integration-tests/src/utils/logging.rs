//! Testing utilities to work with logs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::HashMap,
    io::Write,
    ops::Deref,
    sync::{Arc, Mutex},
};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Helper to collect events emitted by Tracing and later make assertions about
/// the collected events.
#[derive(Default)]
pub struct LogWatcher {
    /// The raw bytes received from Tracing. Should represent new-line separated JSON objects.
    buf: Arc<Mutex<Vec<u8>>>,

    /// Events serialized from [`buf`](Self::buf). As valid JSON objects are
    /// parsed from `buf`, the corresponding bytes are removed from `buf`. This
    /// way if there are any partial writes, only the complete objects are
    /// processed from the buffer, leaving incomplete objects in place.
    events: Vec<TracingJsonEvent>,
}

impl LogWatcher {
    /// Make a new LogWatcher with some events pre-populated. Primarily for testing LogWatcher itself.
    #[must_use]
    pub fn with_events(events: Vec<TracingJsonEvent>) -> Self {
        Self {
            events,
            buf: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Iterate over the events collected so far by this log watcher.
    pub fn events(&mut self) -> std::slice::Iter<'_, TracingJsonEvent> {
        self.convert_events();
        self.events.iter()
    }

    /// Test if any event this logger received matches `predicate`.
    ///
    /// # Example
    ///
    /// ```
    /// # use keywords_integration_tests::{LogWatcher, TracingJsonEvent};
    /// # use tracing::Level;
    /// # let mut fields = std::collections::HashMap::new();
    /// # fields.insert("message".to_string(), serde_json::json!("Providers ready"));
    /// # let mut log_watcher = LogWatcher::with_events(vec![
    /// #     TracingJsonEvent {
    /// #         fields,
    /// #         level: Level::INFO,
    /// #         target: String::new(),
    /// #         timestamp: String::new(),
    /// #     }
    /// # ]);
    /// #
    /// assert!(log_watcher.has(|event| event.field_contains("message", "Providers ready")));
    /// ```
    #[must_use = "LogWatcher::has does not make assertions alone, you probably want to wrap it in assert!()"]
    pub fn has<F>(&mut self, predicate: F) -> bool
    where
        F: FnMut(&TracingJsonEvent) -> bool,
    {
        self.events().any(predicate)
    }

    /// Iterate through `self.buf` to convert newline separated, completed JSON
    /// objects into [`TracingJsonEvent`] instances that are placed in
    /// `self.events`.
    fn convert_events(&mut self) {
        let mut buf = self.buf.lock().expect("mutex was poisoned");
        let mut log_text = String::from_utf8(buf.clone()).expect("bad utf8");

        // Only complete lines are parsed; a trailing partial line stays buffered.
        let complete = match log_text.rfind('\n') {
            Some(idx) => {
                let rest = log_text.split_off(idx + 1);
                std::mem::replace(&mut log_text, rest)
            }
            None => return,
        };

        for line in complete.lines().filter(|line| !line.trim().is_empty()) {
            let event: TracingJsonEvent = serde_json::from_str(line)
                .unwrap_or_else(|_| panic!("Bad JSON in log line: {}", line));
            self.events.push(event);
        }

        *buf = log_text.into_bytes();
    }
}

impl<'a> MakeWriter<'a> for LogWatcher {
    type Writer = LogWatcherWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWatcherWriter {
            buf: self.buf.clone(),
        }
    }
}

/// A helper that collects log events emitted from Tracing.
///
/// This is needed because Tracing consumes its subscribers. This type is a
/// "scout" that is split off from the main [`LogWatcher`] to give to Tracing,
/// and the data is written back to the parent type.
#[derive(Clone)]
pub struct LogWatcherWriter {
    /// The handle to the parent log watcher's buffer.
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogWatcherWriter {
    fn write(&mut self, new_bytes: &[u8]) -> std::io::Result<usize> {
        let mut buf = self
            .buf
            .lock()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        buf.extend(new_bytes.iter());
        Ok(new_bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A deserialization of [`tracing_subscriber::fmt::format::Json`]'s output format.
#[derive(Debug, Deserialize, Serialize)]
pub struct TracingJsonEvent {
    /// The key-value fields logged on the event, usually including `message`.
    pub fields: HashMap<String, Value>,
    /// The level the event was emitted at.
    #[serde(with = "serde_with::rust::display_fromstr")]
    pub level: Level,
    /// The target of the event.
    pub target: String,
    /// The time the event was emitted.
    pub timestamp: String,
}

impl TracingJsonEvent {
    /// Test if the field named `field_name` is a string that contains `pat` as a
    /// substring.
    pub fn field_contains<'a, S>(&'a self, field_name: &'a str, pat: S) -> bool
    where
        S: Deref<Target = str>,
    {
        self.fields
            .get(field_name)
            .and_then(serde_json::Value::as_str)
            .map_or(false, |value| value.contains(&*pat))
    }
}

#[cfg(test)]
mod tests {
    use super::LogWatcher;
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn partial_lines_wait_for_the_rest() {
        let mut log_watcher = LogWatcher::default();
        let mut writer = log_watcher.make_writer();

        let line = r#"{"timestamp":"t","level":"INFO","fields":{"message":"hello"},"target":"x"}"#;
        let (head, tail) = line.split_at(20);
        writer.write_all(line.as_bytes()).unwrap();
        writer.write_all(b"\n").unwrap();
        writer.write_all(head.as_bytes()).unwrap();
        assert_eq!(log_watcher.events().count(), 1);

        writer.write_all(tail.as_bytes()).unwrap();
        writer.write_all(b"\n").unwrap();
        assert_eq!(log_watcher.events().count(), 2);
        assert!(log_watcher.has(|event| event.field_contains("message", "hell")));
    }
}
